//! Namespaces and resource names: the two halves of a service path.

use percent_encoding::utf8_percent_encode;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sdk::args::DATA;

/// Ownership scope prefix of a REST path.
///
/// Rendered verbatim. Namespace paths are trusted and never escaped,
/// unlike [`ResourceName`] segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    path: String,
}

impl Namespace {
    /// The global `services` namespace.
    pub fn services() -> Self {
        Self {
            path: "services".to_string(),
        }
    }

    /// A user/app scoped namespace: `servicesNS/{owner}/{app}`.
    ///
    /// Use `-` for either part as a wildcard.
    pub fn user_app(owner: &str, app: &str) -> Self {
        Self {
            path: format!("servicesNS/{}/{}", owner, app),
        }
    }

    /// An arbitrary trusted prefix. Leading and trailing slashes are dropped.
    pub fn custom(path: &str) -> Self {
        Self {
            path: path.trim_matches('/').to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::services()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Path of a REST collection or endpoint, relative to a namespace.
///
/// Each segment is percent-escaped when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceName {
    segments: Vec<String>,
}

impl ResourceName {
    /// Build a resource name from path segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a `/`-separated path into segments, ignoring empty ones.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, used as the collection's title.
    pub fn title(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", utf8_percent_encode(segment, DATA))?;
        }
        Ok(())
    }
}

// Well-known endpoints.
impl ResourceName {
    pub fn login() -> Self {
        Self::new(["auth", "login"])
    }

    pub fn apps() -> Self {
        Self::new(["apps", "local"])
    }

    pub fn saved_searches() -> Self {
        Self::new(["saved", "searches"])
    }

    pub fn indexes() -> Self {
        Self::new(["data", "indexes"])
    }

    pub fn jobs() -> Self {
        Self::new(["search", "jobs"])
    }
}
