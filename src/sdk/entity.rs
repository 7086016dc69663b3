//! Entities materialized from feed entries.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sdk::atom::{AtomEntry, Value};
use crate::sdk::context::Context;
use crate::sdk::namespace::ResourceName;

/// A typed item built from one feed entry.
///
/// [`EntityCollection`](crate::sdk::EntityCollection) calls
/// [`Entity::from_entry`] once per entry, in feed order.
pub trait Entity: Sized {
    fn from_entry(
        context: &Arc<Context>,
        resource: &ResourceName,
        entry: &AtomEntry,
    ) -> Result<Self>;
}

/// A general-purpose entity exposing an entry's metadata and content tree.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub name: String,
    pub id: String,
    pub collection: ResourceName,
    pub updated: Option<DateTime<FixedOffset>>,
    pub author: Option<String>,
    pub links: BTreeMap<String, String>,
    pub content: Option<Value>,
}

impl Resource {
    /// Look up a top-level content property.
    pub fn content_value(&self, key: &str) -> Option<&Value> {
        self.content.as_ref().and_then(|c| c.get(key))
    }

    /// Look up a top-level content property holding text.
    pub fn content_str(&self, key: &str) -> Option<&str> {
        self.content_value(key).and_then(Value::as_str)
    }
}

impl Entity for Resource {
    fn from_entry(
        _context: &Arc<Context>,
        resource: &ResourceName,
        entry: &AtomEntry,
    ) -> Result<Self> {
        if entry.title.is_empty() {
            return Err(Error::Entity(format!(
                "entry without a title in {}",
                resource
            )));
        }

        Ok(Self {
            name: entry.title.clone(),
            id: entry.id.clone(),
            collection: resource.clone(),
            updated: entry.updated,
            author: entry.author.clone(),
            links: entry.links.clone(),
            content: entry.content.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::context::Scheme;

    fn entry(title: &str) -> AtomEntry {
        let mut content = BTreeMap::new();
        content.insert("label".to_string(), Value::String("Home".to_string()));
        AtomEntry {
            title: title.to_string(),
            id: format!("https://localhost:8089/services/apps/local/{}", title),
            updated: None,
            published: None,
            author: Some("nobody".to_string()),
            links: BTreeMap::new(),
            content: Some(Value::Dict(content)),
        }
    }

    #[test]
    fn test_resource_from_entry() {
        let context = Arc::new(Context::new(Scheme::Https, "localhost", 8089).unwrap());
        let resource =
            Resource::from_entry(&context, &ResourceName::apps(), &entry("launcher")).unwrap();

        assert_eq!(resource.name, "launcher");
        assert_eq!(resource.collection, ResourceName::apps());
        assert_eq!(resource.author.as_deref(), Some("nobody"));
        assert_eq!(resource.content_str("label"), Some("Home"));
        assert_eq!(resource.content_str("missing"), None);
    }

    #[test]
    fn test_resource_requires_title() {
        let context = Arc::new(Context::new(Scheme::Https, "localhost", 8089).unwrap());
        let err = Resource::from_entry(&context, &ResourceName::apps(), &entry("")).unwrap_err();
        assert!(matches!(err, Error::Entity(_)));
    }
}
