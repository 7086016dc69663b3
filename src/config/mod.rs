//! Configuration management for the Splunk SDK.
//!
//! Settings come from a YAML file, then command-line flags (each with a
//! `SPLUNK_*` environment fallback) override individual fields.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::sdk::{Context, Namespace, Scheme};
use crate::DEFAULT_PORT;

/// Command-line arguments for the `splunk` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "splunk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the Splunk REST management API")]
pub struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "SPLUNK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Scheme: http or https
    #[arg(long, env = "SPLUNK_SCHEME")]
    pub scheme: Option<Scheme>,

    /// Server host name
    #[arg(long, env = "SPLUNK_HOST")]
    pub host: Option<String>,

    /// Management port
    #[arg(short, long, env = "SPLUNK_PORT")]
    pub port: Option<u16>,

    /// Username for login
    #[arg(short, long, env = "SPLUNK_USERNAME")]
    pub username: Option<String>,

    /// Password for login
    #[arg(long, env = "SPLUNK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Existing session key (skips login)
    #[arg(long, env = "SPLUNK_SESSION_KEY", hide_env_values = true)]
    pub session_key: Option<String>,

    /// Namespace owner (servicesNS/{owner}/{app})
    #[arg(long, env = "SPLUNK_OWNER")]
    pub owner: Option<String>,

    /// Namespace app (servicesNS/{owner}/{app})
    #[arg(long, env = "SPLUNK_APP")]
    pub app: Option<String>,

    /// Enable debug logging
    #[arg(short, long, env = "SPLUNK_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `splunk` binary.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in and print the session key
    Login,
    /// Fetch a collection and print its entities as JSON lines
    List {
        /// Resource path, e.g. apps/local or saved/searches
        resource: String,

        /// Query argument as key=value (repeatable)
        #[arg(short = 'a', long = "arg", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

/// Connection configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheme
    pub scheme: Scheme,
    /// Server host
    pub host: String,
    /// Management port
    pub port: u16,
    /// Login username
    pub username: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Pre-acquired session key
    pub session_key: Option<String>,
    /// Namespace owner
    pub owner: Option<String>,
    /// Namespace app
    pub app: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme: Scheme::Https,
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            session_key: None,
            owner: None,
            app: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("session_key", &self.session_key.as_ref().map(|_| "<redacted>"))
            .field("owner", &self.owner)
            .field("app", &self.app)
            .finish()
    }
}

impl Config {
    /// Load configuration from a YAML file. Missing fields take defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Build configuration from the config file named in `args` (if any),
    /// overridden by explicit flags.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };

        if let Some(scheme) = args.scheme {
            config.scheme = scheme;
        }
        if let Some(host) = &args.host {
            config.host = host.clone();
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        override_with(&mut config.username, &args.username);
        override_with(&mut config.password, &args.password);
        override_with(&mut config.session_key, &args.session_key);
        override_with(&mut config.owner, &args.owner);
        override_with(&mut config.app, &args.app);

        Ok(config)
    }

    /// The namespace requests are scoped to.
    ///
    /// `servicesNS/{owner}/{app}` when either part is set (the other
    /// defaulting to the `-` wildcard), otherwise `services`.
    pub fn namespace(&self) -> Namespace {
        match (&self.owner, &self.app) {
            (None, None) => Namespace::default(),
            (owner, app) => Namespace::user_app(
                owner.as_deref().unwrap_or("-"),
                app.as_deref().unwrap_or("-"),
            ),
        }
    }

    /// Create a context carrying the configured session key, if any.
    pub fn context(&self) -> Result<Context> {
        let context = Context::new(self.scheme, &self.host, self.port)?;
        context.set_credential(self.session_key.clone());
        Ok(context)
    }

    /// Create a context and log in unless a session key is already configured.
    pub async fn connect(&self) -> Result<Arc<Context>> {
        let context = self.context()?;

        if !context.is_authenticated() {
            match (&self.username, &self.password) {
                (Some(username), Some(password)) => context.login(username, password).await?,
                _ => {
                    return Err(Error::Config(
                        "either a session key or a username and password are required"
                            .to_string(),
                    ))
                }
            }
        }

        Ok(Arc::new(context))
    }
}

fn override_with(target: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        target.clone_from(value);
    }
}
