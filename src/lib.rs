//! Splunk SDK - Rust client for the Splunk REST management API.
//!
//! # Architecture
//!
//! 1. **Context** (`sdk::context`) - builds namespaced requests, signs them
//!    with the session key and returns raw responses
//! 2. **Collections** (`sdk::collection`) - fetch Atom feeds through a context
//!    and materialize them as typed entities
//! 3. **Configuration** (`config`) - connection settings from flags, env or YAML
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use splunk_sdk::sdk::{Context, EntityCollection, Namespace, Resource, ResourceName, Scheme};
//!
//! # async fn example() -> splunk_sdk::Result<()> {
//! let context = Arc::new(Context::new(Scheme::Https, "localhost", 8089)?);
//! context.login("admin", "changeme").await?;
//!
//! let mut apps: EntityCollection<Resource> =
//!     EntityCollection::new(context.clone(), Namespace::default(), ResourceName::apps(), None);
//! apps.update().await?;
//! for app in apps.iter()? {
//!     println!("{}", app.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod sdk;

pub use error::{Error, Result};

/// SDK version reported in the User-Agent header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default management port of a Splunk server.
pub const DEFAULT_PORT: u16 = 8089;
