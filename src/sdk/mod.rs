//! Splunk SDK core.
//!
//! # Architecture
//!
//! - `context` - Endpoint identity, session key, GET/POST request building
//! - `transport` - Pluggable HTTP transport (reqwest by default)
//! - `args` - Argument sets and their query/form encodings
//! - `namespace` - Namespaces and resource names
//! - `atom` - Atom feed parsing
//! - `entity` - Entity factory trait and the generic `Resource` entity
//! - `collection` - Refreshable entity collections

pub mod args;
pub mod atom;
pub mod collection;
pub mod context;
pub mod entity;
pub mod namespace;
pub mod transport;

pub use args::ArgumentSet;
pub use atom::{AtomEntry, AtomFeed, Value};
pub use collection::EntityCollection;
pub use context::{Context, Scheme};
pub use entity::{Entity, Resource};
pub use namespace::{Namespace, ResourceName};
pub use transport::Transport;
