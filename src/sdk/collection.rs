//! EntityCollection - a refreshable, read-only list of entities.
//!
//! A collection is created unpopulated. Nothing can be read from it until
//! [`EntityCollection::update`] has fetched the backing feed once; each later
//! update replaces the feed and the entities together.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sdk::args::ArgumentSet;
use crate::sdk::atom::AtomFeed;
use crate::sdk::context::Context;
use crate::sdk::entity::Entity;
use crate::sdk::namespace::{Namespace, ResourceName};

enum CollectionState<T> {
    Unpopulated,
    Populated { feed: AtomFeed, entities: Vec<T> },
}

/// A server-side collection resource.
///
/// `update` takes `&mut self`, so two updates can never overlap on one
/// instance. Share a collection across tasks behind a `tokio::sync::Mutex`
/// to serialize refreshes.
pub struct EntityCollection<T: Entity> {
    context: Arc<Context>,
    namespace: Namespace,
    name: ResourceName,
    parameters: Option<BTreeMap<String, String>>,
    state: CollectionState<T>,
}

impl<T: Entity> EntityCollection<T> {
    /// Create an unpopulated collection. Performs no I/O.
    ///
    /// `args` is copied into [`EntityCollection::parameters`]; for a key
    /// given more than once the last value wins.
    pub fn new(
        context: Arc<Context>,
        namespace: Namespace,
        name: ResourceName,
        args: Option<&ArgumentSet>,
    ) -> Self {
        let parameters = args.map(|args| {
            args.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect()
        });

        Self {
            context,
            namespace,
            name,
            parameters,
            state: CollectionState::Unpopulated,
        }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    /// The query parameters sent with every update.
    pub fn parameters(&self) -> Option<&BTreeMap<String, String>> {
        self.parameters.as_ref()
    }

    /// Check if at least one update has succeeded.
    pub fn is_populated(&self) -> bool {
        matches!(self.state, CollectionState::Populated { .. })
    }

    fn populated(&self) -> Result<(&AtomFeed, &[T])> {
        match &self.state {
            CollectionState::Populated { feed, entities } => Ok((feed, entities)),
            CollectionState::Unpopulated => Err(Error::InvalidOperation(format!(
                "collection {} has not been updated",
                self.name
            ))),
        }
    }

    /// The feed from the last successful update.
    pub fn feed(&self) -> Result<&AtomFeed> {
        self.populated().map(|(feed, _)| feed)
    }

    /// The entities from the last successful update, in feed order.
    pub fn entities(&self) -> Result<&[T]> {
        self.populated().map(|(_, entities)| entities)
    }

    pub fn len(&self) -> Result<usize> {
        self.entities().map(<[T]>::len)
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.entities().map(<[T]>::is_empty)
    }

    /// Get the entity at `index`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOperation`] before the first update,
    /// [`Error::IndexOutOfRange`] past the end.
    pub fn get(&self, index: usize) -> Result<&T> {
        let entities = self.entities()?;
        entities.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: entities.len(),
        })
    }

    pub fn iter(&self) -> Result<std::slice::Iter<'_, T>> {
        self.entities().map(<[T]>::iter)
    }

    /// Fetch the collection's feed and replace the current entities.
    ///
    /// On failure the previous state is kept and the error is returned as
    /// raised by the fetch, the feed parser or the entity factory.
    pub async fn update(&mut self) -> Result<()> {
        let args: Option<ArgumentSet> = self
            .parameters
            .as_ref()
            .map(|params| params.iter().collect());

        let document = self
            .context
            .get_document(&self.namespace, &self.name, args.iter())
            .await?;

        let feed = AtomFeed::parse(&self.name, &document)?;
        let entities = feed
            .entries
            .iter()
            .map(|entry| T::from_entry(&self.context, &self.name, entry))
            .collect::<Result<Vec<T>>>()?;

        debug!("Updated {} with {} entities", self.name, entities.len());
        self.state = CollectionState::Populated { feed, entities };
        Ok(())
    }
}
