//! The [`DataService`] facade tying the store, mutations, relations, and
//! notifications together.
//!
//! One `DataService` is built at process start and shared (it is cheap to
//! clone) by every request handler until shutdown. There is no ambient or
//! static state: everything hangs off this value.

use std::sync::Arc;

use rendezvous_types::{SeedData, Topic, UserId};

use crate::bus::{DEFAULT_CHANNEL_CAPACITY, NotificationBus, Subscription};
use crate::error::StoreError;
use crate::id_gen::{IdGenerator, UuidGenerator};
use crate::mutation::MutationService;
use crate::resolver::Resolver;
use crate::store::{EntityStore, Stored};

/// Entry point for every query, mutation, relation, and subscription.
#[derive(Debug, Clone)]
pub struct DataService {
    store: Arc<EntityStore>,
    mutations: MutationService,
    bus: NotificationBus,
}

impl DataService {
    /// Assemble a service from its parts.
    pub fn new(store: EntityStore, ids: Arc<dyn IdGenerator>, bus: NotificationBus) -> Self {
        let store = Arc::new(store);
        let mutations = MutationService::new(Arc::clone(&store), ids, bus.clone());
        Self {
            store,
            mutations,
            bus,
        }
    }

    /// An empty service with UUID identifiers and default channel capacity.
    pub fn in_memory() -> Self {
        Self::new(
            EntityStore::new(),
            Arc::new(UuidGenerator),
            NotificationBus::new(DEFAULT_CHANNEL_CAPACITY),
        )
    }

    /// A service pre-populated from `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the seed repeats an identifier.
    pub fn seeded(
        seed: SeedData,
        ids: Arc<dyn IdGenerator>,
        bus: NotificationBus,
    ) -> Result<Self, StoreError> {
        Ok(Self::new(EntityStore::from_seed(seed)?, ids, bus))
    }

    /// The underlying store.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Write operations.
    pub const fn mutations(&self) -> &MutationService {
        &self.mutations
    }

    /// Relation resolution against the current store state.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.store)
    }

    /// The notification bus.
    pub const fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// Every record of kind `R`.
    pub async fn list<R: Stored>(&self) -> Vec<R> {
        self.store.list::<R>().await
    }

    /// The record of kind `R` with the given identifier, if any.
    pub async fn find<R: Stored>(&self, id: &R::Id) -> Option<R> {
        self.store.find::<R>(id).await
    }

    /// Register for notifications on `topic`, optionally narrowed to one
    /// user.
    pub fn subscribe(&self, topic: Topic, filter: Option<UserId>) -> Subscription {
        self.bus.subscribe(topic, filter)
    }
}

impl Default for DataService {
    fn default() -> Self {
        Self::in_memory()
    }
}
