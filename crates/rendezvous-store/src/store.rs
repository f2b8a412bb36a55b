//! The entity store: one collection per record kind.
//!
//! [`EntityStore`] owns four [`Collection`]s, each behind its own
//! [`RwLock`]. Writers on one collection are serialized; readers run
//! concurrently and always observe a whole collection state. Operations on
//! different kinds never contend with each other.
//!
//! The store is an explicitly constructed object. It lives for as long as
//! the service that owns it and is never reset except through the
//! delete-all mutations.

use std::path::Path;

use rendezvous_types::{Event, Location, Notification, Participant, Record, SeedData, User};
use tokio::sync::RwLock;
use tracing::info;

use crate::collection::Collection;
use crate::error::StoreError;

/// Maps a record type to its collection inside an [`EntityStore`].
pub trait Stored: Record {
    /// The lock guarding this kind's collection.
    fn table(store: &EntityStore) -> &RwLock<Collection<Self>>;

    /// The notification announcing this record's creation, if its kind
    /// publishes one.
    fn created_notification(&self) -> Option<Notification> {
        None
    }
}

/// In-memory home of every record.
#[derive(Debug, Default)]
pub struct EntityStore {
    users: RwLock<Collection<User>>,
    locations: RwLock<Collection<Location>>,
    events: RwLock<Collection<Event>>,
    participants: RwLock<Collection<Participant>>,
}

impl EntityStore {
    /// Create a store with four empty collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a seed dataset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if any list repeats an identifier.
    pub fn from_seed(seed: SeedData) -> Result<Self, StoreError> {
        let total = seed.record_count();
        let store = Self {
            users: RwLock::new(Collection::from_records(seed.users)?),
            locations: RwLock::new(Collection::from_records(seed.locations)?),
            events: RwLock::new(Collection::from_records(seed.events)?),
            participants: RwLock::new(Collection::from_records(seed.participants)?),
        };
        info!(records = total, "entity store seeded");
        Ok(store)
    }

    /// The lock guarding the collection for record kind `R`.
    pub fn table<R: Stored>(&self) -> &RwLock<Collection<R>> {
        R::table(self)
    }

    /// A copy of every record of kind `R`, in collection order.
    pub async fn list<R: Stored>(&self) -> Vec<R> {
        self.table::<R>().read().await.list().to_vec()
    }

    /// A copy of the record of kind `R` with the given identifier.
    pub async fn find<R: Stored>(&self, id: &R::Id) -> Option<R> {
        self.table::<R>().read().await.find_by_id(id).cloned()
    }

    /// Number of records of kind `R`.
    pub async fn count<R: Stored>(&self) -> usize {
        self.table::<R>().read().await.len()
    }

    /// Copy every collection out into a [`SeedData`] document.
    pub async fn export(&self) -> SeedData {
        SeedData {
            users: self.list::<User>().await,
            locations: self.list::<Location>().await,
            events: self.list::<Event>().await,
            participants: self.list::<Participant>().await,
        }
    }
}

impl Stored for User {
    fn table(store: &EntityStore) -> &RwLock<Collection<Self>> {
        &store.users
    }

    fn created_notification(&self) -> Option<Notification> {
        Some(Notification::UserCreated(self.clone()))
    }
}

impl Stored for Location {
    fn table(store: &EntityStore) -> &RwLock<Collection<Self>> {
        &store.locations
    }
}

impl Stored for Event {
    fn table(store: &EntityStore) -> &RwLock<Collection<Self>> {
        &store.events
    }

    fn created_notification(&self) -> Option<Notification> {
        Some(Notification::EventCreated(self.clone()))
    }
}

impl Stored for Participant {
    fn table(store: &EntityStore) -> &RwLock<Collection<Self>> {
        &store.participants
    }

    fn created_notification(&self) -> Option<Notification> {
        Some(Notification::ParticipantAdded(self.clone()))
    }
}

/// Read a seed dataset from a JSON file.
///
/// # Errors
///
/// Returns [`StoreError::SeedIo`] if the file cannot be read, or
/// [`StoreError::SeedParse`] if it is not a valid dataset.
pub fn load_seed(path: &Path) -> Result<SeedData, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|source| StoreError::SeedIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_seed(&contents)
}

/// Parse a seed dataset from JSON text.
///
/// # Errors
///
/// Returns [`StoreError::SeedParse`] if the text is not a valid dataset.
pub fn parse_seed(json: &str) -> Result<SeedData, StoreError> {
    Ok(serde_json::from_str(json)?)
}
