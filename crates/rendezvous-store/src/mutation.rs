//! Create, update, delete, and delete-all for every record kind.
//!
//! Every operation takes the write lock of exactly one collection and holds
//! it for the whole read-check-write sequence, so no other writer can
//! interleave and no reader sees a half-applied change. Existence is
//! checked before anything is modified: a failed update or delete leaves
//! the collection untouched.
//!
//! Creation of users, events, and participants publishes a notification
//! after the write lock has been released. A subscriber that looks the
//! record up on receipt therefore finds it, unless it has since been
//! deleted. The converse does not hold: a reader can see the record
//! before any subscriber has been notified, and an update can land in
//! that gap, so a notification carries the record as created rather than
//! its latest state.

use std::sync::Arc;

use rendezvous_types::{
    CreateEventInput, CreateLocationInput, CreateParticipantInput, CreateUserInput, Draft, Event,
    EventId, Location, LocationId, Participant, ParticipantId, Patch, Record, UpdateEventInput,
    UpdateLocationInput, UpdateParticipantInput, UpdateUserInput, User, UserId,
};
use tracing::debug;

use crate::bus::NotificationBus;
use crate::collection::Collection;
use crate::error::StoreError;
use crate::id_gen::IdGenerator;
use crate::store::{EntityStore, Stored};

/// How many generated identifiers are tried before creation gives up.
///
/// Only reachable when the generator keeps returning identifiers that are
/// already taken, e.g. a sequential generator over a seeded collection.
pub const MAX_ID_ATTEMPTS: usize = 64;

/// Applies writes to an [`EntityStore`] and announces creations.
#[derive(Debug, Clone)]
pub struct MutationService {
    store: Arc<EntityStore>,
    ids: Arc<dyn IdGenerator>,
    bus: NotificationBus,
}

impl MutationService {
    /// Create a mutation service over `store`.
    pub fn new(store: Arc<EntityStore>, ids: Arc<dyn IdGenerator>, bus: NotificationBus) -> Self {
        Self { store, ids, bus }
    }

    // -------------------------------------------------------------------
    // Generic operations
    // -------------------------------------------------------------------

    /// Assign a fresh identifier to `input`, append the record, and publish
    /// its creation notification if its kind has one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdExhausted`] if no unused identifier could be
    /// generated.
    pub async fn create<D>(&self, input: D) -> Result<D::Output, StoreError>
    where
        D: Draft,
        D::Output: Stored,
    {
        let record = {
            let mut table = self.store.table::<D::Output>().write().await;
            let id = self.fresh_id(&table)?;
            let record = input.into_record(id);
            table.append(record.clone())?;
            record
        };
        let kind = <D::Output as Record>::KIND;
        debug!(%kind, id = %record.id(), "record created");

        if let Some(notification) = record.created_notification() {
            self.bus.publish(notification);
        }
        Ok(record)
    }

    /// Merge `patch` over the record with the given identifier, in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub async fn update<P>(
        &self,
        id: &<P::Target as Record>::Id,
        patch: P,
    ) -> Result<P::Target, StoreError>
    where
        P: Patch,
        P::Target: Stored,
    {
        let mut table = self.store.table::<P::Target>().write().await;
        let (index, mut record) = table
            .position(id)
            .and_then(|index| table.get(index).map(|record| (index, record.clone())))
            .ok_or_else(|| StoreError::not_found::<P::Target>(id))?;

        patch.apply_to(&mut record);
        table.replace_at(index, record.clone());
        drop(table);

        let kind = <P::Target as Record>::KIND;
        debug!(%kind, %id, "record updated");
        Ok(record)
    }

    /// Remove the record with the given identifier and return it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub async fn delete<R: Stored>(&self, id: &R::Id) -> Result<R, StoreError> {
        let mut table = self.store.table::<R>().write().await;
        let removed = table
            .position(id)
            .and_then(|index| table.remove_at(index))
            .ok_or_else(|| StoreError::not_found::<R>(id))?;
        drop(table);

        debug!(kind = %R::KIND, %id, "record deleted");
        Ok(removed)
    }

    /// Remove every record of kind `R`, returning how many were removed.
    pub async fn delete_all<R: Stored>(&self) -> usize {
        let removed = self.store.table::<R>().write().await.clear();
        debug!(kind = %R::KIND, removed, "collection cleared");
        removed
    }

    fn fresh_id<R: Record>(&self, table: &Collection<R>) -> Result<R::Id, StoreError> {
        std::iter::repeat_with(|| R::Id::from(self.ids.generate(R::KIND)))
            .take(MAX_ID_ATTEMPTS)
            .find(|id| !table.contains(id))
            .ok_or(StoreError::IdExhausted {
                kind: R::KIND,
                attempts: MAX_ID_ATTEMPTS,
            })
    }

    // -------------------------------------------------------------------
    // User
    // -------------------------------------------------------------------

    /// Create a user and publish `user-created`.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, StoreError> {
        self.create(input).await
    }

    /// Update a user.
    pub async fn update_user(&self, id: &UserId, patch: UpdateUserInput) -> Result<User, StoreError> {
        self.update(id, patch).await
    }

    /// Delete a user. Events and participants referencing it are kept.
    pub async fn delete_user(&self, id: &UserId) -> Result<User, StoreError> {
        self.delete::<User>(id).await
    }

    /// Delete every user.
    pub async fn delete_all_users(&self) -> usize {
        self.delete_all::<User>().await
    }

    // -------------------------------------------------------------------
    // Location
    // -------------------------------------------------------------------

    /// Create a location. Locations publish no notification.
    pub async fn create_location(&self, input: CreateLocationInput) -> Result<Location, StoreError> {
        self.create(input).await
    }

    /// Update a location.
    pub async fn update_location(
        &self,
        id: &LocationId,
        patch: UpdateLocationInput,
    ) -> Result<Location, StoreError> {
        self.update(id, patch).await
    }

    /// Delete a location. Events hosted there are kept.
    pub async fn delete_location(&self, id: &LocationId) -> Result<Location, StoreError> {
        self.delete::<Location>(id).await
    }

    /// Delete every location.
    pub async fn delete_all_locations(&self) -> usize {
        self.delete_all::<Location>().await
    }

    // -------------------------------------------------------------------
    // Event
    // -------------------------------------------------------------------

    /// Create an event and publish `event-created`.
    pub async fn create_event(&self, input: CreateEventInput) -> Result<Event, StoreError> {
        self.create(input).await
    }

    /// Update an event.
    pub async fn update_event(
        &self,
        id: &EventId,
        patch: UpdateEventInput,
    ) -> Result<Event, StoreError> {
        self.update(id, patch).await
    }

    /// Delete an event. Its participants are kept.
    pub async fn delete_event(&self, id: &EventId) -> Result<Event, StoreError> {
        self.delete::<Event>(id).await
    }

    /// Delete every event.
    pub async fn delete_all_events(&self) -> usize {
        self.delete_all::<Event>().await
    }

    // -------------------------------------------------------------------
    // Participant
    // -------------------------------------------------------------------

    /// Create a participant and publish `participant-added`.
    pub async fn create_participant(
        &self,
        input: CreateParticipantInput,
    ) -> Result<Participant, StoreError> {
        self.create(input).await
    }

    /// Update a participant.
    pub async fn update_participant(
        &self,
        id: &ParticipantId,
        patch: UpdateParticipantInput,
    ) -> Result<Participant, StoreError> {
        self.update(id, patch).await
    }

    /// Delete a participant.
    pub async fn delete_participant(&self, id: &ParticipantId) -> Result<Participant, StoreError> {
        self.delete::<Participant>(id).await
    }

    /// Delete every participant.
    pub async fn delete_all_participants(&self) -> usize {
        self.delete_all::<Participant>().await
    }
}
