//! Read-time resolution of relations between records.
//!
//! Nothing here is cached or indexed: every call scans the target
//! collection under a read lock, so results always reflect the latest
//! committed writes. A foreign key that is unset or points at a missing
//! record resolves to `None` (or contributes nothing to a list); dangling
//! references are never an error.
//!
//! Relations are addressable two ways: typed methods on [`Resolver`] for
//! code that knows the source kind, and the [`Relation`] enum keyed by
//! (source kind, field name) for the boundary layer.

use rendezvous_types::{AnyRecord, EntityKind, Event, Location, Participant, User};
use serde::Serialize;

use crate::store::{EntityStore, Stored};

/// Resolves related records against a borrowed [`EntityStore`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a EntityStore,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over `store`.
    pub const fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Events whose `user_id` is the user's id.
    pub async fn user_events(&self, user: &User) -> Vec<Event> {
        self.scan(|event: &Event| event.user_id.as_ref() == Some(&user.id))
            .await
    }

    /// Participants whose `user_id` is the user's id.
    pub async fn user_participants(&self, user: &User) -> Vec<Participant> {
        self.scan(|participant: &Participant| participant.user_id == user.id)
            .await
    }

    /// The user named by the event's `user_id`.
    pub async fn event_user(&self, event: &Event) -> Option<User> {
        match &event.user_id {
            Some(id) => self.store.find::<User>(id).await,
            None => None,
        }
    }

    /// The location named by the event's `location_id`.
    pub async fn event_location(&self, event: &Event) -> Option<Location> {
        match &event.location_id {
            Some(id) => self.store.find::<Location>(id).await,
            None => None,
        }
    }

    /// Participants whose `event_id` is the event's id.
    pub async fn event_participants(&self, event: &Event) -> Vec<Participant> {
        self.scan(|participant: &Participant| participant.event_id == event.id)
            .await
    }

    /// Events whose `location_id` is the location's id.
    pub async fn location_events(&self, location: &Location) -> Vec<Event> {
        self.scan(|event: &Event| event.location_id.as_ref() == Some(&location.id))
            .await
    }

    /// The user named by the participant's `user_id`.
    pub async fn participant_user(&self, participant: &Participant) -> Option<User> {
        self.store.find::<User>(&participant.user_id).await
    }

    /// The event named by the participant's `event_id`.
    pub async fn participant_event(&self, participant: &Participant) -> Option<Event> {
        self.store.find::<Event>(&participant.event_id).await
    }

    /// Resolve `relation` for `source`.
    ///
    /// Returns `None` when the relation does not start from the source's
    /// kind (e.g. asking a location for its `user`).
    pub async fn resolve(&self, relation: Relation, source: &AnyRecord) -> Option<Related> {
        let related = match (relation, source) {
            (Relation::UserEvents, AnyRecord::User(user)) => {
                Related::Events(self.user_events(user).await)
            }
            (Relation::UserParticipants, AnyRecord::User(user)) => {
                Related::Participants(self.user_participants(user).await)
            }
            (Relation::EventUser, AnyRecord::Event(event)) => {
                Related::User(self.event_user(event).await)
            }
            (Relation::EventLocation, AnyRecord::Event(event)) => {
                Related::Location(self.event_location(event).await)
            }
            (Relation::EventParticipants, AnyRecord::Event(event)) => {
                Related::Participants(self.event_participants(event).await)
            }
            (Relation::LocationEvents, AnyRecord::Location(location)) => {
                Related::Events(self.location_events(location).await)
            }
            (Relation::ParticipantUser, AnyRecord::Participant(participant)) => {
                Related::User(self.participant_user(participant).await)
            }
            (Relation::ParticipantEvent, AnyRecord::Participant(participant)) => {
                Related::Event(self.participant_event(participant).await)
            }
            _ => return None,
        };
        Some(related)
    }

    async fn scan<R: Stored>(&self, keep: impl Fn(&R) -> bool) -> Vec<R> {
        self.store
            .table::<R>()
            .read()
            .await
            .iter()
            .filter(|&record| keep(record))
            .cloned()
            .collect()
    }
}

/// A relational field, keyed by its source kind and field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// `User.events`
    UserEvents,
    /// `User.participants`
    UserParticipants,
    /// `Event.user`
    EventUser,
    /// `Event.location`
    EventLocation,
    /// `Event.participants`
    EventParticipants,
    /// `Location.events`
    LocationEvents,
    /// `Participant.user`
    ParticipantUser,
    /// `Participant.event`
    ParticipantEvent,
}

impl Relation {
    /// Every relation.
    pub const ALL: [Self; 8] = [
        Self::UserEvents,
        Self::UserParticipants,
        Self::EventUser,
        Self::EventLocation,
        Self::EventParticipants,
        Self::LocationEvents,
        Self::ParticipantUser,
        Self::ParticipantEvent,
    ];

    /// The kind the relation starts from.
    pub const fn source(self) -> EntityKind {
        match self {
            Self::UserEvents | Self::UserParticipants => EntityKind::User,
            Self::EventUser | Self::EventLocation | Self::EventParticipants => EntityKind::Event,
            Self::LocationEvents => EntityKind::Location,
            Self::ParticipantUser | Self::ParticipantEvent => EntityKind::Participant,
        }
    }

    /// The kind the relation yields.
    pub const fn target(self) -> EntityKind {
        match self {
            Self::EventUser | Self::ParticipantUser => EntityKind::User,
            Self::EventLocation => EntityKind::Location,
            Self::UserEvents | Self::LocationEvents | Self::ParticipantEvent => EntityKind::Event,
            Self::UserParticipants | Self::EventParticipants => EntityKind::Participant,
        }
    }

    /// The field name on the source record.
    pub const fn field(self) -> &'static str {
        match self {
            Self::UserEvents | Self::LocationEvents => "events",
            Self::UserParticipants | Self::EventParticipants => "participants",
            Self::EventUser | Self::ParticipantUser => "user",
            Self::EventLocation => "location",
            Self::ParticipantEvent => "event",
        }
    }

    /// Whether the relation yields a list rather than a single record.
    pub const fn is_many(self) -> bool {
        matches!(
            self,
            Self::UserEvents | Self::UserParticipants | Self::EventParticipants | Self::LocationEvents
        )
    }

    /// Look up the relation named `field` on records of kind `source`.
    pub fn lookup(source: EntityKind, field: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|relation| relation.source() == source && relation.field() == field)
    }

    /// Every relation starting from `source`.
    pub fn from_kind(source: EntityKind) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |relation| relation.source() == source)
    }
}

/// The value of a resolved relation.
///
/// Serializes as the bare record, `null`, or a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Related {
    /// A single user, absent if unset or dangling.
    User(Option<User>),
    /// A single location, absent if unset or dangling.
    Location(Option<Location>),
    /// A single event, absent if dangling.
    Event(Option<Event>),
    /// Zero or more events.
    Events(Vec<Event>),
    /// Zero or more participants.
    Participants(Vec<Participant>),
}
