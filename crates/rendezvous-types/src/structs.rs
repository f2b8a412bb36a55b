//! Record structs for the four entity kinds.
//!
//! Records are flat: relations are expressed only through foreign-key fields
//! holding another record's identifier. Foreign keys are never validated at
//! write time, so any of them may dangle.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::EntityKind;
use crate::ids::{EventId, LocationId, ParticipantId, UserId};

/// Behaviour shared by every stored record.
pub trait Record: Clone + Send + Sync + 'static {
    /// The identifier type for this record kind.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Display + From<String> + Send + Sync;

    /// Which collection this record belongs to.
    const KIND: EntityKind;

    /// The record's identifier.
    fn id(&self) -> &Self::Id;
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Unique identifier.
    #[ts(type = "string")]
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Contact address.
    pub email: String,
}

/// A place where events can be hosted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Unique identifier.
    #[ts(type = "string")]
    pub id: LocationId,
    /// Location name.
    pub name: String,
    /// Free-form description.
    pub desc: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// A scheduled event.
///
/// `from` and `to` are the start and end times as supplied by the caller;
/// the service does not interpret them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Unique identifier.
    #[ts(type = "string")]
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub desc: String,
    /// Calendar date.
    pub date: String,
    /// Start time.
    pub from: String,
    /// End time.
    pub to: String,
    /// Hosting location, if any. May dangle.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub location_id: Option<LocationId>,
    /// Owning user, if any. May dangle.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub user_id: Option<UserId>,
}

/// A user's participation in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Unique identifier.
    #[ts(type = "string")]
    pub id: ParticipantId,
    /// The attending user. May dangle.
    #[ts(type = "string")]
    pub user_id: UserId,
    /// The attended event. May dangle.
    #[ts(type = "string")]
    pub event_id: EventId,
}

impl Record for User {
    type Id = UserId;
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &UserId {
        &self.id
    }
}

impl Record for Location {
    type Id = LocationId;
    const KIND: EntityKind = EntityKind::Location;

    fn id(&self) -> &LocationId {
        &self.id
    }
}

impl Record for Event {
    type Id = EventId;
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &EventId {
        &self.id
    }
}

impl Record for Participant {
    type Id = ParticipantId;
    const KIND: EntityKind = EntityKind::Participant;

    fn id(&self) -> &ParticipantId {
        &self.id
    }
}

/// A record of any kind, for code paths that are not generic over the kind.
///
/// Serializes as the bare record without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnyRecord {
    /// A user.
    User(User),
    /// A location.
    Location(Location),
    /// An event.
    Event(Event),
    /// A participant.
    Participant(Participant),
}

impl AnyRecord {
    /// The kind of the wrapped record.
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Location(_) => EntityKind::Location,
            Self::Event(_) => EntityKind::Event,
            Self::Participant(_) => EntityKind::Participant,
        }
    }

    /// The wrapped record's identifier text.
    pub fn id_str(&self) -> &str {
        match self {
            Self::User(user) => user.id.as_str(),
            Self::Location(location) => location.id.as_str(),
            Self::Event(event) => event.id.as_str(),
            Self::Participant(participant) => participant.id.as_str(),
        }
    }
}

impl From<User> for AnyRecord {
    fn from(user: User) -> Self {
        Self::User(user)
    }
}

impl From<Location> for AnyRecord {
    fn from(location: Location) -> Self {
        Self::Location(location)
    }
}

impl From<Event> for AnyRecord {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl From<Participant> for AnyRecord {
    fn from(participant: Participant) -> Self {
        Self::Participant(participant)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_foreign_keys_default_to_absent() {
        let json = serde_json::json!({
            "id": "e1",
            "title": "standup",
            "desc": "daily sync",
            "date": "2024-05-01",
            "from": "09:00",
            "to": "09:15"
        });
        let event: Event = serde_json::from_value(json).unwrap();
        assert!(event.location_id.is_none());
        assert!(event.user_id.is_none());
    }

    #[test]
    fn location_uses_short_coordinate_names_on_the_wire() {
        let location = Location {
            id: LocationId::new("l1"),
            name: String::from("Hall"),
            desc: String::from("Main hall"),
            lat: 41.0,
            lng: 29.0,
        };
        let value = serde_json::to_value(&location).unwrap();
        assert!(value.get("lat").is_some());
        assert!(value.get("lng").is_some());
    }

    #[test]
    fn participant_accepts_numeric_foreign_keys() {
        let json = serde_json::json!({ "id": 3, "user_id": 1, "event_id": "2" });
        let participant: Participant = serde_json::from_value(json).unwrap();
        assert_eq!(participant.id.as_str(), "3");
        assert_eq!(participant.user_id.as_str(), "1");
        assert_eq!(participant.event_id.as_str(), "2");
    }
}
