//! Create and update payloads for every record kind.
//!
//! Create inputs carry every required field but no identifier; the store
//! assigns one and turns the input into a record through [`Draft`].
//!
//! Update inputs make every field optional and are applied over an existing
//! record through [`Patch`]. Precedence is explicit: a supplied field
//! replaces the stored value, an omitted field leaves it untouched. The two
//! nullable foreign keys on [`Event`] additionally distinguish an explicit
//! JSON `null` (clear the reference) from omission (keep it).

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::ids::{EventId, LocationId, UserId};
use crate::structs::{Event, Location, Participant, Record, User};

/// A creation payload that becomes a record once an identifier is assigned.
pub trait Draft: Send {
    /// The record this input creates.
    type Output: Record;

    /// Build the record from this input and a freshly generated identifier.
    fn into_record(self, id: <Self::Output as Record>::Id) -> Self::Output;
}

/// A partial update applied over an existing record.
pub trait Patch: Send {
    /// The record this input updates.
    type Target: Record;

    /// Overwrite every supplied field of `target`; omitted fields persist.
    fn apply_to(self, target: &mut Self::Target);

    /// Whether the patch supplies no fields at all.
    fn is_empty(&self) -> bool;
}

/// Replace `slot` with `value` when a value was supplied.
fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Deserialize a field that was present in the payload, keeping `null`
/// distinct from omission. Paired with `#[serde(default)]`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// Fields required to create a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateUserInput {
    /// Display name.
    pub username: String,
    /// Contact address.
    pub email: String,
}

/// Fields that may be changed on a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpdateUserInput {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New contact address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Draft for CreateUserInput {
    type Output = User;

    fn into_record(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
        }
    }
}

impl Patch for UpdateUserInput {
    type Target = User;

    fn apply_to(self, target: &mut User) {
        merge(&mut target.username, self.username);
        merge(&mut target.email, self.email);
    }

    fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none()
    }
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Fields required to create a [`Location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateLocationInput {
    /// Location name.
    pub name: String,
    /// Free-form description.
    pub desc: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// Fields that may be changed on a [`Location`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpdateLocationInput {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// New latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// New longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Draft for CreateLocationInput {
    type Output = Location;

    fn into_record(self, id: LocationId) -> Location {
        Location {
            id,
            name: self.name,
            desc: self.desc,
            lat: self.lat,
            lng: self.lng,
        }
    }
}

impl Patch for UpdateLocationInput {
    type Target = Location;

    fn apply_to(self, target: &mut Location) {
        merge(&mut target.name, self.name);
        merge(&mut target.desc, self.desc);
        merge(&mut target.lat, self.lat);
        merge(&mut target.lng, self.lng);
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.desc.is_none() && self.lat.is_none() && self.lng.is_none()
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// Fields required to create an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateEventInput {
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
    /// Hosting location.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub location_id: Option<LocationId>,
    /// Owning user.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub user_id: Option<UserId>,
}

/// Fields that may be changed on an [`Event`].
///
/// For `location_id` and `user_id` the outer `Option` records whether the
/// field was supplied and the inner one whether it was `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpdateEventInput {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// New date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// New start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// New end time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// New hosting location; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "string | null")]
    pub location_id: Option<Option<LocationId>>,
    /// New owner; `Some(None)` clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "string | null")]
    pub user_id: Option<Option<UserId>>,
}

impl Draft for CreateEventInput {
    type Output = Event;

    fn into_record(self, id: EventId) -> Event {
        Event {
            id,
            title: self.title,
            desc: self.desc,
            date: self.date,
            from: self.from,
            to: self.to,
            location_id: self.location_id,
            user_id: self.user_id,
        }
    }
}

impl Patch for UpdateEventInput {
    type Target = Event;

    fn apply_to(self, target: &mut Event) {
        merge(&mut target.title, self.title);
        merge(&mut target.desc, self.desc);
        merge(&mut target.date, self.date);
        merge(&mut target.from, self.from);
        merge(&mut target.to, self.to);
        merge(&mut target.location_id, self.location_id);
        merge(&mut target.user_id, self.user_id);
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.desc.is_none()
            && self.date.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.location_id.is_none()
            && self.user_id.is_none()
    }
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// Fields required to create a [`Participant`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreateParticipantInput {
    /// The attending user.
    #[ts(type = "string")]
    pub user_id: UserId,
    /// The attended event.
    #[ts(type = "string")]
    pub event_id: EventId,
}

/// Fields that may be changed on a [`Participant`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UpdateParticipantInput {
    /// New attending user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub user_id: Option<UserId>,
    /// New attended event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub event_id: Option<EventId>,
}

impl Draft for CreateParticipantInput {
    type Output = Participant;

    fn into_record(self, id: crate::ids::ParticipantId) -> Participant {
        Participant {
            id,
            user_id: self.user_id,
            event_id: self.event_id,
        }
    }
}

impl Patch for UpdateParticipantInput {
    type Target = Participant;

    fn apply_to(self, target: &mut Participant) {
        merge(&mut target.user_id, self.user_id);
        merge(&mut target.event_id, self.event_id);
    }

    fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.event_id.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        Event {
            id: EventId::new("e1"),
            title: String::from("standup"),
            desc: String::from("daily sync"),
            date: String::from("2024-05-01"),
            from: String::from("09:00"),
            to: String::from("09:15"),
            location_id: Some(LocationId::new("l1")),
            user_id: Some(UserId::new("u1")),
        }
    }

    #[test]
    fn supplied_fields_win_and_omitted_fields_persist() {
        let mut user = User {
            id: UserId::new("u1"),
            username: String::from("ann"),
            email: String::from("ann@example.com"),
        };
        let patch = UpdateUserInput {
            username: Some(String::from("annie")),
            email: None,
        };
        patch.apply_to(&mut user);
        assert_eq!(user.username, "annie");
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.id.as_str(), "u1");
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut event = sample_event();
        let before = event.clone();
        let patch = UpdateEventInput::default();
        assert!(patch.is_empty());
        patch.apply_to(&mut event);
        assert_eq!(event, before);
    }

    #[test]
    fn explicit_null_clears_event_reference_but_omission_keeps_it() {
        let patch: UpdateEventInput =
            serde_json::from_value(serde_json::json!({ "location_id": null })).unwrap();
        assert_eq!(patch.location_id, Some(None));
        assert_eq!(patch.user_id, None);

        let mut event = sample_event();
        patch.apply_to(&mut event);
        assert!(event.location_id.is_none());
        assert_eq!(event.user_id, Some(UserId::new("u1")));
    }

    #[test]
    fn event_reference_can_be_repointed() {
        let patch: UpdateEventInput =
            serde_json::from_value(serde_json::json!({ "user_id": "u2", "title": "retro" }))
                .unwrap();
        let mut event = sample_event();
        patch.apply_to(&mut event);
        assert_eq!(event.user_id, Some(UserId::new("u2")));
        assert_eq!(event.title, "retro");
        assert_eq!(event.desc, "daily sync");
    }

    #[test]
    fn draft_assigns_the_given_identifier() {
        let input = CreateParticipantInput {
            user_id: UserId::new("u1"),
            event_id: EventId::new("e1"),
        };
        let participant = input.into_record(crate::ids::ParticipantId::new("p9"));
        assert_eq!(participant.id.as_str(), "p9");
        assert_eq!(participant.user_id.as_str(), "u1");
    }

    #[test]
    fn location_patch_updates_coordinates_only() {
        let mut location = CreateLocationInput {
            name: String::from("Hall"),
            desc: String::from("Main hall"),
            lat: 1.0,
            lng: 2.0,
        }
        .into_record(LocationId::new("l1"));
        let mut expected = location.clone();
        expected.lat = 3.5;

        UpdateLocationInput {
            lat: Some(3.5),
            ..UpdateLocationInput::default()
        }
        .apply_to(&mut location);
        assert_eq!(location, expected);
    }
}
