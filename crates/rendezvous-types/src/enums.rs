//! Enumeration types shared by every layer of the service.
//!
//! [`EntityKind`] names the four record collections and [`Topic`] names the
//! notification channels. Both parse from the names used on the wire so the
//! boundary layer can turn a request path or payload into a typed value.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known kind or topic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseNameError {
    /// The string is not an entity kind.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    /// The string is not a notification topic.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

/// One of the four record kinds held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A user account.
    User,
    /// A place where events happen.
    Location,
    /// A scheduled event.
    Event,
    /// A user attending an event.
    Participant,
}

impl EntityKind {
    /// Every kind, in collection order.
    pub const ALL: [Self; 4] = [Self::User, Self::Location, Self::Event, Self::Participant];

    /// Human-readable singular name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Location => "Location",
            Self::Event => "Event",
            Self::Participant => "Participant",
        }
    }

    /// Plural collection name used in routes and seed files.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Location => "locations",
            Self::Event => "events",
            Self::Participant => "participants",
        }
    }

    /// Short prefix used by sequential identifier generation.
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::User => "u",
            Self::Location => "l",
            Self::Event => "e",
            Self::Participant => "p",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = ParseNameError;

    /// Accepts the singular or plural name in any letter case
    /// (`user`, `Users`, `participant`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| {
                lowered == kind.collection() || lowered == kind.name().to_ascii_lowercase()
            })
            .ok_or_else(|| ParseNameError::UnknownKind(s.to_owned()))
    }
}

/// A named notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    /// Published after a user is created.
    UserCreated,
    /// Published after an event is created.
    EventCreated,
    /// Published after a participant is added to an event.
    ParticipantAdded,
}

impl Topic {
    /// Every topic.
    pub const ALL: [Self; 3] = [Self::UserCreated, Self::EventCreated, Self::ParticipantAdded];

    /// Wire name of the topic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserCreated => "user-created",
            Self::EventCreated => "event-created",
            Self::ParticipantAdded => "participant-added",
        }
    }

    /// Whether subscribers may narrow this topic with a `user_id` filter.
    pub const fn accepts_user_filter(self) -> bool {
        matches!(self, Self::EventCreated | Self::ParticipantAdded)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| ParseNameError::UnknownTopic(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_singular_and_plural() {
        assert_eq!("user".parse::<EntityKind>().unwrap(), EntityKind::User);
        assert_eq!("Users".parse::<EntityKind>().unwrap(), EntityKind::User);
        assert_eq!(
            "participants".parse::<EntityKind>().unwrap(),
            EntityKind::Participant
        );
        assert!("venue".parse::<EntityKind>().is_err());
    }

    #[test]
    fn topic_round_trips_through_wire_name() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
        assert_eq!(
            serde_json::to_string(&Topic::ParticipantAdded).unwrap(),
            "\"participant-added\""
        );
    }

    #[test]
    fn only_event_and_participant_topics_take_filters() {
        assert!(!Topic::UserCreated.accepts_user_filter());
        assert!(Topic::EventCreated.accepts_user_filter());
        assert!(Topic::ParticipantAdded.accepts_user_filter());
    }
}
