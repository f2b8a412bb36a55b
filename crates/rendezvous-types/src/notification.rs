//! Notification payloads published when records are created.
//!
//! A [`Notification`] serializes as `{"topic": "...", "payload": {...}}` so
//! a subscriber can tell the channel from the frame alone.

use serde::{Deserialize, Serialize};

use crate::enums::Topic;
use crate::ids::UserId;
use crate::structs::{Event, Participant, User};

/// A newly created record announced on its topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload", rename_all = "kebab-case")]
pub enum Notification {
    /// A user was created.
    UserCreated(User),
    /// An event was created.
    EventCreated(Event),
    /// A participant was added to an event.
    ParticipantAdded(Participant),
}

impl Notification {
    /// The topic this notification is published on.
    pub const fn topic(&self) -> Topic {
        match self {
            Self::UserCreated(_) => Topic::UserCreated,
            Self::EventCreated(_) => Topic::EventCreated,
            Self::ParticipantAdded(_) => Topic::ParticipantAdded,
        }
    }

    /// The user id a subscriber filter is compared against.
    ///
    /// For a created user this is the user's own id; for events and
    /// participants it is their `user_id` foreign key.
    pub const fn subject_user(&self) -> Option<&UserId> {
        match self {
            Self::UserCreated(user) => Some(&user.id),
            Self::EventCreated(event) => event.user_id.as_ref(),
            Self::ParticipantAdded(participant) => Some(&participant.user_id),
        }
    }

    /// Whether a subscriber with the given filter should receive this
    /// notification. No filter accepts everything.
    pub fn matches(&self, filter: Option<&UserId>) -> bool {
        filter.is_none_or(|wanted| self.subject_user() == Some(wanted))
    }
}
