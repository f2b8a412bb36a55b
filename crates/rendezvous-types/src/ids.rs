//! Type-safe identifier wrappers around opaque strings.
//!
//! Every record kind has its own identifier type so a `UserId` can never be
//! passed where an `EventId` is expected. The wrapped value is opaque: the
//! service only ever compares identifiers for equality.
//!
//! Identifiers deserialize from either a JSON string or a JSON integer.
//! Integers are canonicalised to their decimal text at the boundary, so a
//! seed file that writes `"id": 1` and a client that sends `"1"` address the
//! same record. Once inside the service, comparison is strict string
//! equality.

use serde::{Deserialize, Deserializer, Serialize};

/// Wire representation accepted for any identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Signed(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
        }
    }
}

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_text()))
            }
        }
    };
}

define_id! {
    /// Unique identifier for a user account.
    UserId
}

define_id! {
    /// Unique identifier for a location that can host events.
    LocationId
}

define_id! {
    /// Unique identifier for a scheduled event.
    EventId
}

define_id! {
    /// Unique identifier for a participation record (user attending an event).
    ParticipantId
}
