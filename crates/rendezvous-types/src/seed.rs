//! Shape of the static dataset the store can be initialised from.

use serde::{Deserialize, Serialize};

use crate::structs::{Event, Location, Participant, User};

/// Four named record lists loaded once at startup.
///
/// Any list may be omitted from the source document and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    /// Seed users.
    #[serde(default)]
    pub users: Vec<User>,
    /// Seed locations.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Seed events.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Seed participants.
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl SeedData {
    /// Total number of records across all four lists.
    pub fn record_count(&self) -> usize {
        self.users
            .len()
            .saturating_add(self.locations.len())
            .saturating_add(self.events.len())
            .saturating_add(self.participants.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_lists_default_to_empty() {
        let seed: SeedData = serde_json::from_str(
            r#"{ "users": [ { "id": 1, "username": "ann", "email": "ann@example.com" } ] }"#,
        )
        .unwrap();
        assert_eq!(seed.users.len(), 1);
        assert!(seed.locations.is_empty());
        assert!(seed.events.is_empty());
        assert!(seed.participants.is_empty());
        assert_eq!(seed.record_count(), 1);
    }
}
