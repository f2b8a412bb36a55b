//! Identifier generation, injected into the mutation service.
//!
//! The store treats identifiers as opaque strings. [`UuidGenerator`] is the
//! production default; [`SequentialGenerator`] produces short, readable ids
//! (`u1`, `e3`) for demos and tests. Uniqueness against existing records is
//! enforced by the caller, so a generator may safely restart from a value
//! already present in a seeded collection.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rendezvous_types::EntityKind;
use serde::Deserialize;
use uuid::Uuid;

/// A source of fresh identifier text.
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Produce a new identifier for a record of the given kind.
    fn generate(&self, kind: EntityKind) -> String;
}

/// Generates UUID v7 (time-ordered) identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self, _kind: EntityKind) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Generates `<prefix><n>` identifiers with an independent counter per kind.
#[derive(Debug, Default)]
pub struct SequentialGenerator {
    users: AtomicU64,
    locations: AtomicU64,
    events: AtomicU64,
    participants: AtomicU64,
}

impl SequentialGenerator {
    /// Create a generator whose first identifier for every kind ends in `1`.
    pub fn new() -> Self {
        Self::default()
    }

    const fn counter(&self, kind: EntityKind) -> &AtomicU64 {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Location => &self.locations,
            EntityKind::Event => &self.events,
            EntityKind::Participant => &self.participants,
        }
    }
}

impl IdGenerator for SequentialGenerator {
    fn generate(&self, kind: EntityKind) -> String {
        let n = self
            .counter(kind)
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        format!("{}{n}", kind.id_prefix())
    }
}

/// Which generator the service should be built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// [`UuidGenerator`].
    #[default]
    Uuid,
    /// [`SequentialGenerator`].
    Sequential,
}

impl IdStrategy {
    /// Construct the generator for this strategy.
    pub fn build(self) -> Arc<dyn IdGenerator> {
        match self {
            Self::Uuid => Arc::new(UuidGenerator),
            Self::Sequential => Arc::new(SequentialGenerator::new()),
        }
    }
}
