//! Error types for the `rendezvous-store` crate.
//!
//! All fallible operations in this crate return [`StoreError`]. The only
//! error a well-formed request can produce is [`StoreError::NotFound`];
//! the remaining variants cover startup (seed loading) and a misbehaving
//! identifier generator.

use std::path::PathBuf;

use rendezvous_types::{EntityKind, Record};

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An update or delete named an identifier absent from its collection.
    #[error("{kind} not found")]
    NotFound {
        /// The collection that was searched.
        kind: EntityKind,
        /// The identifier that was not found.
        id: String,
    },

    /// A record was appended with an identifier already in its collection.
    #[error("duplicate {kind} id: {id}")]
    DuplicateId {
        /// The collection holding the clash.
        kind: EntityKind,
        /// The clashing identifier.
        id: String,
    },

    /// The identifier generator kept producing identifiers already in use.
    #[error("could not generate a unique {kind} id after {attempts} attempts")]
    IdExhausted {
        /// The collection an identifier was needed for.
        kind: EntityKind,
        /// How many identifiers were tried.
        attempts: usize,
    },

    /// The seed file could not be read.
    #[error("failed to read seed file {}: {source}", .path.display())]
    SeedIo {
        /// Path of the seed file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The seed file is not a valid dataset.
    #[error("failed to parse seed data: {source}")]
    SeedParse {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Build a [`StoreError::NotFound`] for record kind `R`.
    pub fn not_found<R: Record>(id: &R::Id) -> Self {
        Self::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        }
    }

    /// Build a [`StoreError::DuplicateId`] for record kind `R`.
    pub fn duplicate<R: Record>(id: &R::Id) -> Self {
        Self::DuplicateId {
            kind: R::KIND,
            id: id.to_string(),
        }
    }

    /// Whether this error reports a missing record.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
