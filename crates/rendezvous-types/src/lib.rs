//! Shared type definitions for the Rendezvous data service.
//!
//! This crate is the single source of truth for the records, identifiers,
//! and payloads that flow between the store, the boundary layer, and
//! subscribers. Record and input types are exported to `TypeScript` via
//! `ts-rs` for client code.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for all record identifiers
//! - [`enums`] -- Entity kinds and notification topics
//! - [`structs`] -- The four record structs and the [`Record`] trait
//! - [`inputs`] -- Create/update payloads with explicit merge rules
//! - [`notification`] -- Payloads published to subscribers
//! - [`seed`] -- Startup dataset shape

pub mod enums;
pub mod ids;
pub mod inputs;
pub mod notification;
pub mod seed;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EntityKind, ParseNameError, Topic};
pub use ids::{EventId, LocationId, ParticipantId, UserId};
pub use inputs::{
    CreateEventInput, CreateLocationInput, CreateParticipantInput, CreateUserInput, Draft, Patch,
    UpdateEventInput, UpdateLocationInput, UpdateParticipantInput, UpdateUserInput,
};
pub use notification::Notification;
pub use seed::SeedData;
pub use structs::{AnyRecord, Event, Location, Participant, Record, User};
