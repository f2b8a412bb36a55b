//! In-memory data core for the Rendezvous service.
//!
//! This crate holds every record in process memory and implements the
//! service's semantics independently of any transport:
//!
//! - **[`store`]** -- one ordered, identifier-unique [`Collection`] per
//!   record kind, each behind its own read/write lock
//! - **[`mutation`]** -- create/update/delete/delete-all with existence
//!   checks and injected identifier generation ([`id_gen`])
//! - **[`resolver`]** -- on-demand relation lookups by linear scan, so
//!   reads always see the latest writes
//! - **[`bus`]** -- topic-keyed multicast of creation notifications with
//!   per-subscriber filters
//! - **[`service`]** -- the [`DataService`] facade handed to the boundary
//!   layer
//!
//! # Consistency
//!
//! Each mutation holds its collection's write lock for the whole
//! check-and-write sequence. Reads take read locks and never observe a
//! partially applied mutation. Writes to different kinds do not contend.
//! There are no cross-collection transactions and no cascading deletes.
//!
//! [`Collection`]: collection::Collection

pub mod bus;
pub mod collection;
pub mod error;
pub mod id_gen;
pub mod mutation;
pub mod resolver;
pub mod service;
pub mod store;

// Re-export primary types for convenience.
pub use bus::{DEFAULT_CHANNEL_CAPACITY, NotificationBus, Subscription};
pub use collection::Collection;
pub use error::StoreError;
pub use id_gen::{IdGenerator, IdStrategy, SequentialGenerator, UuidGenerator};
pub use mutation::MutationService;
pub use resolver::{Related, Relation, Resolver};
pub use service::DataService;
pub use store::{EntityStore, Stored, load_seed, parse_seed};
