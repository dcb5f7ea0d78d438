//! Item storage for the todo service.
//!
//! The store is the sole owner of identifier assignment and of the
//! authoritative record set. Handlers hold no state of their own between
//! requests; everything they return comes from here.
//!
//! # Storage Backends
//!
//! All backends implement the [`ItemStore`] trait:
//!
//! - [`InMemoryItemStore`] -- `BTreeMap`-based store for tests and ephemeral runs
//! - [`LogItemStore`] -- append-only record log on disk, replayed on open
//!
//! # Design Rules
//!
//! 1. `save` assigns the next identifier when the item has none, otherwise it
//!    overwrites whatever is stored under that identifier (blind upsert).
//! 2. Identifiers are never reused, not even after deletion or a restart.
//! 3. Deleting an absent identifier is a successful no-op.
//! 4. Listings are totally ordered: requested criteria first, then ascending id.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod log;
pub mod memory;
pub mod records;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use log::{LogItemStore, SyncMode};
pub use memory::InMemoryItemStore;
pub use records::RecordSet;
pub use traits::ItemStore;
