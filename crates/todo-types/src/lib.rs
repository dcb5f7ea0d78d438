//! Foundation types for the todo service.
//!
//! Every other crate in the workspace depends on `todo-types`.
//!
//! # Key Types
//!
//! - [`ItemId`]: Store-assigned numeric identifier
//! - [`Item`]: The single persisted entity (identifier + description)
//! - [`Sort`] / [`SortOrder`]: Requested ordering of a listing
//! - [`PageRequest`]: Zero-based page index, page size, and sort
//! - [`Page`]: One ordered slice of the record set plus its total count

pub mod error;
pub mod item;
pub mod page;
pub mod sort;

pub use error::TypeError;
pub use item::{Item, ItemId, ENTITY_NAME};
pub use page::{Page, PageRequest};
pub use sort::{Direction, ItemField, Sort, SortOrder};
