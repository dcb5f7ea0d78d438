use todo_types::{Item, ItemId, Page, PageRequest};

use crate::error::StoreResult;

/// Durable storage for [`Item`] records.
///
/// All implementations must satisfy these invariants:
/// - `save` of an item without an id assigns a fresh identifier that has never
///   been handed out before.
/// - `save` of an item with an id stores it verbatim under that id, whether or
///   not a record already existed there. There is no version check, so
///   concurrent writers to one id are last-writer-wins.
/// - Reads never observe a half-applied write.
/// - All I/O errors are propagated, never silently ignored.
///
/// Methods are synchronous and may block on file I/O. Async callers run them
/// on a blocking pool (`tokio::task::spawn_blocking`).
pub trait ItemStore: Send + Sync {
    /// Persist an item and return it as stored (with its id set).
    fn save(&self, item: Item) -> StoreResult<Item>;

    /// Read an item by id.
    ///
    /// Returns `Ok(None)` if no record exists under `id`.
    fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Read one page of items, ordered per the request's sort.
    ///
    /// A page past the end of the record set is empty, not an error.
    fn find_page(&self, request: &PageRequest) -> StoreResult<Page<Item>>;

    /// Delete an item by id. Returns `true` if a record existed.
    fn delete_by_id(&self, id: ItemId) -> StoreResult<bool>;

    /// Number of records currently stored.
    fn count(&self) -> StoreResult<u64>;

    /// Check whether a record exists under `id`.
    fn exists_by_id(&self, id: ItemId) -> StoreResult<bool> {
        Ok(self.find_by_id(id)?.is_some())
    }
}
