use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use todo_types::{Item, ItemId, Page, PageRequest};

use crate::error::{StoreError, StoreResult};
use crate::records::RecordSet;
use crate::traits::ItemStore;

/// In-memory item store.
///
/// Intended for tests and ephemeral runs. All records live in a
/// [`RecordSet`] behind a `RwLock`. Records are cloned on read and write.
/// Data is lost when the store is dropped.
pub struct InMemoryItemStore {
    records: RwLock<RecordSet>,
}

impl InMemoryItemStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(RecordSet::new()),
        }
    }

    /// Remove all records. The id counter is left where it is.
    pub fn clear(&self) -> StoreResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, RecordSet>> {
        self.records.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, RecordSet>> {
        self.records.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for InMemoryItemStore {
    fn save(&self, item: Item) -> StoreResult<Item> {
        self.write()?.save(item)
    }

    fn find_by_id(&self, id: ItemId) -> StoreResult<Option<Item>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn find_page(&self, request: &PageRequest) -> StoreResult<Page<Item>> {
        Ok(self.read()?.page(request))
    }

    fn delete_by_id(&self, id: ItemId) -> StoreResult<bool> {
        Ok(self.write()?.remove(id))
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.read()?.len() as u64)
    }
}

impl std::fmt::Debug for InMemoryItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.count().unwrap_or_default();
        f.debug_struct("InMemoryItemStore")
            .field("item_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use todo_types::{ItemField, Sort, SortOrder};

    const DEFAULT_DESCRIPTION: &str = "AAAAAAAAAA";
    const UPDATED_DESCRIPTION: &str = "BBBBBBBBBB";

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn save_assigns_id() {
        let store = InMemoryItemStore::new();
        let saved = store.save(Item::new(DEFAULT_DESCRIPTION)).unwrap();
        assert_eq!(saved.id, Some(ItemId::FIRST));
        assert_eq!(saved.description, DEFAULT_DESCRIPTION);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn find_by_id_returns_current_values() {
        let store = InMemoryItemStore::new();
        let saved = store.save(Item::new(DEFAULT_DESCRIPTION)).unwrap();
        let found = store.find_by_id(saved.id.unwrap()).unwrap().expect("should exist");
        assert!(found.same_content(&saved));
    }

    #[test]
    fn find_missing_returns_none() {
        let store = InMemoryItemStore::new();
        assert!(store.find_by_id(ItemId::new(u64::MAX)).unwrap().is_none());
    }

    #[test]
    fn save_with_id_overwrites() {
        let store = InMemoryItemStore::new();
        let saved = store.save(Item::new(DEFAULT_DESCRIPTION)).unwrap();
        let id = saved.id.unwrap();
        store.save(Item::with_id(id, UPDATED_DESCRIPTION)).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let found = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.description, UPDATED_DESCRIPTION);
    }

    #[test]
    fn save_with_unknown_id_inserts() {
        let store = InMemoryItemStore::new();
        let id = ItemId::new(99);
        store.save(Item::with_id(id, DEFAULT_DESCRIPTION)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.exists_by_id(id).unwrap());

        let next = store.save(Item::new("after")).unwrap();
        assert_eq!(next.id, Some(ItemId::new(100)));
    }

    #[test]
    fn max_id_never_reassigned() {
        let store = InMemoryItemStore::new();
        let max = ItemId::new(u64::MAX);
        store.save(Item::with_id(max, DEFAULT_DESCRIPTION)).unwrap();

        let err = store.save(Item::new(UPDATED_DESCRIPTION)).unwrap_err();
        assert!(matches!(err, StoreError::IdSpaceExhausted));
        assert_eq!(store.count().unwrap(), 1);
        let kept = store.find_by_id(max).unwrap().unwrap();
        assert_eq!(kept.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn delete_present_item() {
        let store = InMemoryItemStore::new();
        let id = store.save(Item::new(DEFAULT_DESCRIPTION)).unwrap().id.unwrap();
        assert!(store.delete_by_id(id).unwrap());
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.find_by_id(id).unwrap().is_none());
    }

    #[test]
    fn delete_missing_item() {
        let store = InMemoryItemStore::new();
        store.save(Item::new(DEFAULT_DESCRIPTION)).unwrap();
        assert!(!store.delete_by_id(ItemId::new(42)).unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn ids_not_reused_after_delete() {
        let store = InMemoryItemStore::new();
        let first = store.save(Item::new("a")).unwrap().id.unwrap();
        store.delete_by_id(first).unwrap();
        let second = store.save(Item::new("b")).unwrap().id.unwrap();
        assert!(second > first);
    }

    #[test]
    fn clear_keeps_counter() {
        let store = InMemoryItemStore::new();
        store.save(Item::new("a")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        let next = store.save(Item::new("b")).unwrap();
        assert_eq!(next.id, Some(ItemId::new(2)));
    }

    // -----------------------------------------------------------------------
    // Paging
    // -----------------------------------------------------------------------

    #[test]
    fn find_page_sorted_by_description() {
        let store = InMemoryItemStore::new();
        for d in ["pear", "apple", "fig"] {
            store.save(Item::new(d)).unwrap();
        }
        let request =
            PageRequest::new(0, 10, Sort::by(SortOrder::asc(ItemField::Description))).unwrap();
        let page = store.find_page(&request).unwrap();
        let descriptions: Vec<&str> = page.content.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["apple", "fig", "pear"]);
        assert_eq!(page.total_elements, 3);
    }

    #[test]
    fn find_page_slices() {
        let store = InMemoryItemStore::new();
        for i in 0..5 {
            store.save(Item::new(format!("item-{i}"))).unwrap();
        }
        let request = PageRequest::new(1, 2, Sort::unsorted()).unwrap();
        let page = store.find_page(&request).unwrap();
        let ids: Vec<u64> = page.content.iter().filter_map(|i| i.id).map(ItemId::get).collect();
        assert_eq!(ids, vec![3, 4]);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_saves_get_distinct_ids() {
        let store = Arc::new(InMemoryItemStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..25)
                        .map(|i| store.save(Item::new(format!("{t}-{i}"))).unwrap().id.unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<ItemId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(store.count().unwrap(), 200);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryItemStore::new();
        store.save(Item::new("a")).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryItemStore"));
        assert!(debug.contains("item_count: 1"));
    }
}
