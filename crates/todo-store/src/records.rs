use std::collections::BTreeMap;

use todo_types::{Item, ItemId, Page, PageRequest};

use crate::error::{StoreError, StoreResult};

/// The authoritative record set shared by every backend.
///
/// Holds the records keyed by id together with the highest identifier ever
/// assigned or stored. That high-water mark only moves forward, so an
/// identifier is never handed out twice. Once `u64::MAX` has been used,
/// assignment fails instead of wrapping.
#[derive(Clone, Debug, Default)]
pub struct RecordSet {
    items: BTreeMap<ItemId, Item>,
    last_id: Option<ItemId>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `item` an id if it has none, without storing it.
    pub fn assign(&mut self, mut item: Item) -> StoreResult<Item> {
        if item.id.is_none() {
            let id = self.next_id().ok_or(StoreError::IdSpaceExhausted)?;
            self.last_id = Some(id);
            item.id = Some(id);
        }
        Ok(item)
    }

    /// Store an item that already carries an id, replacing any previous
    /// record under that id. Items without an id are ignored.
    pub fn insert(&mut self, item: Item) {
        let Some(id) = item.id else {
            return;
        };
        self.retire_through(id);
        self.items.insert(id, item);
    }

    /// Assign (if needed) and store in one step.
    pub fn save(&mut self, item: Item) -> StoreResult<Item> {
        let item = self.assign(item)?;
        self.insert(item.clone());
        Ok(item)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn remove(&mut self, id: ItemId) -> bool {
        self.items.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Live records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Mark every id up to and including `id` as used.
    pub fn retire_through(&mut self, id: ItemId) {
        if self.last_id.map_or(true, |last| id > last) {
            self.last_id = Some(id);
        }
    }

    /// Highest id ever assigned or stored.
    pub fn last_id(&self) -> Option<ItemId> {
        self.last_id
    }

    /// The id the next assignment will use; `None` once the id space is
    /// used up.
    pub fn next_id(&self) -> Option<ItemId> {
        match self.last_id {
            Some(last) => last.next(),
            None => Some(ItemId::FIRST),
        }
    }

    /// Sort the whole set per `request` and cut out the requested slice.
    pub fn page(&self, request: &PageRequest) -> Page<Item> {
        let total = self.items.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(request.size()).unwrap_or(usize::MAX);

        let content = if request.sort().is_unsorted() {
            self.items.values().skip(offset).take(size).cloned().collect()
        } else {
            let mut all: Vec<&Item> = self.items.values().collect();
            all.sort_by(|a, b| request.sort().compare(a, b));
            all.into_iter().skip(offset).take(size).cloned().collect()
        };

        Page::new(content, request, total)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
