use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Entity name used in alerts, problem bodies, and validation reports.
pub const ENTITY_NAME: &str = "items";

/// Store-assigned identifier of an [`Item`].
///
/// Identifiers are handed out in increasing order by the store and are never
/// reused, even after the record they named has been deleted. On the wire an
/// `ItemId` is a plain JSON number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// The first identifier a fresh store assigns.
    pub const FIRST: ItemId = ItemId(1);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier following this one, or `None` at the end of the id
    /// space.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidId(s.to_string()))
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// The single persisted entity: an identifier plus a required description.
///
/// An item without an `id` has not been saved yet. The store assigns the id
/// on the first save and it never changes afterwards.
///
/// Equality looks only at the identifier: two items are equal iff both have
/// been assigned an id and the ids match. An unsaved item is equal to nothing,
/// itself included, which is why `Item` implements `PartialEq` but not `Eq`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<ItemId>,
    pub description: String,
}

impl Item {
    /// An unsaved item.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: None,
            description: description.into(),
        }
    }

    /// An item carrying an explicit identifier.
    pub fn with_id(id: ItemId, description: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            description: description.into(),
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Field-by-field comparison, for callers that care about content rather
    /// than identity.
    pub fn same_content(&self, other: &Item) -> bool {
        self.id == other.id && self.description == other.description
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
