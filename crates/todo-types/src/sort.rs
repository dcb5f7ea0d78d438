use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::item::Item;

/// Item properties a listing can be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemField {
    Id,
    Description,
}

impl ItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Description => "description",
        }
    }

    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Description => a.description.cmp(&b.description),
        }
    }
}

impl FromStr for ItemField {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(Self::Id),
            "description" => Ok(Self::Description),
            other => Err(TypeError::UnknownProperty(other.to_string())),
        }
    }
}

impl fmt::Display for ItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for Direction {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(TypeError::UnknownDirection(s.to_string())),
        }
    }
}

/// One ordering criterion: a property and a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub property: ItemField,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: ItemField) -> Self {
        Self {
            property,
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: ItemField) -> Self {
        Self {
            property,
            direction: Direction::Desc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.property, self.direction.as_str())
    }
}

/// Ordered list of sort criteria, applied left to right.
///
/// Records that compare equal under every criterion fall back to ascending
/// identifier order, so a sort is always total and repeatable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    orders: Vec<SortOrder>,
}

impl Sort {
    /// No explicit criteria: ascending identifier order.
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(order: SortOrder) -> Self {
        Self {
            orders: vec![order],
        }
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn push(&mut self, order: SortOrder) {
        self.orders.push(order);
    }

    /// Parse one `sort` query value and append its criteria.
    ///
    /// The value is a comma-separated list of properties, optionally ending in
    /// a direction that applies to every property in the value:
    /// `id`, `id,desc`, `description,id,asc`. Empty segments are ignored.
    pub fn push_param(&mut self, value: &str) -> Result<(), TypeError> {
        let mut parts: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        let direction = match parts.last().copied() {
            Some(last) => match last.parse::<Direction>() {
                Ok(direction) => {
                    parts.pop();
                    direction
                }
                // `id,sideways`: a trailing segment that is neither.
                Err(e) if parts.len() > 1 && last.parse::<ItemField>().is_err() => {
                    return Err(e)
                }
                Err(_) => Direction::Asc,
            },
            None => Direction::Asc,
        };

        for part in parts {
            self.orders.push(SortOrder {
                property: part.parse()?,
                direction,
            });
        }
        Ok(())
    }

    /// Total order over stored items under this sort.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        self.orders
            .iter()
            .map(|order| order.direction.apply(order.property.compare(a, b)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}
