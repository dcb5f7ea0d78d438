use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::sort::Sort;

/// A request for one slice of the record set.
///
/// `page` is zero-based. `size` is always at least one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u64,
    size: u64,
    sort: Sort,
}

impl PageRequest {
    pub fn new(page: u64, size: u64, sort: Sort) -> Result<Self, TypeError> {
        if size == 0 {
            return Err(TypeError::ZeroPageSize);
        }
        Ok(Self { page, size, sort })
    }

    /// First page of `size` records in identifier order.
    pub fn first(size: u64) -> Result<Self, TypeError> {
        Self::new(0, size, Sort::unsorted())
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Number of records preceding this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// One ordered slice of the record set plus the size of the whole set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size)
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Index of the last page; `0` for an empty set.
    pub fn last_index(&self) -> u64 {
        self.total_pages().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
