//! Page-number pagination over an ordered snapshot.
//!
//! Requested page numbers come straight from the query string and never make
//! pagination fail: garbage selects the first page, numbers outside the valid
//! range are clamped to the nearest page.

use serde::Serialize;

/// Default number of items on a page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

const LAST_PAGE: &str = "last";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A zero `page_size` is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(total / page_size)`, but never less than one page.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Resolves a raw `page` value against a collection of `total` items.
    pub fn resolve_page(&self, total: usize, requested: Option<&str>) -> usize {
        let pages = self.page_count(total);
        let Some(raw) = requested.map(str::trim) else {
            return 1;
        };
        if raw == LAST_PAGE {
            return pages;
        }
        match raw.parse::<i64>() {
            Ok(number) if number < 1 => 1,
            Ok(number) => usize::try_from(number).map_or(pages, |n| n.min(pages)),
            // Out of i64 range but still all digits: past the end.
            Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => pages,
            Err(_) => 1,
        }
    }

    /// Cuts the requested page out of `items`, keeping their order.
    pub fn paginate<T>(&self, items: Vec<T>, requested: Option<&str>) -> Page<T> {
        let total = items.len();
        let number = self.resolve_page(total, requested);
        let start = (number - 1) * self.page_size;
        let page_items: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();

        Page::new(page_items, number, self.page_count(total), total, self.page_size)
    }
}

/// One page of a feed plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    fn new(
        items: Vec<T>,
        number: usize,
        total_pages: usize,
        total_items: usize,
        page_size: usize,
    ) -> Self {
        Self {
            items,
            number,
            total_pages,
            total_items,
            page_size,
            has_next: number < total_pages,
            has_previous: number > 1,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next.then_some(self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous.then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page; 0 for an empty collection.
    pub fn start_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item on this page; 0 for an empty collection.
    pub fn end_index(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.start_index() + self.items.len() - 1
        }
    }

    /// Keeps the metadata and transforms every item.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            total_pages: self.total_pages,
            total_items: self.total_items,
            page_size: self.page_size,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
