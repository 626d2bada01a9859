//! Page-number pagination with silent clamping.
use serde::Serialize;

/// Splits `count` items into pages of `per_page`. There is always at least one
/// page, even when there are no items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    pub count: usize,
    pub per_page: usize,
}

impl Paginator {
    pub fn new(count: usize, per_page: usize) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> usize {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `page` parameter: missing or non-integer gives page 1,
    /// below 1 gives page 1, beyond the end gives the last page.
    pub fn resolve(&self, raw: Option<&str>) -> usize {
        let requested = match raw.map(str::trim) {
            None | Some("") => return 1,
            Some(value) => match value.parse::<i64>() {
                Ok(number) => number,
                Err(_) => return 1,
            },
        };

        if requested < 1 {
            1
        } else {
            (requested as u64).min(self.num_pages() as u64) as usize
        }
    }

    pub fn page(&self, number: usize) -> PageInfo {
        let num_pages = self.num_pages();
        let number = number.clamp(1, num_pages);
        let offset = (number - 1) * self.per_page;
        let len = self.count.saturating_sub(offset).min(self.per_page);

        PageInfo {
            number,
            num_pages,
            count: self.count,
            per_page: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
            next_page_number: (number < num_pages).then_some(number + 1),
            previous_page_number: (number > 1).then(|| number - 1),
            start_index: if len == 0 { 0 } else { offset + 1 },
            end_index: offset + len,
            is_paginated: num_pages > 1,
        }
    }
}

/// One resolved page, as exposed to listing consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: usize,
    pub num_pages: usize,
    pub count: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<usize>,
    pub previous_page_number: Option<usize>,
    /// 1-based index of the first item on this page (0 when empty).
    pub start_index: usize,
    pub end_index: usize,
    pub is_paginated: bool,
}

impl PageInfo {
    pub fn offset(&self) -> usize {
        (self.number - 1) * self.per_page
    }
}
