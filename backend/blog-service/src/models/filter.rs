//! Post selection criteria shared by listings, sidebars and feeds.
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Which part of the page tree a post query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Every live post of the site.
    Site,
    /// Live posts below the given index page.
    DescendantOf(i64),
}

/// Calendar month selected through the `month=YYYY-MM` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthFilter {
    pub year: i32,
    pub month: u32,
}

impl MonthFilter {
    /// Parse `YYYY-MM`. Anything that is not two integers forming a real
    /// calendar month yields `None`, meaning "no month filter".
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('-');
        let year_part = parts.next()?;
        let month_part = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        let year: i32 = year_part.trim().parse().ok()?;
        let month: u32 = month_part.trim().parse().ok()?;
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1)?;

        Some(Self { year, month })
    }

    /// Half-open `[first day, first day of next month)` range.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        // parse() only builds valid months, so both dates exist
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default();
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        }
        .unwrap_or(NaiveDate::MAX);
        (start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Live-post query: scope plus the optional listing filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub scope: PostScope,
    /// Free-text search over title and intro.
    pub search: Option<String>,
    /// Exact tag name.
    pub tag: Option<String>,
    pub month: Option<MonthFilter>,
}

impl PostQuery {
    pub fn new(scope: PostScope) -> Self {
        Self {
            scope,
            search: None,
            tag: None,
            month: None,
        }
    }
}
