//! Fixed-size pagination for list views.

use serde::Serialize;
use thiserror::Error;

/// Number of rows shown per page in paginated list views.
pub const PAGE_SIZE: u64 = 5;

/// Requested page, parsed from the `page` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// One-based page number.
    Number(u64),
    /// The final page, whatever its number.
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::Number(1)
    }
}

impl PageRequest {
    /// Parses a `page` query value. Missing or blank values select page 1.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NotAnInteger`] for non-numeric input or
    /// [`PageError::LessThanOne`] for zero.
    pub fn parse(raw: Option<&str>) -> Result<Self, PageError> {
        let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::default());
        };
        if value == "last" {
            return Ok(Self::Last);
        }
        let number = value
            .parse::<u64>()
            .map_err(|_| PageError::NotAnInteger(value.to_owned()))?;
        if number == 0 {
            return Err(PageError::LessThanOne);
        }
        Ok(Self::Number(number))
    }

    /// Resolves the request against a result count.
    ///
    /// Page 1 of an empty result set is valid.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::OutOfRange`] when the page lies past the end.
    pub fn window(self, total: u64) -> Result<PageWindow, PageError> {
        let num_pages = page_count(total);
        let number = match self {
            Self::Number(number) => number,
            Self::Last => num_pages,
        };
        if number > num_pages {
            return Err(PageError::OutOfRange(number));
        }
        Ok(PageWindow {
            number,
            num_pages,
            offset: (number - 1) * PAGE_SIZE,
            limit: PAGE_SIZE,
            total,
        })
    }
}

/// Resolved slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// One-based page number.
    pub number: u64,
    /// Total number of pages (at least 1).
    pub num_pages: u64,
    /// Rows to skip.
    pub offset: u64,
    /// Rows to take.
    pub limit: u64,
    /// Rows in the full result set.
    pub total: u64,
}

impl PageWindow {
    /// Applies the window to an already ordered in-memory list.
    #[must_use]
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// One-based page number.
    pub number: u64,
    /// Total number of pages (at least 1).
    pub num_pages: u64,
    /// Rows in the full result set.
    pub total: u64,
    /// Whether a following page exists.
    pub has_next: bool,
    /// Whether a preceding page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Builds a page from the rows selected by `window`.
    #[must_use]
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            total: window.total,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }

    /// Returns an empty first page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            number: 1,
            num_pages: 1,
            total: 0,
            has_next: false,
            has_previous: false,
        }
    }

    /// Converts every row, keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

/// Errors raised while resolving a page request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PageError {
    /// The page value is not a number.
    #[error("that page number is not an integer: {0}")]
    NotAnInteger(String),
    /// The page number is zero.
    #[error("that page number is less than 1")]
    LessThanOne,
    /// The page lies past the last page.
    #[error("page {0} contains no results")]
    OutOfRange(u64),
}

const fn page_count(total: u64) -> u64 {
    if total == 0 { 1 } else { total.div_ceil(PAGE_SIZE) }
}
