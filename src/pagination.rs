//! Page-number pagination for list endpoints.
//!
//! Clients send `page` (1-based) and optionally `page_size`. Each endpoint
//! has its own default size and cap; the cap only limits an explicit
//! `page_size`, the default is used as-is when none is given.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub default_size: i64,
    pub max_size: i64,
}

pub const ACTOR_PAGES: PageSettings = PageSettings { default_size: 15, max_size: 15 };
pub const RESERVATION_PAGES: PageSettings = PageSettings { default_size: 5, max_size: 5 };
pub const PLAY_PAGES: PageSettings = PageSettings { default_size: 10, max_size: 5 };

/// Raw query parameters; kept as strings so a bad value never rejects the request outright.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }
}

impl PageParams {
    pub fn resolve(&self, settings: PageSettings) -> Result<PageRequest, Error> {
        // An unusable page_size falls back to the default
        let size = self
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|size| *size > 0)
            .map(|size| size.min(settings.max_size))
            .unwrap_or(settings.default_size);

        let page = match self.page.as_deref() {
            None => 1,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|page| *page > 0)
                .ok_or_else(|| invalid_page(raw))?,
        };

        // A page whose offset does not fit in i64 is past any real result set
        if (page - 1).checked_mul(size).is_none() {
            return Err(invalid_page(&page.to_string()));
        }

        Ok(PageRequest { page, size })
    }

    /// Stable representation for cache keys
    pub fn cache_fragment(&self) -> String {
        format!(
            "page={}&page_size={}",
            self.page.as_deref().unwrap_or(""),
            self.page_size.as_deref().unwrap_or("")
        )
    }
}

fn invalid_page(raw: &str) -> Error {
    Error::not_found("Page", raw)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Page 1 always exists; any later page must start inside `count`.
    pub fn new(results: Vec<T>, count: i64, request: PageRequest) -> Result<Self, Error> {
        if request.page > 1 && request.offset() >= count {
            return Err(invalid_page(&request.page.to_string()));
        }

        let has_next = request.offset() + (results.len() as i64) < count;
        Ok(Page {
            count,
            next: has_next.then_some(request.page + 1),
            previous: (request.page > 1).then_some(request.page - 1),
            results,
        })
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
