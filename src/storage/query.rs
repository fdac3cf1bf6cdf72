use crate::constants::{EVENTS_PER_PAGE, PAGE_WINDOW};
use crate::types::StoredEvent;
use serde::Serialize;

/// Filters accepted by the events listing. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filters {
    pub q: String,
    pub source: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub filters: Filters,
    pub page: u32,
}

impl EventQuery {
    pub fn new(q: Option<&str>, source: Option<&str>, category: Option<&str>, page: Option<&str>) -> Self {
        let clean = |v: Option<&str>| v.map(|s| s.trim().to_string()).unwrap_or_default();
        // Unparseable or non-positive pages fall back to the first page
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);
        Self {
            filters: Filters {
                q: clean(q),
                source: clean(source),
                category: clean(category),
            },
            page,
        }
    }
}

impl Default for EventQuery {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

/// Pagination numbers for one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub total_pages: u32,
    /// First page number of the navigation block containing `page` (blocks of ten).
    pub start_page: u32,
    pub end_page: u32,
    pub limit: u32,
    pub offset: u64,
}

impl PageWindow {
    pub fn new(page: u32, total: u64) -> Self {
        Self::with_sizes(page, total, EVENTS_PER_PAGE, PAGE_WINDOW)
    }

    pub fn with_sizes(page: u32, total: u64, per_page: u32, window: u32) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let window = window.max(1);
        let total_pages = total.div_ceil(per_page as u64).min(u32::MAX as u64) as u32;
        let start_page = ((page - 1) / window) * window + 1;
        // Saturating: pages near u32::MAX are accepted from the query string
        let end_page = start_page.saturating_add(window - 1).min(total_pages);
        Self {
            page,
            total_pages,
            start_page,
            end_page,
            limit: per_page,
            offset: (page as u64 - 1) * per_page as u64,
        }
    }
}

/// JSON body of `GET /api/events`.
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_events: u64,
    pub start_page: u32,
    pub end_page: u32,
    pub filters: Filters,
    pub events: Vec<StoredEvent>,
}
