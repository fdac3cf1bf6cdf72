pub mod dedupe;
pub mod json_search;
pub mod sanitize;
