//! Aggregates partner webinar and conference listings into one catalog.
//!
//! The scrape pipeline fetches each source's JSON, maps it onto
//! [`types::UnifiedEvent`], drops duplicates by natural key, exports a CSV
//! snapshot and inserts new rows into the catalog store. A small HTTP API
//! serves paginated queries over the stored catalog.

pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod server;
pub mod storage;
pub mod types;
