//! Catalog persistence: a SQLite-backed [`CatalogStore`](crate::app::ports::CatalogStore)
//! and the paginated read queries served by the HTTP API.

pub mod query;
pub mod sqlite;

pub use query::{EventPage, EventQuery, Filters, PageWindow};
pub use sqlite::{ConnectionFactory, SqliteCatalog};
