use super::query::{EventPage, EventQuery, PageWindow};
use crate::app::ports::CatalogStore;
use crate::error::Result;
use crate::types::{StoredEvent, UnifiedEvent};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS partner_events (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        source        TEXT NOT NULL,
        category      TEXT,
        title         TEXT,
        description   TEXT,
        start_date    TEXT,
        end_date      TEXT,
        location      TEXT,
        register_link TEXT
    );
    -- NULL key parts compare equal to each other, never to any text value
    CREATE UNIQUE INDEX IF NOT EXISTS ux_partner_events_natural_key
        ON partner_events (ifnull(title, X'00'), ifnull(start_date, X'00'), source);
    CREATE INDEX IF NOT EXISTS ix_partner_events_start_date
        ON partner_events (start_date);
"#;

const INSERT_IGNORE: &str = "INSERT OR IGNORE INTO partner_events
    (source, category, title, description, start_date, end_date, location, register_link)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_COLUMNS: &str =
    "id, source, category, title, description, start_date, end_date, location, register_link";

/// Opens connections to the catalog database. Each operation acquires its own
/// connection and releases it when the operation returns.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    path: PathBuf,
}

impl ConnectionFactory {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }
}

/// SQLite-backed catalog store.
///
/// Construction does no I/O; the database is opened, and the schema created if
/// needed, by each operation.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    connections: ConnectionFactory,
}

impl SqliteCatalog {
    pub fn new(connections: ConnectionFactory) -> Self {
        Self { connections }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::new(ConnectionFactory::new(path))
    }

    fn connect(&self) -> Result<Connection> {
        let conn = self.connections.open()?;
        conn.execute_batch(SCHEMA)?;
        debug!("Catalog schema ready at {}", self.connections.path().display());
        Ok(conn)
    }

    /// Execute a `;`-separated SQL script in one batch.
    pub fn import_sql(&self, script: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(script)?;
        info!("SQL script imported into {}", self.connections.path().display());
        Ok(())
    }

    /// One page of stored events, newest start date first.
    #[instrument(skip(self))]
    pub fn query_events(&self, query: &EventQuery) -> Result<EventPage> {
        let conn = self.connect()?;

        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<SqlValue> = Vec::new();
        let filters = &query.filters;
        if !filters.q.is_empty() {
            clauses.push("(title LIKE ? OR description LIKE ?)");
            let pattern = format!("%{}%", filters.q);
            args.push(SqlValue::Text(pattern.clone()));
            args.push(SqlValue::Text(pattern));
        }
        if !filters.source.is_empty() {
            clauses.push("source = ?");
            args.push(SqlValue::Text(filters.source.clone()));
        }
        if !filters.category.is_empty() {
            clauses.push("category = ?");
            args.push(SqlValue::Text(filters.category.clone()));
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM partner_events {where_clause}"),
            params_from_iter(args.iter()),
            |row| row.get(0),
        )?;
        let total = total.max(0) as u64;
        let window = PageWindow::new(query.page, total);

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM partner_events {where_clause}
             ORDER BY start_date DESC, id DESC LIMIT ? OFFSET ?"
        );
        args.push(SqlValue::Integer(window.limit as i64));
        args.push(SqlValue::Integer(window.offset as i64));

        let mut stmt = conn.prepare(&sql)?;
        let events = stmt
            .query_map(params_from_iter(args.iter()), stored_event_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(EventPage {
            page: window.page,
            total_pages: window.total_pages,
            total_events: total,
            start_page: window.start_page,
            end_page: window.end_page,
            filters: filters.clone(),
            events,
        })
    }
}

fn stored_event_from_row(row: &Row<'_>) -> rusqlite::Result<StoredEvent> {
    Ok(StoredEvent {
        id: row.get(0)?,
        source: row.get(1)?,
        category: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        location: row.get(7)?,
        register_link: row.get(8)?,
    })
}

impl CatalogStore for SqliteCatalog {
    fn count(&self) -> Result<u64> {
        let conn = self.connect()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM partner_events", [], |row| row.get(0))?;
        Ok(n.max(0) as u64)
    }

    #[instrument(skip(self, events), fields(batch = events.len()))]
    fn insert_if_absent(&self, events: &[UnifiedEvent]) -> Result<usize> {
        let mut conn = self.connect()?;
        // Dropped without commit on any error, which rolls the batch back
        let tx = conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(INSERT_IGNORE)?;
            for event in events {
                inserted += stmt.execute(params![
                    event.source.name(),
                    event.category,
                    event.title,
                    event.description,
                    event.start_date,
                    event.end_date,
                    event.location,
                    event.register_link,
                ])?;
            }
        }
        tx.commit()?;
        info!(
            "{} new events inserted ({} already present)",
            inserted,
            events.len() - inserted
        );
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use tempfile::tempdir;

    fn event(source: Source, title: Option<&str>, start: Option<&str>) -> UnifiedEvent {
        UnifiedEvent {
            source,
            title: title.map(str::to_string),
            description: Some("About the event".to_string()),
            start_date: start.map(str::to_string),
            end_date: None,
            location: None,
            register_link: None,
            category: "Webinar".to_string(),
        }
    }

    #[test]
    fn insert_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::open(dir.path().join("catalog.db"));
        let batch = vec![
            event(Source::UiPath, Some("A"), Some("2025-01-01")),
            event(Source::Nvidia, Some("B"), Some("2025-01-02")),
        ];

        assert_eq!(store.insert_if_absent(&batch).unwrap(), 2);
        assert_eq!(store.insert_if_absent(&batch).unwrap(), 0);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn in_batch_duplicates_store_one_row() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::open(dir.path().join("catalog.db"));
        let mut dup = event(Source::Aws, Some("Same"), Some("2025-05-05"));
        let first = dup.clone();
        dup.category = "Other".to_string();

        assert_eq!(store.insert_if_absent(&[first, dup]).unwrap(), 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn null_key_parts_are_unique_too() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::open(dir.path().join("catalog.db"));
        let batch = vec![
            event(Source::UiPath, None, Some("2025-01-01")),
            event(Source::UiPath, None, Some("2025-01-01")),
            event(Source::UiPath, None, None),
            event(Source::UiPath, None, None),
            // Empty title is a different key from a missing one
            event(Source::UiPath, Some(""), Some("2025-01-01")),
        ];
        assert_eq!(store.insert_if_absent(&batch).unwrap(), 3);
        assert_eq!(store.insert_if_absent(&batch).unwrap(), 0);
    }

    #[test]
    fn reopening_keeps_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.db");
        SqliteCatalog::open(&path)
            .insert_if_absent(&[event(Source::Aws, Some("A"), Some("d"))])
            .unwrap();
        let reopened = SqliteCatalog::open(&path);
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn query_filters_and_pages() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::open(dir.path().join("catalog.db"));
        let mut batch: Vec<UnifiedEvent> = (0..20)
            .map(|i| event(Source::Nvidia, Some(&format!("GPU day {i:02}")), Some(&format!("2025-02-{:02}", i + 1))))
            .collect();
        let mut aws = event(Source::Aws, Some("Serverless summit"), Some("2025-03-01"));
        aws.category = "Conference".to_string();
        aws.description = Some("Deep dive into GPU instances".to_string());
        batch.push(aws);
        store.insert_if_absent(&batch).unwrap();

        let page = store.query_events(&EventQuery::default()).unwrap();
        assert_eq!(page.total_events, 21);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.events.len(), 16);
        assert_eq!(page.events[0].title.as_deref(), Some("Serverless summit"));

        let page = store
            .query_events(&EventQuery::new(None, None, None, Some("2")))
            .unwrap();
        assert_eq!(page.events.len(), 5);
        assert_eq!(page.page, 2);

        // q matches title or description
        let page = store
            .query_events(&EventQuery::new(Some("gpu"), None, None, None))
            .unwrap();
        assert_eq!(page.total_events, 21);

        let page = store
            .query_events(&EventQuery::new(Some("gpu"), Some("AWS"), Some("Conference"), None))
            .unwrap();
        assert_eq!(page.total_events, 1);
        assert_eq!(page.filters.source, "AWS");

        let page = store
            .query_events(&EventQuery::new(None, Some("UiPath"), None, None))
            .unwrap();
        assert_eq!(page.total_events, 0);
        assert!(page.events.is_empty());
    }

    #[test]
    fn unreachable_database_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened as a database file
        let store = SqliteCatalog::open(dir.path());
        assert!(store.count().is_err());
        assert!(store
            .insert_if_absent(&[event(Source::Aws, Some("A"), Some("d"))])
            .is_err());
    }

    #[test]
    fn import_sql_executes_script() {
        let dir = tempdir().unwrap();
        let store = SqliteCatalog::open(dir.path().join("catalog.db"));
        store
            .import_sql(
                "INSERT INTO partner_events (source, category, title, start_date) VALUES ('AWS', 'Webinar', 'x', '2025');
                 INSERT INTO partner_events (source, category, title, start_date) VALUES ('AWS', 'Webinar', 'y', '2025');",
            )
            .unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }
}
