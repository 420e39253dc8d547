// ==========================================
// Inventory Count Automation - SQLite data-source feed
// ==========================================
// Supplies counting rows straight from a query result, bypassing
// the file reader. The connection is opened read-only; the result
// goes through the normalizer in aggregate mode.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalizer_trait::RawTable;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// busy_timeout for the feed connection (milliseconds)
pub const FEED_BUSY_TIMEOUT_MS: u64 = 5_000;

pub struct SqliteFeed {
    conn: Connection,
    label: String,
}

impl SqliteFeed {
    pub fn open(db_path: &Path) -> ImportResult<Self> {
        if !db_path.exists() {
            return Err(ImportError::FileNotFound(db_path.display().to_string()));
        }
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_millis(FEED_BUSY_TIMEOUT_MS))?;
        Ok(Self {
            conn,
            label: db_path.display().to_string(),
        })
    }

    /// Wraps an existing connection (tests, in-memory databases).
    pub fn from_connection(conn: Connection, label: impl Into<String>) -> Self {
        Self {
            conn,
            label: label.into(),
        }
    }

    /// Runs `query` and returns its result with column names as headers.
    #[instrument(skip(self, query), fields(source = %self.label))]
    pub fn fetch_table(&self, query: &str) -> ImportResult<RawTable> {
        let mut stmt = self.conn.prepare(query)?;
        let headers: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        let column_count = headers.len();

        let mut table = RawTable::new(format!("{} (query)", self.label), headers);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(value_to_string(row.get_ref(idx)?));
            }
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }
            table.rows.push(values);
        }

        info!(rows = table.len(), "data-source rows fetched");
        Ok(table)
    }
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).trim().to_string(),
        ValueRef::Blob(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_with_rows() -> SqliteFeed {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE counts (material TEXT, plant TEXT, storage_bin TEXT, qty REAL);
             INSERT INTO counts VALUES ('M1', 'BR01', '12345', 4.5);
             INSERT INTO counts VALUES (NULL, NULL, NULL, NULL);
             INSERT INTO counts VALUES ('M2', 'BR01', 'A-01', 3);",
        )
        .unwrap();
        SqliteFeed::from_connection(conn, "memory")
    }

    #[test]
    fn test_fetch_table_headers_and_rows() {
        let feed = feed_with_rows();
        let query = "SELECT material AS Material, plant AS Plant, \
                     storage_bin AS \"Storage Bin\", qty AS \"Counted quantity\" FROM counts";
        let table = feed.fetch_table(query).unwrap();

        assert_eq!(table.headers, vec!["Material", "Plant", "Storage Bin", "Counted quantity"]);
        assert_eq!(table.len(), 2, "all-null row is skipped");
        assert_eq!(table.cell(0, 3), "4.5");
        assert_eq!(table.cell(1, 3), "3");
    }

    #[test]
    fn test_bad_query_is_feed_error() {
        let feed = feed_with_rows();
        let result = feed.fetch_table("SELECT nope FROM missing_table");
        assert!(matches!(result, Err(ImportError::FeedQueryError(_))));
    }
}
