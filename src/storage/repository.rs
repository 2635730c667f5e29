//! SQLite repository for dataset documents

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::schema::create_tables;
use crate::dataset::DatasetKey;

/// A stored dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetDocument {
    pub id: i64,
    pub filename: String,
    #[serde(skip)]
    pub file: Vec<u8>,
    pub country: String,
    pub tournament: String,
    pub season: String,
    pub time: Option<String>,
    pub created_at: Option<String>,
}

/// A dataset about to be inserted
#[derive(Debug, Clone)]
pub struct NewDataset<'a> {
    pub filename: String,
    pub file: &'a [u8],
    pub key: &'a DatasetKey,
}

/// Document store holding dataset blobs
pub trait DatasetStore: Send + Sync {
    /// Oldest document stored under the composite key
    fn find_by_key(&self, key: &DatasetKey) -> Result<Option<DatasetDocument>>;

    /// Oldest document with this filename
    fn find_by_filename(&self, filename: &str) -> Result<Option<DatasetDocument>>;

    fn find_by_id(&self, id: i64) -> Result<Option<DatasetDocument>>;

    fn find_all(&self) -> Result<Vec<DatasetDocument>>;

    /// Insert a document and return its id
    fn insert(&self, dataset: &NewDataset<'_>) -> Result<i64>;

    /// Replace the blob of every document with this filename
    ///
    /// Key fields keep the values of the first insert.
    fn update_file(&self, filename: &str, file: &[u8]) -> Result<usize>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, filename, file, country, tournament, season, time, created_at FROM datasets";

fn document_from_row(row: &Row<'_>) -> rusqlite::Result<DatasetDocument> {
    Ok(DatasetDocument {
        id: row.get(0)?,
        filename: row.get(1)?,
        file: row.get(2)?,
        country: row.get(3)?,
        tournament: row.get(4)?,
        season: row.get(5)?,
        time: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Repository for dataset documents
pub struct DatasetRepository {
    conn: Mutex<Connection>,
}

impl DatasetRepository {
    /// Create a new repository, initializing the database if needed
    pub fn new(db_path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(db_path).context("Failed to open database")?;

        create_tables(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Dataset database lock poisoned"))
    }

    /// Get document count
    #[cfg(test)]
    pub fn count(&self) -> Result<i64> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM datasets", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl DatasetStore for DatasetRepository {
    fn find_by_key(&self, key: &DatasetKey) -> Result<Option<DatasetDocument>> {
        let sql = format!(
            "{} WHERE country = ?1 AND tournament = ?2 AND season = ?3 AND time IS ?4 ORDER BY id LIMIT 1",
            SELECT_COLUMNS
        );
        let doc = self
            .conn()?
            .query_row(
                &sql,
                params![key.country, key.tournament, key.season, key.time],
                document_from_row,
            )
            .optional()
            .context("Failed to look up dataset by key")?;
        Ok(doc)
    }

    fn find_by_filename(&self, filename: &str) -> Result<Option<DatasetDocument>> {
        let sql = format!("{} WHERE filename = ?1 ORDER BY id LIMIT 1", SELECT_COLUMNS);
        let doc = self
            .conn()?
            .query_row(&sql, [filename], document_from_row)
            .optional()
            .context("Failed to look up dataset by filename")?;
        Ok(doc)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<DatasetDocument>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let doc = self
            .conn()?
            .query_row(&sql, [id], document_from_row)
            .optional()
            .context("Failed to look up dataset by id")?;
        Ok(doc)
    }

    fn find_all(&self) -> Result<Vec<DatasetDocument>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_COLUMNS))?;
        let docs = stmt
            .query_map([], document_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    fn insert(&self, dataset: &NewDataset<'_>) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO datasets (filename, file, country, tournament, season, time)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                dataset.filename,
                dataset.file,
                dataset.key.country,
                dataset.key.tournament,
                dataset.key.season,
                dataset.key.time,
            ],
        )
        .context("Failed to insert dataset")?;
        Ok(conn.last_insert_rowid())
    }

    fn update_file(&self, filename: &str, file: &[u8]) -> Result<usize> {
        let updated = self
            .conn()?
            .execute(
                "UPDATE datasets SET file = ?1 WHERE filename = ?2",
                params![file, filename],
            )
            .context("Failed to update dataset")?;
        Ok(updated)
    }
}
