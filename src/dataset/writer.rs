//! Dataset persistence: CSV rendering, staging and upsert by filename.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use super::staging::StagingArea;
use super::table::Table;
use super::DatasetKey;
use crate::storage::{DatasetStore, NewDataset};

/// What the upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum WriteOutcome {
    Inserted { id: i64 },
    Updated { id: i64 },
}

/// Writes dataset snapshots into a [`DatasetStore`]
pub struct DatasetWriter<'a> {
    store: &'a dyn DatasetStore,
    staging: &'a StagingArea,
}

impl<'a> DatasetWriter<'a> {
    pub fn new(store: &'a dyn DatasetStore, staging: &'a StagingArea) -> Self {
        Self { store, staging }
    }

    /// Render `table` and upsert it under the key's filename
    ///
    /// A new filename inserts a full document. An existing one only has its
    /// blob replaced; the stored country/tournament/season/time stay as first
    /// written.
    pub fn write(&self, key: &DatasetKey, table: &Table) -> Result<WriteOutcome> {
        key.validate()?;
        let filename = key.filename();
        let csv = table.to_csv()?;

        let staged = self.staging.stage(&filename, &csv)?;
        let file = staged.read()?;
        debug!("Staged {} ({} bytes)", staged.path().display(), file.len());

        let existing = self
            .store
            .find_by_filename(&filename)
            .with_context(|| format!("Failed to look up {}", filename))?;

        let outcome = match existing {
            None => {
                let id = self.store.insert(&NewDataset {
                    filename: filename.clone(),
                    file: &file,
                    key,
                })?;
                WriteOutcome::Inserted { id }
            }
            Some(doc) => {
                self.store.update_file(&filename, &file)?;
                WriteOutcome::Updated { id: doc.id }
            }
        };

        info!(
            "Stored {} ({} rows): {:?}",
            filename,
            table.rows.len(),
            outcome
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::schema::FIXTURE_COLUMNS;
    use crate::storage::{DatasetDocument, DatasetRepository};

    fn table(rows: usize) -> Table {
        let rows = (0..rows)
            .map(|i| {
                let mut row = vec!["-".to_string(); FIXTURE_COLUMNS.len()];
                row[5] = format!("Team {}", i);
                row
            })
            .collect();
        Table::new(&FIXTURE_COLUMNS, rows)
    }

    struct UnavailableStore;

    impl DatasetStore for UnavailableStore {
        fn find_by_key(&self, _: &DatasetKey) -> Result<Option<DatasetDocument>> {
            anyhow::bail!("store unavailable")
        }
        fn find_by_filename(&self, _: &str) -> Result<Option<DatasetDocument>> {
            anyhow::bail!("store unavailable")
        }
        fn find_by_id(&self, _: i64) -> Result<Option<DatasetDocument>> {
            anyhow::bail!("store unavailable")
        }
        fn find_all(&self) -> Result<Vec<DatasetDocument>> {
            anyhow::bail!("store unavailable")
        }
        fn insert(&self, _: &NewDataset<'_>) -> Result<i64> {
            anyhow::bail!("store unavailable")
        }
        fn update_file(&self, _: &str, _: &[u8]) -> Result<usize> {
            anyhow::bail!("store unavailable")
        }
    }

    #[test]
    fn test_insert_then_update() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let repo = DatasetRepository::in_memory().unwrap();
        let writer = DatasetWriter::new(&repo, &staging);
        let key = DatasetKey::fixtures("brazil", "serie-a", "2023");

        let first = writer.write(&key, &table(2)).unwrap();
        assert!(matches!(first, WriteOutcome::Inserted { .. }));

        let second = writer.write(&key, &table(3)).unwrap();
        assert!(matches!(second, WriteOutcome::Updated { .. }));
        assert_eq!(repo.count().unwrap(), 1);

        let doc = repo.find_by_filename("serie-a-2023-.csv").unwrap().unwrap();
        let stored = Table::from_csv(&doc.file).unwrap();
        assert_eq!(stored.rows.len(), 3);
    }

    #[test]
    fn test_update_does_not_reapply_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let repo = DatasetRepository::in_memory().unwrap();
        let writer = DatasetWriter::new(&repo, &staging);

        writer
            .write(&DatasetKey::matches("brazil", "serie-a", "2023", "0"), &table(1))
            .unwrap();
        // Same filename, different country
        writer
            .write(&DatasetKey::matches("portugal", "serie-a", "2023", "0"), &table(2))
            .unwrap();

        let doc = repo.find_by_filename("serie-a-2023-0.csv").unwrap().unwrap();
        assert_eq!(doc.country, "brazil");
        assert_eq!(Table::from_csv(&doc.file).unwrap().rows.len(), 2);
    }

    #[test]
    fn test_staged_file_removed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());
        let repo = DatasetRepository::in_memory().unwrap();

        DatasetWriter::new(&repo, &staging)
            .write(&DatasetKey::fixtures("brazil", "serie-a", "2023"), &table(1))
            .unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_traversing_key_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(root.path().join("data").join("tmp"));
        let victim = root.path().join("victim-2023-.csv");
        std::fs::write(&victim, b"keep me").unwrap();
        let repo = DatasetRepository::in_memory().unwrap();

        let result = DatasetWriter::new(&repo, &staging)
            .write(&DatasetKey::fixtures("x", "../../victim", "2023"), &table(1));

        assert!(result.is_err());
        assert_eq!(std::fs::read(&victim).unwrap(), b"keep me");
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_store_failure_propagates_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let result = DatasetWriter::new(&UnavailableStore, &staging)
            .write(&DatasetKey::fixtures("brazil", "serie-a", "2023"), &table(1));

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
