//! Local staging of dataset blobs.
//!
//! Blobs pass through a file in the staging directory on their way in and out
//! of the store. Every staged file gets a fresh generated name, so concurrent
//! runs on the same dataset never share a path and the dataset filename never
//! becomes a filesystem path. A [`StagedFile`] removes its file when dropped,
//! on both the success and the error path.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Directory holding staged files
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `bytes` for dataset `filename` to a new file in the staging dir
    pub fn stage(&self, filename: &str, bytes: &[u8]) -> Result<StagedFile> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create staging dir {}", self.dir.display()))?;

        let mut file = tempfile::Builder::new()
            .prefix("dataset-")
            .suffix(".csv")
            .tempfile_in(&self.dir)
            .with_context(|| format!("Failed to create staging file for {}", filename))?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to stage {}", filename))?;

        debug!("Staged {} at {}", filename, file.path().display());
        Ok(StagedFile { file })
    }
}

/// A staged file, removed on drop
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(self.path())
            .with_context(|| format!("Failed to read staged {}", self.path().display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path().join("tmp"));

        let path = {
            let staged = staging.stage("serie-a-2023-0.csv", b"Match_ID\nabc\n").unwrap();
            assert_eq!(staged.read().unwrap(), b"Match_ID\nabc\n");
            staged.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[test]
    fn test_cleanup_on_error_path() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let result = (|| -> Result<()> {
            let _staged = staging.stage("x.csv", b"data")?;
            anyhow::bail!("store unavailable")
        })();

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_same_dataset_staged_twice_gets_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::new(dir.path());

        let first = staging.stage("serie-a-2023-0.csv", b"first").unwrap();
        let second = staging.stage("serie-a-2023-0.csv", b"second").unwrap();
        assert_ne!(first.path(), second.path());

        drop(first);
        assert_eq!(second.read().unwrap(), b"second");
    }

    #[test]
    fn test_filename_never_leaves_staging_dir() {
        let root = tempfile::tempdir().unwrap();
        let staging_dir = root.path().join("data").join("tmp");
        let victim = root.path().join("victim-2023-.csv");
        std::fs::write(&victim, b"keep me").unwrap();

        let staging = StagingArea::new(&staging_dir);
        {
            let staged = staging.stage("../../victim-2023-.csv", b"overwritten").unwrap();
            assert!(staged.path().starts_with(&staging_dir));
        }

        assert_eq!(std::fs::read(&victim).unwrap(), b"keep me");
    }
}
