//! Directory-backed collaborators.
//!
//! Source tables are read from `<input_dir>/<identifier>`, results are written
//! to `<output_dir>/<destination>.csv[.gz]` and backups are copied into
//! `<backup_dir>/<destination>_<stamp>.csv[.gz]`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::infra::{BACKUP_TIMESTAMP, SAVED_TIMESTAMP, backup_stamp, stamp_table, table_file_name};
use crate::output::write_table;
use crate::parser::parse_table;
use crate::services::{DataBackup, DataSaver, DataSource};

/// Reads source tables from CSV files in a directory.
pub struct LocalCsvSource {
    dir: PathBuf,
}

impl LocalCsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DataSource for LocalCsvSource {
    async fn get_data(&self, identifier: &str) -> Result<DataFrame> {
        let path = self.dir.join(identifier);
        if !tokio::fs::try_exists(&path).await? {
            debug!(path = %path.display(), "Source file does not exist");
            return Ok(DataFrame::empty());
        }

        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse_table(&bytes).with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Writes graded tables as CSV files in a directory.
pub struct LocalCsvSaver {
    dir: PathBuf,
    gzip: bool,
}

impl LocalCsvSaver {
    pub fn new(dir: impl Into<PathBuf>, gzip: bool) -> Self {
        Self {
            dir: dir.into(),
            gzip,
        }
    }

    pub fn path_for(&self, destination: &str) -> PathBuf {
        self.dir.join(table_file_name(destination, self.gzip))
    }

    async fn write(&self, mut df: DataFrame, path: &Path) -> Result<()> {
        stamp_table(&mut df, SAVED_TIMESTAMP, Utc::now())?;
        write_table(path, &mut df, self.gzip).await
    }
}

#[async_trait]
impl DataSaver for LocalCsvSaver {
    async fn save_data(&self, table: DataFrame, destination: &str) -> bool {
        let path = self.path_for(destination);
        match self.write(table, &path).await {
            Ok(()) => {
                info!(path = %path.display(), "Table saved");
                true
            }
            Err(e) => {
                error!(path = %path.display(), error = %format!("{e:#}"), "Failed to save table");
                false
            }
        }
    }
}

/// Copies the current file of a destination into a backup directory.
pub struct LocalBackup {
    output_dir: PathBuf,
    backup_dir: PathBuf,
    gzip: bool,
}

impl LocalBackup {
    /// `output_dir` and `gzip` must match the [`LocalCsvSaver`] being backed up.
    pub fn new(output_dir: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>, gzip: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            backup_dir: backup_dir.into(),
            gzip,
        }
    }
}

#[async_trait]
impl DataBackup for LocalBackup {
    async fn backup_data(&self, destination: &str) -> Result<()> {
        let current = self
            .output_dir
            .join(table_file_name(destination, self.gzip));
        if !tokio::fs::try_exists(&current).await? {
            debug!(path = %current.display(), "Nothing to back up");
            return Ok(());
        }

        let bytes = tokio::fs::read(&current)
            .await
            .with_context(|| format!("failed to read {}", current.display()))?;
        let mut df = parse_table(&bytes)
            .with_context(|| format!("failed to parse {}", current.display()))?;

        let now = Utc::now();
        stamp_table(&mut df, BACKUP_TIMESTAMP, now)?;

        let name = format!("{destination}_{}", backup_stamp(now));
        let target = self.backup_dir.join(table_file_name(&name, self.gzip));
        write_table(&target, &mut df, self.gzip).await?;

        info!(path = %target.display(), "Backup written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_missing_source_is_empty() {
        let dir = temp_dir("aaa_rater_local_missing");
        let source = LocalCsvSource::new(&dir);

        let df = source.get_data("AAA - nothing.csv").await.unwrap();
        assert_eq!(df.width(), 0);
    }

    #[tokio::test]
    async fn test_source_reads_csv() {
        let dir = temp_dir("aaa_rater_local_read");
        fs::write(dir.join("AAA - energy.csv"), "ticker,roe\nXOM,3.5\n").unwrap();

        let df = LocalCsvSource::new(&dir)
            .get_data("AAA - energy.csv")
            .await
            .unwrap();
        assert_eq!(df.column("roe").unwrap().f64().unwrap().get(0), Some(3.5));
    }

    #[tokio::test]
    async fn test_saver_adds_saved_timestamp() {
        let dir = temp_dir("aaa_rater_local_save");
        let saver = LocalCsvSaver::new(&dir, false);

        assert!(saver.save_data(sample_table(), "AAA_energy").await);

        let content = fs::read_to_string(dir.join("AAA_energy.csv")).unwrap();
        assert!(content.starts_with("ticker,roe,_saved_timestamp"));
    }

    #[tokio::test]
    async fn test_saver_reports_failure() {
        let dir = temp_dir("aaa_rater_local_save_fail");
        // a regular file where the output directory should be
        let blocked = dir.join("not_a_dir");
        fs::write(&blocked, "x").unwrap();

        let saver = LocalCsvSaver::new(&blocked, false);
        assert!(!saver.save_data(sample_table(), "AAA_energy").await);
    }

    #[tokio::test]
    async fn test_backup_without_existing_file_succeeds() {
        let dir = temp_dir("aaa_rater_local_backup_empty");
        let backup = LocalBackup::new(dir.join("out"), dir.join("backup"), false);

        backup.backup_data("AAA_energy").await.unwrap();
        assert!(!dir.join("backup").exists());
    }

    #[tokio::test]
    async fn test_backup_copies_current_file() {
        let dir = temp_dir("aaa_rater_local_backup");
        let saver = LocalCsvSaver::new(dir.join("out"), true);
        let backup = LocalBackup::new(dir.join("out"), dir.join("backup"), true);
        assert!(saver.save_data(sample_table(), "AAA_energy").await);

        backup.backup_data("AAA_energy").await.unwrap();

        let entries: Vec<_> = fs::read_dir(dir.join("backup"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("AAA_energy_"));
        assert!(entries[0].ends_with(".csv.gz"));

        let bytes = fs::read(dir.join("backup").join(&entries[0])).unwrap();
        let df = parse_table(&bytes).unwrap();
        assert!(df.column(SAVED_TIMESTAMP).is_ok());
        assert!(df.column(BACKUP_TIMESTAMP).is_ok());
    }

    fn sample_table() -> DataFrame {
        df! { "ticker" => ["XOM"], "roe" => [3.5] }.unwrap()
    }
}
