use anyhow::{Context, Result};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

use crate::calculator::panic_message;
use crate::scoring::ScoringEngine;
use crate::services::{DataBackup, DataSaver, DataSource};

/// Fetches `source`, grades it, backs up `destination` and saves the result.
///
/// Returns `true` only if the graded table was saved. Every failure, including
/// a panic in a collaborator, is logged and reported as `false`.
#[tracing::instrument(skip_all, fields(source = %source, destination = %destination))]
pub async fn calculate_and_save(
    engine: &ScoringEngine,
    data_source: &dyn DataSource,
    data_saver: &dyn DataSaver,
    data_backup: &dyn DataBackup,
    source: &str,
    destination: &str,
) -> bool {
    let run = run_pipeline(
        engine,
        data_source,
        data_saver,
        data_backup,
        source,
        destination,
    );

    match AssertUnwindSafe(run).catch_unwind().await {
        Ok(Ok(saved)) => saved,
        Ok(Err(e)) => {
            error!(error = %format!("{e:#}"), "AAA calculation failed");
            false
        }
        Err(panic) => {
            error!(panic = %panic_message(&*panic), "AAA calculation panicked");
            false
        }
    }
}

async fn run_pipeline(
    engine: &ScoringEngine,
    data_source: &dyn DataSource,
    data_saver: &dyn DataSaver,
    data_backup: &dyn DataBackup,
    source: &str,
    destination: &str,
) -> Result<bool> {
    info!("Starting AAA calculation");

    let raw = data_source
        .get_data(source)
        .await
        .with_context(|| format!("failed to fetch '{source}'"))?;
    if raw.height() == 0 || raw.width() == 0 {
        error!("No data found");
        return Ok(false);
    }

    let graded = engine
        .grade_table(raw)
        .with_context(|| format!("failed to grade '{source}'"))?;

    info!("Creating backup");
    if let Err(e) = data_backup.backup_data(destination).await {
        warn!(error = %format!("{e:#}"), "Backup failed, saving anyway");
    }

    info!("Saving AAA results");
    if data_saver.save_data(graded, destination).await {
        info!("AAA calculation completed successfully");
        Ok(true)
    } else {
        error!("Failed to save AAA results");
        Ok(false)
    }
}
