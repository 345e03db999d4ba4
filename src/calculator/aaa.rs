use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{error, info};

use crate::calculator::pipeline::calculate_and_save;
use crate::calculator::{Calculator, panic_message};
use crate::scoring::ScoringEngine;
use crate::services::{DataBackup, DataSaver, DataSource};
use crate::universe::{self, FA_SECTORS, INDEXES};

/// Rates every sector, every market-cap index and the whole universe.
///
/// Items are processed one at a time: sectors, then indexes, then `all`.
#[derive(Debug, Clone)]
pub struct AaaCalculator {
    name: String,
    engine: ScoringEngine,
}

impl AaaCalculator {
    pub const NAME: &'static str = "AAACalculator";

    pub fn new(engine: ScoringEngine) -> Self {
        Self {
            name: Self::NAME.to_string(),
            engine,
        }
    }

    async fn calculate_for_sectors(
        &self,
        data_source: &dyn DataSource,
        data_saver: &dyn DataSaver,
        data_backup: &dyn DataBackup,
        sectors: Option<&[String]>,
    ) -> Vec<String> {
        let sectors: Vec<String> = match sectors {
            Some(sectors) => sectors.to_vec(),
            None => FA_SECTORS.iter().map(|s| s.to_string()).collect(),
        };

        let mut errors = Vec::new();
        for sector in &sectors {
            let ok = calculate_and_save(
                &self.engine,
                data_source,
                data_saver,
                data_backup,
                &universe::source_name(sector),
                &universe::destination_name(sector),
            )
            .await;

            if ok {
                info!(
                    calculator = %self.name,
                    sector = %sector,
                    completed_at = %Utc::now().to_rfc3339(),
                    "AAA calculation for sector completed"
                );
            } else {
                errors.push(format!("Sector {sector}"));
            }
        }
        errors
    }

    async fn calculate_for_indexes(
        &self,
        data_source: &dyn DataSource,
        data_saver: &dyn DataSaver,
        data_backup: &dyn DataBackup,
    ) -> Vec<String> {
        let mut errors = Vec::new();
        for index in INDEXES {
            let ok = calculate_and_save(
                &self.engine,
                data_source,
                data_saver,
                data_backup,
                &universe::source_name(index),
                &universe::destination_name(index),
            )
            .await;

            if ok {
                info!(
                    calculator = %self.name,
                    index,
                    completed_at = %Utc::now().to_rfc3339(),
                    "AAA calculation for index completed"
                );
            } else {
                errors.push(format!("Index {index}"));
            }
        }
        errors
    }

    async fn calculate_for_all(
        &self,
        data_source: &dyn DataSource,
        data_saver: &dyn DataSaver,
        data_backup: &dyn DataBackup,
    ) -> bool {
        let ok = calculate_and_save(
            &self.engine,
            data_source,
            data_saver,
            data_backup,
            &universe::source_name(universe::ALL),
            &universe::destination_name(universe::ALL),
        )
        .await;

        if ok {
            info!(
                calculator = %self.name,
                completed_at = %Utc::now().to_rfc3339(),
                "AAA calculation for all data completed"
            );
        }
        ok
    }

    /// Runs the three phases, pushing failures into `errors` as they happen so
    /// that a panic part-way keeps what was already collected.
    async fn run_phases(
        &self,
        data_source: &dyn DataSource,
        data_saver: &dyn DataSaver,
        data_backup: &dyn DataBackup,
        sources: Option<&[String]>,
        errors: &mut Vec<String>,
    ) {
        let sector_errors = self
            .calculate_for_sectors(data_source, data_saver, data_backup, sources)
            .await;
        errors.extend(sector_errors.into_iter().map(|e| format!("Sector error: {e}")));

        let index_errors = self
            .calculate_for_indexes(data_source, data_saver, data_backup)
            .await;
        errors.extend(index_errors.into_iter().map(|e| format!("Index error: {e}")));

        if !self
            .calculate_for_all(data_source, data_saver, data_backup)
            .await
        {
            errors.push("All data calculation failed".to_string());
        }
    }
}

impl Default for AaaCalculator {
    fn default() -> Self {
        Self::new(ScoringEngine::default())
    }
}

#[async_trait]
impl Calculator for AaaCalculator {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip_all, fields(calculator = %self.name))]
    async fn run_complete_calculation(
        &self,
        data_source: &dyn DataSource,
        data_saver: &dyn DataSaver,
        data_backup: &dyn DataBackup,
        sources: Option<&[String]>,
    ) -> Vec<String> {
        info!("Starting complete AAA calculation");

        let mut errors = Vec::new();
        let run = self.run_phases(data_source, data_saver, data_backup, sources, &mut errors);
        if let Err(panic) = AssertUnwindSafe(run).catch_unwind().await {
            let message = format!(
                "Complete AAA calculation failed: {}",
                panic_message(&*panic)
            );
            error!(error = %message, "AAA calculation aborted");
            errors.push(message);
        }

        if errors.is_empty() {
            info!("AAA calculation completed successfully");
        } else {
            error!(errors = errors.len(), "AAA calculation completed with errors");
        }
        errors
    }

    fn health_check(&self) -> bool {
        match self.engine.self_test() {
            Ok(()) => true,
            Err(e) => {
                error!(calculator = %self.name, error = %format!("{e:#}"), "Health check failed");
                false
            }
        }
    }
}
