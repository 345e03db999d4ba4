//! Calculators that fetch, grade and persist batches of metrics tables.

mod aaa;
mod pipeline;
#[cfg(test)]
mod testing;

pub use aaa::AaaCalculator;
pub use pipeline::calculate_and_save;

use crate::services::{DataBackup, DataSaver, DataSource};

/// A batch calculator driven by an external scheduler.
#[async_trait::async_trait]
pub trait Calculator: Send + Sync {
    fn name(&self) -> &str;

    /// Runs every work item and returns one message per failed item.
    ///
    /// Never fails as a whole: an empty list means complete success.
    /// `sources` overrides the default sector list.
    async fn run_complete_calculation(
        &self,
        data_source: &dyn DataSource,
        data_saver: &dyn DataSaver,
        data_backup: &dyn DataBackup,
        sources: Option<&[String]>,
    ) -> Vec<String>;

    /// Returns `true` if the calculator can run.
    fn health_check(&self) -> bool;
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
