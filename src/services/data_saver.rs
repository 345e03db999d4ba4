use polars::prelude::DataFrame;

/// Abstraction over where graded tables are persisted.
#[async_trait::async_trait]
pub trait DataSaver: Send + Sync {
    /// Stores `table` under `destination`, replacing what was there.
    ///
    /// Returns `false` on failure; implementations log the cause themselves.
    async fn save_data(&self, table: DataFrame, destination: &str) -> bool;
}
