use anyhow::Result;
use polars::prelude::DataFrame;

/// Abstraction over where raw metrics tables come from.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the table stored under `identifier`.
    ///
    /// Missing data is not an error: implementations return an empty table and
    /// reserve `Err` for I/O or decoding failures.
    async fn get_data(&self, identifier: &str) -> Result<DataFrame>;
}
