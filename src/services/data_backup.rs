use anyhow::Result;

/// Snapshots a destination before it is overwritten.
#[async_trait::async_trait]
pub trait DataBackup: Send + Sync {
    /// Backs up whatever is currently stored under `destination`.
    ///
    /// A destination with nothing stored yet backs up successfully. The error
    /// message is reported to the caller, which treats it as non-fatal.
    async fn backup_data(&self, destination: &str) -> Result<()>;
}
