//! Collaborator traits consumed by the calculators.
//!
//! [`DataSource`] yields a raw metrics table for an identifier,
//! [`DataSaver`] persists a graded table, and [`DataBackup`] snapshots a
//! destination before it is overwritten.

mod data_backup;
mod data_saver;
mod data_source;

pub use data_backup::DataBackup;
pub use data_saver::DataSaver;
pub use data_source::DataSource;
