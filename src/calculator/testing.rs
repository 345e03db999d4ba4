//! In-memory collaborators for calculator tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use polars::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::scoring::category::Category;
use crate::services::{DataBackup, DataSaver, DataSource};

/// Serves fixed tables; unknown identifiers yield an empty table.
#[derive(Default)]
pub(crate) struct MemorySource {
    pub tables: HashMap<String, DataFrame>,
    pub failing: Vec<String>,
    pub panicking: Vec<String>,
}

impl MemorySource {
    pub fn with(mut self, identifier: &str, table: DataFrame) -> Self {
        self.tables.insert(identifier.to_string(), table);
        self
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn get_data(&self, identifier: &str) -> Result<DataFrame> {
        if self.panicking.iter().any(|i| i == identifier) {
            panic!("source exploded for {identifier}");
        }
        if self.failing.iter().any(|i| i == identifier) {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.tables.get(identifier).cloned().unwrap_or_default())
    }
}

/// Records saved tables; returns `succeed` from every save.
pub(crate) struct MemorySaver {
    pub succeed: bool,
    pub saved: Mutex<HashMap<String, DataFrame>>,
}

impl MemorySaver {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            saved: Mutex::new(HashMap::new()),
        }
    }

    pub fn saved(&self, destination: &str) -> Option<DataFrame> {
        self.saved.lock().unwrap().get(destination).cloned()
    }

    pub fn count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl DataSaver for MemorySaver {
    async fn save_data(&self, table: DataFrame, destination: &str) -> bool {
        if self.succeed {
            self.saved
                .lock()
                .unwrap()
                .insert(destination.to_string(), table);
        }
        self.succeed
    }
}

/// Records backed-up destinations; fails every backup unless `succeed`.
pub(crate) struct MemoryBackup {
    pub succeed: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MemoryBackup {
    pub fn new(succeed: bool) -> Self {
        Self {
            succeed,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataBackup for MemoryBackup {
    async fn backup_data(&self, destination: &str) -> Result<()> {
        self.calls.lock().unwrap().push(destination.to_string());
        if self.succeed {
            Ok(())
        } else {
            Err(anyhow!("disk full"))
        }
    }
}

/// A table with three tickers and every metric the engine needs.
pub(crate) fn metrics_table() -> DataFrame {
    let mut columns = vec![Column::new("ticker".into(), ["AAPL", "MSFT", "NVDA"])];
    for category in Category::ALL {
        for (i, metric) in category.metrics().iter().enumerate() {
            let base = i as f64;
            columns.push(Column::new((*metric).into(), [Some(base), Some(base + 1.5), None]));
        }
    }
    DataFrame::new(columns).unwrap()
}
