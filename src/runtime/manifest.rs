use std::path::Path;

use serde::Serialize;

use crate::config::SplitConfig;
use crate::split::{ClassBalance, SplitSummary};
use crate::table::Table;

/// Record of one completed split, written next to the artifacts
#[derive(Debug, Clone, Serialize)]
pub struct SplitManifest {
    pub source: String,
    pub total_rows: usize,
    pub total_columns: usize,
    pub config: SplitConfig,
    pub train_rows: usize,
    pub test_rows: usize,
    pub class_balance: Vec<ClassBalance>,
    pub artifacts: Vec<String>,
}

impl SplitManifest {
    pub fn new(
        source: Option<&Path>,
        table: &Table,
        summary: &SplitSummary,
        config: &SplitConfig,
        artifacts: Vec<String>,
    ) -> Self {
        Self {
            source: source.map(|p| p.display().to_string()).unwrap_or_default(),
            total_rows: summary.total_rows,
            total_columns: table.num_columns(),
            config: config.clone(),
            train_rows: summary.train_rows,
            test_rows: summary.test_rows,
            class_balance: summary.classes.clone(),
            artifacts,
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
