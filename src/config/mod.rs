use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::table::Table;

pub const MIN_TEST_SIZE: u8 = 10;
pub const MAX_TEST_SIZE: u8 = 50;
pub const MAX_SEED: u64 = 1000;

pub const DEFAULT_TEST_SIZE: u8 = 20;
pub const DEFAULT_SEED: u64 = 42;

/// Parameters of one train/test split
/// Collected interactively, from CLI flags, or from a YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitConfig {
    /// Share of rows assigned to the test set, as an integer percentage
    #[serde(default = "default_test_size")]
    pub test_size: u8,

    /// Seed for the shuffling RNG; fixed seed means reproducible partitions
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Column whose class proportions are preserved in both outputs
    #[serde(default)]
    pub stratify: Option<String>,

    /// Also bundle both outputs into a zip archive
    #[serde(default = "default_bundle")]
    pub bundle: bool,
}

fn default_test_size() -> u8 {
    DEFAULT_TEST_SIZE
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_bundle() -> bool {
    true
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            stratify: None,
            bundle: true,
        }
    }
}

impl SplitConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: SplitConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Test share as a fraction in [0.10, 0.50]
    pub fn test_fraction(&self) -> f64 {
        f64::from(self.test_size) / 100.0
    }

    /// Range checks; column checks need a loaded table (see `validate_for`)
    pub fn validate(&self) -> Result<()> {
        if self.test_size < MIN_TEST_SIZE || self.test_size > MAX_TEST_SIZE {
            anyhow::bail!(
                "test_size must be between {} and {}, got {}",
                MIN_TEST_SIZE,
                MAX_TEST_SIZE,
                self.test_size
            );
        }
        if self.seed > MAX_SEED {
            anyhow::bail!("seed must be between 0 and {}, got {}", MAX_SEED, self.seed);
        }
        Ok(())
    }

    /// Check the stratification column against a loaded table
    pub fn validate_for(&self, table: &Table) -> Result<()> {
        self.validate()?;
        if let Some(column) = &self.stratify {
            let idx = table
                .column_index(column)
                .with_context(|| format!("Stratification column '{}' not found", column))?;
            if !table.dtype(idx).is_discrete() {
                anyhow::bail!(
                    "Stratification column '{}' has type {}; only text, int and bool columns can stratify",
                    column,
                    table.dtype(idx)
                );
            }
        }
        Ok(())
    }
}
