use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::SplitConfig;
use crate::io::{self, bundle_zip, write_csv, IngestError};
use crate::split::{train_test_split, SplitResult};
use crate::table::Table;

pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";
pub const BUNDLE_FILE: &str = "train_test_data.zip";

/// Where a session is in its workflow
/// `Split` is reachable repeatedly; there is no terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Loaded,
    Configured,
    Split,
}

/// One exportable file produced by a split
pub struct Artifact {
    pub name: &'static str,
    pub bytes: Vec<u8>,
}

/// Per-session context: the loaded table, the active configuration and the
/// latest split result. One instance per interactive lifetime; handlers
/// receive it explicitly and never touch global state.
#[derive(Default)]
pub struct Session {
    source: Option<PathBuf>,
    table: Option<Table>,
    config: Option<SplitConfig>,
    result: Option<SplitResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.table.is_none() {
            SessionState::Empty
        } else if self.config.is_none() {
            SessionState::Loaded
        } else if self.result.is_none() {
            SessionState::Configured
        } else {
            SessionState::Split
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn config(&self) -> Option<&SplitConfig> {
        self.config.as_ref()
    }

    pub fn result(&self) -> Option<&SplitResult> {
        self.result.as_ref()
    }

    /// Load a new table; any previous table, configuration and split result
    /// are discarded
    pub fn load(&mut self, path: &Path) -> Result<&Table, IngestError> {
        let table = io::read_table(path)?;
        self.source = Some(path.to_path_buf());
        self.config = None;
        self.result = None;
        Ok(self.table.insert(table))
    }

    /// Apply a configuration after checking it against the loaded table;
    /// clears any previous split result
    pub fn configure(&mut self, config: SplitConfig) -> Result<()> {
        let table = self.table.as_ref().context("no dataset loaded")?;
        config.validate_for(table)?;
        self.config = Some(config);
        self.result = None;
        Ok(())
    }

    /// Trigger the split. On failure no partial state is retained: the
    /// session falls back to `Configured` and the caller simply retriggers.
    pub fn split(&mut self) -> Result<&SplitResult> {
        self.result = None;
        let table = self.table.as_ref().context("no dataset loaded")?;
        let config = self.config.as_ref().context("no split configuration set")?;
        let result = train_test_split(table, config)?;
        Ok(self.result.insert(result))
    }

    /// Serialize the current result's artifacts: `train.csv`, `test.csv` and,
    /// when the configuration asks for it, the zip bundle of both
    pub fn artifacts(&self) -> Result<Vec<Artifact>> {
        let result = self
            .result
            .as_ref()
            .context("no split has been performed")?;

        let train = write_csv(&result.train)?;
        let test = write_csv(&result.test)?;

        let bundle = if self.config.as_ref().map_or(true, |c| c.bundle) {
            Some(bundle_zip(&[
                (TRAIN_FILE, train.as_slice()),
                (TEST_FILE, test.as_slice()),
            ])?)
        } else {
            None
        };

        let mut artifacts = vec![
            Artifact {
                name: TRAIN_FILE,
                bytes: train,
            },
            Artifact {
                name: TEST_FILE,
                bytes: test,
            },
        ];
        if let Some(bytes) = bundle {
            artifacts.push(Artifact {
                name: BUNDLE_FILE,
                bytes,
            });
        }
        Ok(artifacts)
    }
}
