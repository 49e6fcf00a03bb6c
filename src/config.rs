//! Dashboard configuration
//!
//! Loaded from a JSON file. Search order:
//! 1. Explicit path (`--config` flag)
//! 2. `dashboard.json` in the working directory
//! 3. Built-in defaults
//!
//! All fields are optional. The `--data` flag overrides `data_path`.

use crate::data::{ColumnMapping, MissingValuePolicy};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";
pub const DEFAULT_DATA_FILE: &str = "datasets.xlsx";
pub const DEFAULT_PREVIEW_ROWS: usize = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Spreadsheet to load on every request
    pub data_path: PathBuf,

    /// Source column names of the five base fields
    pub columns: ColumnMapping,

    /// How rows with unparseable fields are handled
    pub missing_values: MissingValuePolicy,

    /// Rows shown per table slide
    pub preview_rows: usize,

    /// Initial colour theme
    pub theme: Theme,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            columns: ColumnMapping::default(),
            missing_values: MissingValuePolicy::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            theme: Theme::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit path, else `dashboard.json` in `dir`, else defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.preview_rows == 0 {
            anyhow::bail!("preview_rows must be at least 1");
        }
        Ok(())
    }
}
