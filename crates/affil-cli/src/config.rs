//! Settings file and command-line overrides.
//!
//! Precedence is flag, then settings file, then built-in default. The
//! settings file is TOML:
//!
//! ```toml
//! [harvest]
//! mailto = "curator@example.org"
//! expected_total = 13322
//! request_delay_ms = 20000
//!
//! [match]
//! score_cutoff = 20
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use affil_harvest::HarvestConfig;
use affil_match::MatchOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Settings file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILENAME: &str = "affil-recon.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub harvest: HarvestConfig,
    #[serde(rename = "match")]
    pub matching: MatchOptions,
}

impl AppConfig {
    /// Parses a settings document.
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML or mistyped keys.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parse settings")
    }
}

/// Loads settings.
///
/// An explicit path must exist. Without one, [`CONFIG_FILENAME`] in the
/// working directory is used when present and defaults otherwise.
///
/// # Errors
///
/// Fails when an explicit file is missing, or any file cannot be read or
/// parsed.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILENAME), false),
    };

    match fs::read_to_string(&path) {
        Ok(contents) => {
            let config = AppConfig::from_toml(&contents)
                .with_context(|| format!("settings file {}", path.display()))?;
            info!(path = %path.display(), "loaded settings");
            Ok(config)
        }
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("read settings file {}", path.display())),
    }
}

/// Harvest parameters given on the command line or at the menu prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestOverrides {
    pub endpoint: Option<String>,
    pub filter: Option<String>,
    pub mailto: Option<String>,
    pub rows: Option<u32>,
    pub expected_total: Option<u64>,
    pub delay_secs: Option<u64>,
    pub start_cursor: Option<String>,
}

impl HarvestOverrides {
    /// Applies every set field on top of `config`.
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(filter) = &self.filter {
            config.filter.clone_from(filter);
        }
        if let Some(mailto) = &self.mailto {
            config.mailto.clone_from(mailto);
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(expected_total) = self.expected_total {
            config.expected_total = expected_total;
        }
        if let Some(secs) = self.delay_secs {
            config.request_delay_ms = secs.saturating_mul(1000);
        }
        if let Some(cursor) = &self.start_cursor {
            config.start_cursor.clone_from(cursor);
        }
    }

    /// `config` with these overrides applied.
    #[must_use]
    pub fn resolve(&self, config: &HarvestConfig) -> HarvestConfig {
        let mut resolved = config.clone();
        self.apply(&mut resolved);
        resolved
    }
}
