//! Harvest parameters.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};

/// Default Crossref works endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.crossref.org/works";

/// Default filter: journal articles carrying at least one ROR ID.
pub const DEFAULT_FILTER: &str = "type:journal-article,has-ror-id:true";

/// Largest page size the works API accepts.
pub const MAX_ROWS: u32 = 1000;

/// Sentinel cursor that starts a deep-paging session.
pub const INITIAL_CURSOR: &str = "*";

/// Parameters for one harvest run.
///
/// Deserializable from the `[harvest]` table of a TOML config file; missing
/// keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Works endpoint URL.
    pub endpoint: String,
    /// Crossref filter expression, e.g. `type:journal-article,has-ror-id:true`.
    pub filter: String,
    /// Contact identifier sent as `mailto` (polite pool).
    pub mailto: String,
    /// Page size, `1..=1000`.
    pub rows: u32,
    /// Advisory upper bound on results; only used to plan the page count.
    pub expected_total: u64,
    /// Fixed pause after every successful page and before every retry.
    /// Must be positive.
    pub request_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Consecutive transient failures tolerated before the harvest gives up.
    pub max_consecutive_failures: u32,
    /// Cursor to start from. `*` starts a fresh session.
    pub start_cursor: String,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            filter: DEFAULT_FILTER.to_string(),
            mailto: String::new(),
            rows: MAX_ROWS,
            expected_total: 0,
            request_delay_ms: 20_000,
            timeout_secs: 10,
            max_consecutive_failures: 5,
            start_cursor: INITIAL_CURSOR.to_string(),
        }
    }
}

impl HarvestConfig {
    #[must_use]
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Number of pages to request: `ceil(expected_total / rows)`.
    #[must_use]
    pub fn planned_pages(&self) -> u64 {
        if self.rows == 0 {
            return 0;
        }
        self.expected_total.div_ceil(u64::from(self.rows))
    }

    /// Checks the parameters that would make a harvest meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(HarvestError::InvalidConfig(
                "endpoint must not be empty".to_string(),
            ));
        }
        if self.mailto.trim().is_empty() {
            return Err(HarvestError::InvalidConfig(
                "a contact identifier (mailto) is required".to_string(),
            ));
        }
        if self.rows == 0 || self.rows > MAX_ROWS {
            return Err(HarvestError::InvalidConfig(format!(
                "rows must be between 1 and {MAX_ROWS}, got {}",
                self.rows
            )));
        }
        if self.request_delay_ms == 0 {
            return Err(HarvestError::InvalidConfig(
                "request_delay_ms must be positive".to_string(),
            ));
        }
        if self.expected_total == 0 {
            return Err(HarvestError::InvalidConfig(
                "expected_total must be positive".to_string(),
            ));
        }
        if self.start_cursor.trim().is_empty() {
            return Err(HarvestError::InvalidConfig(
                "start_cursor must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
