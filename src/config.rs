//! Configuration loading for canopy.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. User config (`~/.canopy/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. Searches run with sensible defaults when
//! no config exists, and unreadable or malformed config fails open to the
//! defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunables for the search core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum token length the store's full-text index will accept.
    /// Shorter tokens are matched by substring fallback instead.
    pub min_index_token_len: usize,
    /// Sponsorship search runs only when a combined taxon search returns
    /// fewer hits than this.
    pub sponsor_gate: usize,
    /// Upper bound on rows returned per collection, regardless of the
    /// requested limit.
    pub hard_result_cap: usize,
    /// Deadline store adapters must apply to each lookup. The core fails
    /// open on timeouts; this value is contract for adapters, not
    /// enforced in-process.
    pub store_timeout_ms: u64,
    /// Require best-match token containment to find query tokens at
    /// nondecreasing positions, instead of anywhere in the candidate.
    pub order_sensitive_match: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_index_token_len: 3,
            sponsor_gate: 15,
            hard_result_cap: 1000,
            store_timeout_ms: 5000,
            order_sensitive_match: false,
        }
    }
}

impl SearchConfig {
    /// Load configuration from the user config file and environment.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Load configuration from an explicit file path, then apply
    /// environment overrides. A missing or malformed file fails open to
    /// the defaults.
    pub fn load_from(path: Option<&Path>) -> Self {
        let mut config: SearchConfig = path
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|text| match toml::from_str(&text) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    tracing::warn!("ignoring malformed config: {}", err);
                    None
                }
            })
            .unwrap_or_default();
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Some(v) = env_parse("CANOPY_MIN_INDEX_TOKEN_LEN") {
            self.min_index_token_len = v;
        }
        if let Some(v) = env_parse("CANOPY_SPONSOR_GATE") {
            self.sponsor_gate = v;
        }
        if let Some(v) = env_parse("CANOPY_HARD_RESULT_CAP") {
            self.hard_result_cap = v;
        }
        if let Some(v) = env_parse("CANOPY_STORE_TIMEOUT_MS") {
            self.store_timeout_ms = v;
        }
        if let Some(v) = env_parse("CANOPY_ORDER_SENSITIVE_MATCH") {
            self.order_sensitive_match = v;
        }
    }
}

/// Parse an environment variable, ignoring unset or malformed values.
fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring malformed {}={:?}", name, raw);
            None
        }
    }
}

/// Path of the user config file, when a home directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".canopy").join("config.toml"))
}
