//! Size ceilings and thresholds. A `Limits` value is passed explicitly to each
//! call; there is no process-wide configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default ceiling on candidate records per input file
pub const DEFAULT_MAX_RECORDS: usize = 100_000_000;

/// Element count at which deduplication and generation switch away from
/// hash-set membership
pub const DEFAULT_DEDUP_THRESHOLD: usize = 5_000_000;

/// Default ceiling on the size of each generated dataset
pub const DEFAULT_MAX_GENERATED: usize = 100_000_000;

/// The limits every call enforces independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    /// Maximum candidate records accepted from one input text
    pub max_records: usize,
    /// Element count at or above which the flat-storage strategies are used
    pub dedup_threshold: usize,
    /// Maximum size of each generated dataset
    pub max_generated: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_records: DEFAULT_MAX_RECORDS,
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
            max_generated: DEFAULT_MAX_GENERATED,
        }
    }
}

impl Limits {
    /// Parse limits from TOML text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Limits> {
        toml::from_str(text).context("Can't parse limits")
    }

    /// Read limits from the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Limits> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Can't read config file: {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file: {}", path.display()))
    }
}
