// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Harness configuration
//!
//! Settings shared by every scenario run. Defaults are strict: positional
//! comparison, both query modes, no rewriting.
//!
//! | Variable | Effect |
//! |---|---|
//! | `QUERY_BASELINE_REWRITE` | `1`/`true` rewrites file-backed suites on mismatch |
//! | `QUERY_BASELINE_OUTPUT_DIR` | directory receiving `new-baselines.txt` |
//! | `QUERY_BASELINE_ORDER` | `positional` or `unordered` |

use std::path::PathBuf;

use query_baseline_comparator::ComparisonOrder;

use crate::error::{RunnerError, RunnerResult};
use crate::scenario::QueryMode;

pub const ENV_REWRITE: &str = "QUERY_BASELINE_REWRITE";
pub const ENV_OUTPUT_DIR: &str = "QUERY_BASELINE_OUTPUT_DIR";
pub const ENV_ORDER: &str = "QUERY_BASELINE_ORDER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Rewrite file-backed baselines with captured statements on mismatch
    pub rewrite_baselines: bool,
    /// Where ready-to-paste baselines are appended on mismatch
    pub baseline_output_dir: Option<PathBuf>,
    pub order: ComparisonOrder,
    /// Modes every scenario runs in
    pub modes: Vec<QueryMode>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rewrite_baselines: false,
            baseline_output_dir: None,
            order: ComparisonOrder::Positional,
            modes: QueryMode::ALL.to_vec(),
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `QUERY_BASELINE_*` environment variables
    pub fn from_env() -> RunnerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RunnerResult<Self> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_REWRITE) {
            config.rewrite_baselines = parse_flag(ENV_REWRITE, &value)?;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|d| !d.trim().is_empty()) {
            config.baseline_output_dir = Some(PathBuf::from(dir));
        }
        if let Some(order) = lookup(ENV_ORDER) {
            config.order = order
                .parse()
                .map_err(|e: String| RunnerError::Config(format!("{ENV_ORDER}: {e}")))?;
        }

        Ok(config)
    }

    pub fn with_rewrite(mut self, rewrite: bool) -> Self {
        self.rewrite_baselines = rewrite;
        self
    }

    pub fn with_baseline_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_output_dir = Some(dir.into());
        self
    }

    pub fn with_order(mut self, order: ComparisonOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_modes(mut self, modes: impl IntoIterator<Item = QueryMode>) -> Self {
        self.modes = modes.into_iter().collect();
        self
    }
}

fn parse_flag(key: &str, value: &str) -> RunnerResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RunnerError::Config(format!("{key}: expected a boolean, got '{other}'"))),
    }
}
