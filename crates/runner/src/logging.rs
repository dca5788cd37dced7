// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test logging setup
//!
//! Installs a `tracing` subscriber that writes through the test harness'
//! captured output, filtered by `RUST_LOG` (default `warn`). Captured SQL is
//! logged under the `query_baseline::sql` target:
//!
//! ```text
//! RUST_LOG=query_baseline::sql=info cargo test
//! ```

use std::sync::Once;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

static INIT: Once = Once::new();

/// Install the test subscriber once per process
pub fn init() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
        if result.is_err() {
            tracing::debug!("A global tracing subscriber was already installed");
        }
    });
}
