// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for query-baseline
//!
//! This crate provides the shared test data of the harness:
//! - Seed datasets (Northwind subset, UDF catalog, many-to-many, owned entities)
//! - Scripted scenarios standing in for the query translator
//! - Per-dialect scenario catalogs and their YAML baseline suites

pub mod datasets;
pub mod functions;
pub mod many_to_many;
pub mod northwind;
pub mod owned;
pub mod scripted;
pub mod temporal;

use std::path::PathBuf;

use query_baseline_runner::Dialect;

// Re-exports for convenience
pub use datasets::Datasets;
pub use functions::udf_catalog;
pub use many_to_many::many_to_many_catalog;
pub use northwind::northwind_catalog;
pub use owned::owned_catalog;
pub use scripted::{ScriptedFailure, ScriptedScenario, Step, translate};
pub use temporal::temporal_catalog;

/// Directory holding the checked-in baseline suites
pub fn baseline_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("baselines")
}

/// Path of the baseline suite `suite` for `dialect`, e.g. `baselines/sqlite/northwind.yaml`
pub fn baseline_path(dialect: Dialect, suite: &str) -> PathBuf {
    baseline_dir()
        .join(dialect.to_string())
        .join(format!("{suite}.yaml"))
}
