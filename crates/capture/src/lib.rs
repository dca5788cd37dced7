// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL capture for query-baseline
//!
//! Records every statement a query translator dispatches to the backing store,
//! together with its bound parameters, so a test can compare them against
//! expected SQL afterwards.
//!
//! - [`CaptureSink`]: per-fixture ordered log with `clear`/`record`/`statements`
//! - [`CapturedStatement`], [`Parameter`]: the recorded data and its baseline rendering
//! - [`OutputHelper`]: optional human-readable side channel

pub mod output;
pub mod sink;
pub mod statement;

pub use output::{
    BufferedOutput, OutputHelper, TracingOutput, find_workspace_root, workspace_log_dir,
};
pub use sink::CaptureSink;
pub use statement::{CapturedStatement, Parameter, ParameterFacets, ParameterValue};
