// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Runner error types

use query_baseline_comparator::BaselineError;
use thiserror::Error;

use crate::dialect::Dialect;
use crate::scenario::QueryError;
use crate::suite::SuiteError;

/// Result type alias for scenario runs
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors raised while running scenarios against their expectations
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The dialect declares nothing for a scenario
    #[error("No {dialect} expectation declared for scenario '{scenario}'")]
    MissingExpectation { scenario: String, dialect: Dialect },

    /// An expectation names a scenario the catalog does not know
    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    /// A failure was expected but the run succeeded
    #[error("{context}: expected {expected} but the query succeeded")]
    UnexpectedSuccess { context: String, expected: String },

    /// The run failed although statements were expected
    #[error("{context}: query failed unexpectedly: {source}")]
    UnexpectedFailure {
        context: String,
        #[source]
        source: QueryError,
    },

    /// The run failed, but not in the expected way
    #[error("{context}: expected {expected} but got: {actual}")]
    WrongFailure {
        context: String,
        expected: String,
        actual: String,
    },

    /// Captured statements differ from the baseline
    #[error("{context}: {source}")]
    Baseline {
        context: String,
        #[source]
        source: BaselineError,
    },

    /// Scenarios and expectations of a dialect do not line up
    #[error("{}", coverage_report(.dialect, .missing, .orphaned))]
    Coverage {
        dialect: Dialect,
        /// Scenarios without an expectation
        missing: Vec<String>,
        /// Expectations naming no known scenario
        orphaned: Vec<String>,
    },

    #[error(transparent)]
    Suite(#[from] SuiteError),

    /// A lifecycle hook failed
    #[error("{context}: lifecycle hook failed: {message}")]
    Lifecycle { context: String, message: String },

    /// Invalid harness configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// One or more runs of a catalog failed
    #[error("{failed} of {total} scenario run(s) failed\n\n{report}")]
    Summary {
        failed: usize,
        total: usize,
        report: String,
    },
}

fn coverage_report(dialect: &Dialect, missing: &[String], orphaned: &[String]) -> String {
    let mut report = format!("Expectations for {dialect} do not cover the scenario catalog");
    if !missing.is_empty() {
        report.push_str("\n\nMissing expectations:");
        for name in missing {
            report.push_str(&format!("\n  - {name}"));
        }
    }
    if !orphaned.is_empty() {
        report.push_str("\n\nExpectations for unknown scenarios:");
        for name in orphaned {
            report.push_str(&format!("\n  - {name}"));
        }
    }
    report
}

impl RunnerError {
    /// Replace the run description of a per-run error
    pub(crate) fn in_context(mut self, run: &str) -> Self {
        match &mut self {
            RunnerError::UnexpectedSuccess { context, .. }
            | RunnerError::UnexpectedFailure { context, .. }
            | RunnerError::WrongFailure { context, .. }
            | RunnerError::Baseline { context, .. }
            | RunnerError::Lifecycle { context, .. } => *context = run.to_string(),
            _ => {}
        }
        self
    }

    /// Whether the captured statements differed from the baseline
    pub fn is_baseline_mismatch(&self) -> bool {
        matches!(self, RunnerError::Baseline { source, .. } if source.is_mismatch())
    }
}
