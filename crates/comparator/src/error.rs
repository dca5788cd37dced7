// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for baseline comparison

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for baseline comparison
pub type BaselineResult<T> = Result<T, BaselineError>;

/// One diverging position between captured and expected SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Position of the statement in execution order
    pub position: usize,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statement {} differs:", self.position)?;
        writeln!(f, "--- expected ---\n{}", self.expected)?;
        writeln!(f, "--- actual ---\n{}", self.actual)?;
        write!(
            f,
            "{}",
            similar_asserts::SimpleDiff::from_str(&self.expected, &self.actual, "expected", "actual")
        )
    }
}

/// Errors raised by the baseline comparator
#[derive(Debug, Error)]
pub enum BaselineError {
    /// A different number of statements was captured than expected
    #[error("{report}")]
    CountMismatch {
        expected: usize,
        actual: usize,
        report: String,
    },

    /// At least one statement differs from its baseline
    #[error("{report}")]
    ContentMismatch {
        mismatches: Vec<Mismatch>,
        report: String,
    },

    /// A statement expected to exist without content checks was empty
    #[error("Statement {position} was captured empty; an opaque baseline requires non-empty SQL")]
    OpaqueStatementEmpty { position: usize },

    /// Writing a new baseline file failed
    #[error("Failed to write new baseline to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BaselineError {
    /// Whether this error reports a difference between captured and expected SQL
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            BaselineError::CountMismatch { .. }
                | BaselineError::ContentMismatch { .. }
                | BaselineError::OpaqueStatementEmpty { .. }
        )
    }
}
