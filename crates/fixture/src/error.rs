// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Fixture error types

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Provisioning phase a dataset statement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProvisionStep {
    Schema,
    Seed,
    Functions,
    Teardown,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionStep::Schema => write!(f, "schema"),
            ProvisionStep::Seed => write!(f, "seed"),
            ProvisionStep::Functions => write!(f, "functions"),
            ProvisionStep::Teardown => write!(f, "teardown"),
        }
    }
}

/// Errors raised by fixtures, stores and sessions
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The store could not be reached
    #[error("Failed to connect to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    /// A dataset statement failed while provisioning; the fixture is unusable
    #[error("Provisioning dataset '{dataset}' failed during {step} at statement:\n{statement}\n{source}")]
    Provisioning {
        dataset: String,
        step: ProvisionStep,
        statement: String,
        #[source]
        source: sqlx::Error,
    },

    /// A shared fixture failed to provision earlier; the failure is cached
    #[error("Shared fixture '{dataset}' is unavailable: {source}")]
    SharedProvisioning {
        dataset: String,
        #[source]
        source: Arc<FixtureError>,
    },

    /// A statement dispatched through a session failed in the store
    #[error("Query failed: {source}\n{sql}")]
    Query {
        sql: String,
        #[source]
        source: sqlx::Error,
    },

    /// A dataset manifest is malformed
    #[error("Invalid dataset manifest {path:?}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// A manifest or script file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fixture was disposed; its store no longer accepts statements
    #[error("Fixture '{dataset}' has been disposed")]
    Disposed { dataset: String },
}
