// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scenarios
//!
//! A scenario is one logical query executed by the translator under test. The
//! scenario issues its SQL through a [`Session`], which records every statement
//! into the fixture's capture sink.
//!
//! Scenarios are shared by every dialect. A [`ScenarioCatalog`] lists them in
//! a stable order so coverage checks can tell which ones a dialect skipped.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use query_baseline_fixture::{FixtureError, Row, Session};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution mode of a scenario run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    Sync,
    Async,
}

impl QueryMode {
    pub const ALL: [QueryMode; 2] = [QueryMode::Sync, QueryMode::Async];

    pub fn is_async(&self) -> bool {
        matches!(self, QueryMode::Async)
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Sync => write!(f, "sync"),
            QueryMode::Async => write!(f, "async"),
        }
    }
}

/// Typed failure of a scenario run
#[derive(Debug, Error)]
pub enum QueryError {
    /// The translator could not turn the query into SQL
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// The query was rejected before translation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Store(#[from] FixtureError),
}

impl QueryError {
    pub fn kind(&self) -> FailureKind {
        match self {
            QueryError::TranslationFailed(_) => FailureKind::TranslationFailed,
            QueryError::InvalidOperation(_) => FailureKind::InvalidOperation,
            QueryError::Store(_) => FailureKind::Store,
        }
    }
}

/// Kind of a [`QueryError`], as named in baselines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    TranslationFailed,
    InvalidOperation,
    Store,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::TranslationFailed => write!(f, "translation_failed"),
            FailureKind::InvalidOperation => write!(f, "invalid_operation"),
            FailureKind::Store => write!(f, "store"),
        }
    }
}

/// One logical query run by the translator under test
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Stable name used to look up expectations
    fn name(&self) -> &str;

    /// Run the query through `session`, returning materialized rows
    async fn run(&self, session: &Session, mode: QueryMode) -> Result<Vec<Row>, QueryError>;
}

/// Ordered registry of shared scenarios
#[derive(Default, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Arc<dyn Scenario>>,
}

impl fmt::Debug for ScenarioCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ScenarioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario; a later scenario with the same name replaces the earlier one
    pub fn register(&mut self, scenario: impl Scenario + 'static) -> &mut Self {
        self.register_arc(Arc::new(scenario))
    }

    pub fn register_arc(&mut self, scenario: Arc<dyn Scenario>) -> &mut Self {
        if let Some(existing) = self
            .scenarios
            .iter_mut()
            .find(|s| s.name() == scenario.name())
        {
            tracing::debug!(scenario = scenario.name(), "Replacing registered scenario");
            *existing = scenario;
        } else {
            self.scenarios.push(scenario);
        }
        self
    }

    /// Builder-style registration
    pub fn with(mut self, scenario: impl Scenario + 'static) -> Self {
        self.register(scenario);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Scenario>> {
        self.scenarios.iter().find(|s| s.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Scenario>> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
