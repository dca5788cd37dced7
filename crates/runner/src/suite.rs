// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Baseline suites
//!
//! YAML golden files holding the expectations of one dialect:
//!
//! ```yaml
//! name: northwind-include
//! dialect: sqlserver
//! scenarios:
//!   - name: include_reference
//!     sql:
//!       - |
//!         SELECT [o].[OrderID] ...
//!   - name: first_or_default_client_side
//!     sql: []
//!   - name: where_client_eval
//!     translation_failed: true
//!     message_contains: could not be translated
//!   - name: includes_merged
//!     sql: [" "]
//! ```
//!
//! Each `sql` entry is one statement including its parameter preamble. A single
//! blank entry means "one statement, content not checked".

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, PoisonError};

use query_baseline_comparator::ExpectedStatement;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialect::Dialect;
use crate::expectation::{Expectation, ExpectedSqlProvider};
use crate::scenario::FailureKind;

/// A structural problem in a suite document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteProblem {
    pub scenario: Option<String>,
    pub message: String,
}

impl fmt::Display for SuiteProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scenario {
            Some(scenario) => write!(f, "{scenario}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

fn render_problems(problems: &[SuiteProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Baseline suite errors
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Failed to access suite file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse suite{}: {source}", .path.as_ref().map(|p| format!(" {p:?}")).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid suite '{name}':\n{}", render_problems(.problems))]
    Invalid {
        name: String,
        problems: Vec<SuiteProblem>,
    },

    #[error("Scenario '{0}' is not declared in the suite")]
    UnknownScenario(String),
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One scenario entry of a suite
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioBaseline {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Expected statements, in execution order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub translation_failed: bool,

    /// Expected failure other than a translation failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fails: Option<FailureKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_contains: Option<String>,
}

impl ScenarioBaseline {
    fn problems(&self) -> Vec<SuiteProblem> {
        let mut problems = Vec::new();
        let mut problem = |message: &str| {
            problems.push(SuiteProblem {
                scenario: Some(self.name.clone()),
                message: message.to_string(),
            })
        };

        if self.name.trim().is_empty() {
            problem("scenario name must not be empty");
        }

        let outcomes = [self.sql.is_some(), self.translation_failed, self.fails.is_some()]
            .iter()
            .filter(|set| **set)
            .count();
        match outcomes {
            0 => problem("one of `sql`, `translation_failed` or `fails` is required"),
            1 => {}
            _ => problem("`sql`, `translation_failed` and `fails` are mutually exclusive"),
        }

        if self.fails == Some(FailureKind::TranslationFailed) {
            problem("use `translation_failed: true` instead of `fails: translation_failed`");
        }

        if self.message_contains.is_some() && !self.translation_failed && self.fails.is_none() {
            problem("`message_contains` only applies to expected failures");
        }

        if let Some(sql) = &self.sql {
            let blank = sql.iter().filter(|s| s.trim().is_empty()).count();
            if blank > 0 && sql.len() > 1 {
                problem("a blank statement must be the only entry of `sql`");
            }
        }

        problems
    }

    /// The expectation this entry declares
    pub fn expectation(&self) -> Expectation {
        if self.translation_failed {
            return Expectation::TranslationFailed {
                message_contains: self.message_contains.clone(),
            };
        }
        if let Some(kind) = self.fails {
            return Expectation::Fails {
                kind,
                message_contains: self.message_contains.clone(),
            };
        }
        Expectation::Statements(
            self.sql
                .iter()
                .flatten()
                .map(|sql| ExpectedStatement::from(sql.as_str()))
                .collect(),
        )
    }
}

/// On-disk form of a baseline suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDocument {
    pub name: String,
    pub dialect: Dialect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioBaseline>,
}

impl SuiteDocument {
    /// Parse a document without validating it
    pub fn from_yaml(yaml: &str) -> Result<Self, SuiteError> {
        serde_yaml::from_str(yaml).map_err(|source| SuiteError::Parse { path: None, source })
    }

    /// Every structural problem of the document
    pub fn problems(&self) -> Vec<SuiteProblem> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(SuiteProblem {
                scenario: None,
                message: "suite name must not be empty".to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.name.as_str()) {
                problems.push(SuiteProblem {
                    scenario: Some(scenario.name.clone()),
                    message: "duplicate scenario name".to_string(),
                });
            }
            problems.extend(scenario.problems());
        }
        problems
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioBaseline> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn to_yaml(&self) -> Result<String, SuiteError> {
        serde_yaml::to_string(self).map_err(|source| SuiteError::Parse { path: None, source })
    }
}

/// Validated suite used as an expectation provider
///
/// A suite loaded from a file can be rewritten in place with captured
/// statements.
#[derive(Debug)]
pub struct BaselineSuite {
    path: Option<PathBuf>,
    document: RwLock<SuiteDocument>,
}

impl BaselineSuite {
    pub fn from_document(document: SuiteDocument) -> Result<Self, SuiteError> {
        let problems = document.problems();
        if !problems.is_empty() {
            return Err(SuiteError::Invalid {
                name: document.name,
                problems,
            });
        }
        Ok(Self {
            path: None,
            document: RwLock::new(document),
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, SuiteError> {
        Self::from_document(SuiteDocument::from_yaml(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SuiteError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| SuiteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document: SuiteDocument =
            serde_yaml::from_str(&yaml).map_err(|source| SuiteError::Parse {
                path: Some(path.to_path_buf()),
                source,
            })?;

        let mut suite = Self::from_document(document)?;
        suite.path = Some(path.to_path_buf());
        tracing::debug!(suite = %suite.name(), "Baseline suite loaded from {:?}", path);
        Ok(suite)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn name(&self) -> String {
        self.read().name.clone()
    }

    /// Snapshot of the current document
    pub fn document(&self) -> SuiteDocument {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, SuiteDocument> {
        self.document.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SuiteDocument> {
        self.document.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExpectedSqlProvider for BaselineSuite {
    fn dialect(&self) -> Dialect {
        self.read().dialect
    }

    fn expectation(&self, scenario: &str) -> Option<Expectation> {
        self.read().scenario(scenario).map(ScenarioBaseline::expectation)
    }

    fn scenario_names(&self) -> Vec<String> {
        self.read().scenarios.iter().map(|s| s.name.clone()).collect()
    }

    fn rewrite(&self, scenario: &str, statements: &[String]) -> Result<bool, SuiteError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        let yaml = {
            let mut document = self.write();
            let entry = document
                .scenarios
                .iter_mut()
                .find(|s| s.name == scenario)
                .ok_or_else(|| SuiteError::UnknownScenario(scenario.to_string()))?;
            entry.sql = Some(statements.to_vec());
            entry.translation_failed = false;
            entry.fails = None;
            entry.message_contains = None;
            document.to_yaml()?
        };

        std::fs::write(path, yaml).map_err(|source| SuiteError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::info!(scenario, "Baseline rewritten in {:?}", path);
        Ok(true)
    }
}
