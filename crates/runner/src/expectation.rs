// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expectations
//!
//! What a scenario must do for one dialect: issue an exact list of
//! statements, issue nothing, or fail in a specific way.

use std::collections::HashMap;

use query_baseline_comparator::ExpectedStatement;

use crate::dialect::Dialect;
use crate::scenario::FailureKind;
use crate::suite::SuiteError;

/// Expected outcome of one scenario for one dialect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The run succeeds and issues exactly these statements; empty means no SQL
    Statements(Vec<ExpectedStatement>),
    /// The translator reports that the query cannot be translated
    TranslationFailed { message_contains: Option<String> },
    /// The run fails with another typed error
    Fails {
        kind: FailureKind,
        message_contains: Option<String>,
    },
}

impl Expectation {
    /// Literal statements; a blank string is an opaque entry
    pub fn sql<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ExpectedStatement>,
    {
        Expectation::Statements(statements.into_iter().map(Into::into).collect())
    }

    /// No SQL may be issued
    pub fn no_sql() -> Self {
        Expectation::Statements(Vec::new())
    }

    pub fn translation_failed(message_contains: impl Into<String>) -> Self {
        Expectation::TranslationFailed {
            message_contains: Some(message_contains.into()),
        }
    }

    pub fn fails(kind: FailureKind, message_contains: Option<String>) -> Self {
        Expectation::Fails {
            kind,
            message_contains,
        }
    }

    pub fn expects_failure(&self) -> bool {
        !matches!(self, Expectation::Statements(_))
    }
}

/// Source of per-dialect expectations
pub trait ExpectedSqlProvider: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Expectation for `scenario`, if this dialect declares one
    fn expectation(&self, scenario: &str) -> Option<Expectation>;

    /// Every scenario name with a declared expectation
    fn scenario_names(&self) -> Vec<String>;

    /// Replace the statements expected for `scenario` with what was captured
    ///
    /// Returns `Ok(false)` when the provider cannot be rewritten.
    fn rewrite(&self, scenario: &str, statements: &[String]) -> Result<bool, SuiteError> {
        let _ = (scenario, statements);
        Ok(false)
    }
}

/// Expectations declared in code
#[derive(Debug, Clone)]
pub struct InMemoryBaselines {
    dialect: Dialect,
    order: Vec<String>,
    expectations: HashMap<String, Expectation>,
}

impl InMemoryBaselines {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            order: Vec::new(),
            expectations: HashMap::new(),
        }
    }

    pub fn insert(&mut self, scenario: impl Into<String>, expectation: Expectation) -> &mut Self {
        let scenario = scenario.into();
        if !self.expectations.contains_key(&scenario) {
            self.order.push(scenario.clone());
        }
        self.expectations.insert(scenario, expectation);
        self
    }

    /// Builder-style insertion
    pub fn with(mut self, scenario: impl Into<String>, expectation: Expectation) -> Self {
        self.insert(scenario, expectation);
        self
    }
}

impl ExpectedSqlProvider for InMemoryBaselines {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn expectation(&self, scenario: &str) -> Option<Expectation> {
        self.expectations.get(scenario).cloned()
    }

    fn scenario_names(&self) -> Vec<String> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_expectation_detects_opaque_entries() {
        let expectation = Expectation::sql(["SELECT 1", " "]);
        assert_eq!(
            expectation,
            Expectation::Statements(vec![
                ExpectedStatement::Sql("SELECT 1".into()),
                ExpectedStatement::Opaque,
            ])
        );
        assert!(!expectation.expects_failure());
        assert!(Expectation::translation_failed("x").expects_failure());
    }

    #[test]
    fn test_in_memory_baselines_keep_declaration_order() {
        let baselines = InMemoryBaselines::new(Dialect::Sqlite)
            .with("second", Expectation::no_sql())
            .with("first", Expectation::no_sql())
            .with("second", Expectation::sql(["SELECT 2"]));

        assert_eq!(baselines.scenario_names(), vec!["second", "first"]);
        assert_eq!(
            baselines.expectation("second"),
            Some(Expectation::sql(["SELECT 2"]))
        );
        assert_eq!(baselines.expectation("third"), None);
        assert!(!baselines.rewrite("second", &[]).unwrap());
    }
}
