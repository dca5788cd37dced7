// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scripted scenarios
//!
//! A [`ScriptedScenario`] replays a fixed list of steps through a session,
//! standing in for the query translator. Catalogs build one per dialect from
//! SQL Server-style templates passed through [`translate`].

use async_trait::async_trait;
use query_baseline_fixture::{Command, Row, Session};
use query_baseline_runner::{Dialect, QueryError, QueryMode, Scenario};

/// Failure a scripted scenario raises instead of dispatching SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedFailure {
    Translation(String),
    InvalidOperation(String),
}

impl ScriptedFailure {
    fn to_error(&self) -> QueryError {
        match self {
            ScriptedFailure::Translation(message) => QueryError::TranslationFailed(message.clone()),
            ScriptedFailure::InvalidOperation(message) => {
                QueryError::InvalidOperation(message.clone())
            }
        }
    }
}

/// One step of a scripted scenario
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Run a query; its rows become the scenario result
    Query(Command),
    /// Run a command for its side effects
    Execute(Command),
    /// Run a query that must return exactly one row
    Single(Command),
    Fail(ScriptedFailure),
}

/// Scenario replaying a fixed list of steps
#[derive(Debug, Clone)]
pub struct ScriptedScenario {
    name: String,
    steps: Vec<Step>,
}

impl ScriptedScenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn query(mut self, command: impl Into<Command>) -> Self {
        self.steps.push(Step::Query(command.into()));
        self
    }

    pub fn execute(mut self, command: impl Into<Command>) -> Self {
        self.steps.push(Step::Execute(command.into()));
        self
    }

    pub fn single(mut self, command: impl Into<Command>) -> Self {
        self.steps.push(Step::Single(command.into()));
        self
    }

    pub fn fail_translation(mut self, message: impl Into<String>) -> Self {
        self.steps
            .push(Step::Fail(ScriptedFailure::Translation(message.into())));
        self
    }

    pub fn fail_invalid_operation(mut self, message: impl Into<String>) -> Self {
        self.steps
            .push(Step::Fail(ScriptedFailure::InvalidOperation(message.into())));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

#[async_trait]
impl Scenario for ScriptedScenario {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, session: &Session, mode: QueryMode) -> Result<Vec<Row>, QueryError> {
        let mut rows = Vec::new();

        for step in &self.steps {
            // Async runs hand control back to the runtime between dispatches
            if mode.is_async() {
                tokio::task::yield_now().await;
            }

            match step {
                Step::Query(command) => rows = session.query(command.clone()).await?,
                Step::Execute(command) => {
                    session.execute(command.clone()).await?;
                }
                Step::Single(command) => {
                    let result = session.query(command.clone()).await?;
                    match result.len() {
                        0 => {
                            return Err(QueryError::InvalidOperation(
                                "Sequence contains no elements".to_string(),
                            ));
                        }
                        1 => rows = result,
                        _ => {
                            return Err(QueryError::InvalidOperation(
                                "Sequence contains more than one element".to_string(),
                            ));
                        }
                    }
                }
                Step::Fail(failure) => return Err(failure.to_error()),
            }
        }

        Ok(rows)
    }
}

/// Render a SQL Server-style template for `dialect`
///
/// Bracketed identifiers become the dialect's quoted identifiers and `N'..'`
/// literals lose their prefix. Text inside string literals is left alone.
pub fn translate(template: &str, dialect: Dialect) -> String {
    let (open, close) = match dialect {
        Dialect::SqlServer => return template.to_string(),
        Dialect::MySQL => ('`', '`'),
        Dialect::Sqlite | Dialect::PostgreSQL => ('"', '"'),
    };

    let mut out = String::with_capacity(template.len());
    let mut in_literal = false;
    let mut prev: Option<char> = None;
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_literal = !in_literal;
                out.push(c);
            }
            'N' if !in_literal
                && chars.peek() == Some(&'\'')
                && !prev.is_some_and(|p| p.is_alphanumeric() || p == '_') => {}
            '[' if !in_literal => out.push(open),
            ']' if !in_literal => out.push(close),
            _ => out.push(c),
        }
        prev = Some(c);
    }

    out
}
