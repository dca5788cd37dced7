// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Sessions
//!
//! A [`Session`] is the dispatch hook a query translator talks to. Every
//! command is recorded into the fixture's capture sink before it is sent to
//! the store, so capture order equals dispatch order. Commands sent to a
//! disposed store are rejected without being recorded.

use std::sync::Arc;

use query_baseline_capture::{CaptureSink, CapturedStatement, Parameter, ParameterValue};
use serde::{Deserialize, Serialize};

use crate::error::FixtureResult;
use crate::store::Store;

/// A SQL command with positionally bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    sql: String,
    parameters: Vec<Parameter>,
}

impl Command {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Bind the next parameter; parameters bind in declaration order
    pub fn bind(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Shorthand for binding a parameter without facets
    pub fn param(self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.bind(Parameter::new(name, value))
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn to_captured(&self) -> CapturedStatement {
        CapturedStatement::new(self.sql.clone()).with_parameters(self.parameters.iter().cloned())
    }
}

impl From<&str> for Command {
    fn from(sql: &str) -> Self {
        Command::new(sql)
    }
}

impl From<String> for Command {
    fn from(sql: String) -> Self {
        Command::new(sql)
    }
}

/// One materialized result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<String>,
    pub values: Vec<serde_json::Value>,
}

impl Row {
    /// Value of the first column with the given name
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Capturing connection to a fixture's store
#[derive(Debug, Clone)]
pub struct Session {
    store: Store,
    sink: Arc<CaptureSink>,
}

impl Session {
    pub(crate) fn new(store: Store, sink: Arc<CaptureSink>) -> Self {
        Self { store, sink }
    }

    /// Record `command`, then run it and materialize the rows
    pub async fn query(&self, command: impl Into<Command>) -> FixtureResult<Vec<Row>> {
        let command = command.into();
        self.store.ensure_open()?;
        self.sink.record(command.to_captured());
        self.store.fetch_all(&command).await
    }

    /// Record `command`, then run it and return the number of affected rows
    pub async fn execute(&self, command: impl Into<Command>) -> FixtureResult<u64> {
        let command = command.into();
        self.store.ensure_open()?;
        self.sink.record(command.to_captured());
        self.store.execute(&command).await
    }

    /// The sink this session records into
    pub fn sink(&self) -> &Arc<CaptureSink> {
        &self.sink
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
