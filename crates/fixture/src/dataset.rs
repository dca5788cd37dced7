// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Datasets
//!
//! A dataset is the deterministic content a fixture provisions: schema DDL,
//! seed DML, function/view DDL and optional teardown statements.
//!
//! Datasets are built in code or loaded from a YAML manifest:
//!
//! ```yaml
//! name: northwind
//! schema: [schema.sql]
//! seed: [seed.sql]
//! functions: [functions.sql]
//! teardown: [teardown.sql]
//! ```
//!
//! Paths are relative to the manifest. Scripts are split into statements on
//! `;` outside quotes, brackets and comments. A line holding only `GO` also
//! ends a statement.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FixtureError, FixtureResult, ProvisionStep};

/// Named, deterministic store content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    schema: Vec<String>,
    seed: Vec<String>,
    functions: Vec<String>,
    teardown: Vec<String>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append the statements of a schema script
    pub fn with_schema(mut self, script: &str) -> Self {
        self.schema.extend(split_statements(script));
        self
    }

    /// Append the statements of a seed script
    pub fn with_seed(mut self, script: &str) -> Self {
        self.seed.extend(split_statements(script));
        self
    }

    /// Append the statements of a function, procedure or view script
    pub fn with_functions(mut self, script: &str) -> Self {
        self.functions.extend(split_statements(script));
        self
    }

    /// Append the statements run by `Fixture::dispose`
    pub fn with_teardown(mut self, script: &str) -> Self {
        self.teardown.extend(split_statements(script));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Statements of one provisioning step, in execution order
    pub fn statements(&self, step: ProvisionStep) -> &[String] {
        match step {
            ProvisionStep::Schema => &self.schema,
            ProvisionStep::Seed => &self.seed,
            ProvisionStep::Functions => &self.functions,
            ProvisionStep::Teardown => &self.teardown,
        }
    }

    /// Total number of provisioning statements, teardown excluded
    pub fn provisioning_len(&self) -> usize {
        self.schema.len() + self.seed.len() + self.functions.len()
    }

    /// Load a dataset from a YAML manifest
    pub fn from_manifest(path: impl AsRef<Path>) -> FixtureResult<Self> {
        let path = path.as_ref();
        let content = read_file(path)?;
        let manifest: DatasetManifest =
            serde_yaml::from_str(&content).map_err(|e| FixtureError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if manifest.name.trim().is_empty() {
            return Err(FixtureError::Manifest {
                path: path.to_path_buf(),
                message: "dataset name must not be empty".to_string(),
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut dataset = Dataset::new(manifest.name);
        for file in &manifest.schema {
            dataset = dataset.with_schema(&read_file(&base.join(file))?);
        }
        for file in &manifest.seed {
            dataset = dataset.with_seed(&read_file(&base.join(file))?);
        }
        for file in &manifest.functions {
            dataset = dataset.with_functions(&read_file(&base.join(file))?);
        }
        for file in &manifest.teardown {
            dataset = dataset.with_teardown(&read_file(&base.join(file))?);
        }

        tracing::debug!(
            dataset = dataset.name(),
            statements = dataset.provisioning_len(),
            "Dataset manifest loaded from {:?}",
            path
        );
        Ok(dataset)
    }
}

/// On-disk form of a dataset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub name: String,
    #[serde(default)]
    pub schema: Vec<PathBuf>,
    #[serde(default)]
    pub seed: Vec<PathBuf>,
    #[serde(default)]
    pub functions: Vec<PathBuf>,
    #[serde(default)]
    pub teardown: Vec<PathBuf>,
}

fn read_file(path: &Path) -> FixtureResult<String> {
    std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    SingleQuote,
    DoubleQuote,
    Bracket,
    LineComment,
    BlockComment,
}

/// Split a SQL script into individual statements
///
/// Comments are dropped, empty statements are skipped and each statement is
/// trimmed. Statement bodies containing `;` (e.g. trigger bodies) are not
/// supported.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    for batch in split_batches(script) {
        split_batch(&batch, &mut statements);
    }
    statements
}

/// Split on `GO` separator lines
fn split_batches(script: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();
    for line in script.lines() {
        if line.trim().eq_ignore_ascii_case("go") {
            batches.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    batches.push(current);
    batches
}

fn split_batch(batch: &str, out: &mut Vec<String>) {
    let mut state = ScanState::Code;
    let mut current = String::new();
    let mut chars = batch.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            ScanState::Code => match c {
                ';' => push_statement(&mut current, out),
                '\'' => {
                    state = ScanState::SingleQuote;
                    current.push(c);
                }
                '"' => {
                    state = ScanState::DoubleQuote;
                    current.push(c);
                }
                '[' => {
                    state = ScanState::Bracket;
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = ScanState::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = ScanState::BlockComment;
                }
                _ => current.push(c),
            },
            ScanState::SingleQuote => {
                current.push(c);
                if c == '\'' {
                    // '' is an escaped quote inside a literal
                    if chars.peek() == Some(&'\'') {
                        current.push('\'');
                        chars.next();
                    } else {
                        state = ScanState::Code;
                    }
                }
            }
            ScanState::DoubleQuote => {
                current.push(c);
                if c == '"' {
                    state = ScanState::Code;
                }
            }
            ScanState::Bracket => {
                current.push(c);
                if c == ']' {
                    state = ScanState::Code;
                }
            }
            ScanState::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = ScanState::Code;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push(' ');
                    state = ScanState::Code;
                }
            }
        }
    }

    push_statement(&mut current, out);
}

fn push_statement(current: &mut String, out: &mut Vec<String>) {
    let statement = current.trim();
    if !statement.is_empty() {
        out.push(statement.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_semicolons() {
        let statements = split_statements("CREATE TABLE a (x INT);\nINSERT INTO a VALUES (1);\n");
        assert_eq!(
            statements,
            vec!["CREATE TABLE a (x INT)", "INSERT INTO a VALUES (1)"]
        );
    }

    #[test]
    fn test_semicolons_inside_literals_and_identifiers() {
        let statements = split_statements(
            "INSERT INTO [a;b] VALUES ('x;y', 'it''s; fine');\nSELECT \"c;d\" FROM t",
        );
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0], "INSERT INTO [a;b] VALUES ('x;y', 'it''s; fine')");
        assert_eq!(statements[1], "SELECT \"c;d\" FROM t");
    }

    #[test]
    fn test_comments_are_dropped() {
        let statements = split_statements(
            "-- leading comment; with semicolon\nCREATE TABLE a (x INT); /* block; comment */\n-- only a comment\n",
        );
        assert_eq!(statements, vec!["CREATE TABLE a (x INT)"]);
    }

    #[test]
    fn test_go_separates_batches() {
        let statements = split_statements(
            "CREATE VIEW v AS SELECT 1 AS x\nGO\ncreate view w as select 2 as y\n  go  \n",
        );
        assert_eq!(
            statements,
            vec!["CREATE VIEW v AS SELECT 1 AS x", "create view w as select 2 as y"]
        );
    }

    #[test]
    fn test_go_inside_identifier_is_not_a_separator() {
        let statements = split_statements("SELECT [GO]\nFROM t;");
        assert_eq!(statements, vec!["SELECT [GO]\nFROM t"]);
    }

    #[test]
    fn test_builder_keeps_step_order() {
        let dataset = Dataset::new("tiny")
            .with_schema("CREATE TABLE t (x INT);")
            .with_seed("INSERT INTO t VALUES (1); INSERT INTO t VALUES (2);")
            .with_functions("CREATE VIEW v AS SELECT x FROM t;")
            .with_teardown("DROP VIEW v;");

        assert_eq!(dataset.name(), "tiny");
        assert_eq!(dataset.statements(ProvisionStep::Seed).len(), 2);
        assert_eq!(dataset.provisioning_len(), 4);
        assert_eq!(dataset.statements(ProvisionStep::Teardown), ["DROP VIEW v"]);
    }
}
