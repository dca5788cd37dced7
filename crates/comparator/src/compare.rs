// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Baseline Comparator
//!
//! Asserts that the statements captured for the current test match an expected
//! list of literal SQL blocks, one per executed statement.
//!
//! ## Contract
//!
//! - An empty expected list means no SQL may have been issued.
//! - Captured and expected counts must be equal.
//! - Statements are compared positionally after [`normalize_sql`], unless
//!   [`ComparisonOrder::Unordered`] is requested.
//! - A blank expected string (`" "`) is [`ExpectedStatement::Opaque`]: exactly
//!   one non-empty statement must exist at that position, its text is not checked.
//! - The comparison is single-shot; nothing is retried.

use std::path::PathBuf;

use query_baseline_capture::CaptureSink;
use serde::{Deserialize, Serialize};

use crate::error::{BaselineError, BaselineResult, Mismatch};
use crate::normalize::{normalize_sql, sql_eq};
use crate::report::{render_statement_list, render_yaml_baseline, write_new_baseline};

/// One entry of an expected baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedStatement {
    /// Literal SQL, including any parameter preamble
    Sql(String),
    /// A statement must be issued, its content is not asserted
    Opaque,
}

impl ExpectedStatement {
    pub fn is_opaque(&self) -> bool {
        matches!(self, ExpectedStatement::Opaque)
    }

    /// Text shown in reports
    pub fn display_text(&self) -> &str {
        match self {
            ExpectedStatement::Sql(sql) => sql,
            ExpectedStatement::Opaque => "<any non-empty statement>",
        }
    }

    fn matches(&self, actual: &str) -> bool {
        match self {
            ExpectedStatement::Sql(sql) => sql_eq(sql, actual),
            ExpectedStatement::Opaque => !normalize_sql(actual).is_empty(),
        }
    }
}

impl From<&str> for ExpectedStatement {
    fn from(sql: &str) -> Self {
        if sql.trim().is_empty() {
            ExpectedStatement::Opaque
        } else {
            ExpectedStatement::Sql(sql.to_string())
        }
    }
}

impl From<String> for ExpectedStatement {
    fn from(sql: String) -> Self {
        if sql.trim().is_empty() {
            ExpectedStatement::Opaque
        } else {
            ExpectedStatement::Sql(sql)
        }
    }
}

impl From<&String> for ExpectedStatement {
    fn from(sql: &String) -> Self {
        ExpectedStatement::from(sql.as_str())
    }
}

/// Build an expected baseline from literal strings
pub fn expected<I, S>(statements: I) -> Vec<ExpectedStatement>
where
    I: IntoIterator<Item = S>,
    S: Into<ExpectedStatement>,
{
    statements.into_iter().map(Into::into).collect()
}

/// How captured statements are paired with expected ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOrder {
    /// First executed statement is compared with the first expected one
    #[default]
    Positional,
    /// Each expected statement matches a distinct captured statement anywhere
    Unordered,
}

impl std::str::FromStr for ComparisonOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positional" | "ordered" => Ok(ComparisonOrder::Positional),
            "unordered" => Ok(ComparisonOrder::Unordered),
            other => Err(format!("Invalid comparison order: {other}")),
        }
    }
}

/// Configurable baseline comparator
#[derive(Debug, Clone, Default)]
pub struct Comparator {
    order: ComparisonOrder,
    baseline_output_dir: Option<PathBuf>,
    test_name: Option<String>,
}

impl Comparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(mut self, order: ComparisonOrder) -> Self {
        self.order = order;
        self
    }

    /// Append a ready-to-paste baseline to `<dir>/new-baselines.txt` on mismatch
    pub fn with_baseline_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_output_dir = Some(dir.into());
        self
    }

    /// Name used to tag reports and new baselines
    pub fn for_test(mut self, test_name: impl Into<String>) -> Self {
        self.test_name = Some(test_name.into());
        self
    }

    pub fn order(&self) -> ComparisonOrder {
        self.order
    }

    /// Compare the statements captured in `sink` since its last clear
    pub fn assert_baseline(
        &self,
        sink: &CaptureSink,
        expected: &[ExpectedStatement],
    ) -> BaselineResult<()> {
        self.compare(&sink.rendered(), expected)
    }

    /// Compare rendered statements with an expected baseline
    pub fn compare(&self, actual: &[String], expected: &[ExpectedStatement]) -> BaselineResult<()> {
        let result = if actual.len() != expected.len() {
            Err(self.count_mismatch(actual, expected))
        } else {
            match self.order {
                ComparisonOrder::Positional => compare_positional(actual, expected),
                ComparisonOrder::Unordered => compare_unordered(actual, expected),
            }
        };

        if let Err(error) = &result {
            self.emit_new_baseline(actual);
            tracing::debug!(
                test = self.test_name.as_deref().unwrap_or("unnamed"),
                "Baseline comparison failed: {error}"
            );
        }
        result
    }

    fn count_mismatch(&self, actual: &[String], expected: &[ExpectedStatement]) -> BaselineError {
        let expected_texts: Vec<String> = expected
            .iter()
            .map(|statement| statement.display_text().to_string())
            .collect();

        let mut report = format!(
            "Expected {} statement(s) but {} were captured",
            expected.len(),
            actual.len()
        );
        if let Some(test) = &self.test_name {
            report.push_str(&format!(" in {test}"));
        }
        report.push_str(&format!(
            "\n\nExpected:\n{}\n\nActual:\n{}\n\nNew baseline:\n{}",
            render_statement_list(&expected_texts),
            render_statement_list(actual),
            render_yaml_baseline(actual).trim_end()
        ));

        BaselineError::CountMismatch {
            expected: expected.len(),
            actual: actual.len(),
            report,
        }
    }

    fn emit_new_baseline(&self, actual: &[String]) {
        let Some(dir) = &self.baseline_output_dir else {
            return;
        };
        let test_name = self.test_name.as_deref().unwrap_or("unnamed");
        if let Err(e) = write_new_baseline(dir, test_name, actual) {
            tracing::warn!("Could not record new baseline: {e}");
        }
    }
}

fn compare_positional(actual: &[String], expected: &[ExpectedStatement]) -> BaselineResult<()> {
    let mut mismatches = Vec::new();
    let mut empty_opaque = Vec::new();

    for (position, (actual_sql, expected_statement)) in actual.iter().zip(expected).enumerate() {
        match expected_statement {
            ExpectedStatement::Opaque => {
                if normalize_sql(actual_sql).is_empty() {
                    empty_opaque.push(position);
                    mismatches.push(Mismatch {
                        position,
                        expected: expected_statement.display_text().to_string(),
                        actual: String::new(),
                    });
                }
            }
            ExpectedStatement::Sql(expected_sql) => {
                if !sql_eq(expected_sql, actual_sql) {
                    mismatches.push(Mismatch {
                        position,
                        expected: normalize_sql(expected_sql),
                        actual: normalize_sql(actual_sql),
                    });
                }
            }
        }
    }

    // An empty opaque statement alone keeps its dedicated error
    if let ([position], 1) = (empty_opaque.as_slice(), mismatches.len()) {
        return Err(BaselineError::OpaqueStatementEmpty { position: *position });
    }
    content_result(mismatches, actual)
}

fn compare_unordered(actual: &[String], expected: &[ExpectedStatement]) -> BaselineResult<()> {
    let mut used = vec![false; actual.len()];

    // Literal entries claim their statements first so opaque entries cannot steal them
    let mut order: Vec<usize> = (0..expected.len()).collect();
    order.sort_by_key(|&index| expected[index].is_opaque());

    let mut unmatched_expected = Vec::new();
    for index in order {
        let candidate = actual
            .iter()
            .enumerate()
            .position(|(i, sql)| !used[i] && expected[index].matches(sql));
        match candidate {
            Some(i) => used[i] = true,
            None => unmatched_expected.push(index),
        }
    }
    unmatched_expected.sort_unstable();

    let unmatched_actual: Vec<usize> = (0..actual.len()).filter(|&i| !used[i]).collect();

    let mismatches: Vec<Mismatch> = unmatched_expected
        .iter()
        .zip(unmatched_actual.iter())
        .map(|(&expected_index, &actual_index)| Mismatch {
            position: expected_index,
            expected: normalize_sql(expected[expected_index].display_text()),
            actual: normalize_sql(&actual[actual_index]),
        })
        .collect();

    content_result(mismatches, actual)
}

fn content_result(mismatches: Vec<Mismatch>, actual: &[String]) -> BaselineResult<()> {
    if mismatches.is_empty() {
        return Ok(());
    }

    let mut report = format!("{} statement(s) differ from the baseline\n", mismatches.len());
    for mismatch in &mismatches {
        report.push('\n');
        report.push_str(&mismatch.to_string());
        report.push('\n');
    }
    report.push_str(&format!(
        "\nNew baseline:\n{}",
        render_yaml_baseline(actual).trim_end()
    ));

    Err(BaselineError::ContentMismatch { mismatches, report })
}

/// Compare `sink` with literal expected SQL using the default comparator
pub fn assert_baseline<S: AsRef<str>>(sink: &CaptureSink, expected: &[S]) -> BaselineResult<()> {
    let expected: Vec<ExpectedStatement> = expected
        .iter()
        .map(|sql| ExpectedStatement::from(sql.as_ref()))
        .collect();
    Comparator::new().assert_baseline(sink, &expected)
}

/// Assert that no statement was captured
pub fn assert_no_sql(sink: &CaptureSink) -> BaselineResult<()> {
    Comparator::new().assert_baseline(sink, &[])
}
