// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Baseline suite inspection behind the `query-baseline` binary

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use query_baseline_comparator::{
    ExpectedStatement, render_assert_sql, render_statement_list, render_yaml_baseline,
};
use query_baseline_runner::{Expectation, SuiteDocument, SuiteProblem};

/// Outcome of validating one suite file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Scenario count when the file parsed
    pub scenarios: Option<usize>,
    pub problems: Vec<String>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(
                f,
                "ok {} ({} scenario(s))",
                self.path.display(),
                self.scenarios.unwrap_or_default()
            );
        }
        write!(f, "FAILED {}", self.path.display())?;
        for problem in &self.problems {
            write!(f, "\n  - {problem}")?;
        }
        Ok(())
    }
}

/// Parse and check one suite file
///
/// Read and parse errors, including an unknown dialect, are reported as
/// problems rather than returned.
pub fn validate_file(path: &Path) -> FileReport {
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))
        .and_then(|yaml| Ok(SuiteDocument::from_yaml(&yaml)?));

    match document {
        Ok(document) => FileReport {
            path: path.to_path_buf(),
            scenarios: Some(document.scenarios.len()),
            problems: document
                .problems()
                .iter()
                .map(SuiteProblem::to_string)
                .collect(),
        },
        Err(e) => FileReport {
            path: path.to_path_buf(),
            scenarios: None,
            problems: vec![format!("{e:#}")],
        },
    }
}

pub fn validate_files(paths: &[PathBuf]) -> Vec<FileReport> {
    paths.iter().map(|path| validate_file(path)).collect()
}

/// How `show` prints expected statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShowFormat {
    /// Numbered listing
    #[default]
    Listing,
    /// `sql:` entry of a suite
    Yaml,
    /// `assert_sql!` invocation
    Rust,
}

/// Render the expectation of `scenario` in the suite at `path`
pub fn show_scenario(path: &Path, scenario: &str, format: ShowFormat) -> Result<String> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let document = SuiteDocument::from_yaml(&yaml)?;
    let entry = document.scenario(scenario).with_context(|| {
        format!(
            "scenario '{scenario}' is not declared in {} (known: {})",
            path.display(),
            document
                .scenarios
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let rendered = match entry.expectation() {
        Expectation::Statements(statements) => {
            let statements: Vec<String> = statements
                .iter()
                .map(|statement| match statement {
                    ExpectedStatement::Sql(sql) => sql.trim_end().to_string(),
                    ExpectedStatement::Opaque => " ".to_string(),
                })
                .collect();
            match format {
                ShowFormat::Listing => render_statement_list(&statements),
                ShowFormat::Yaml => render_yaml_baseline(&statements),
                ShowFormat::Rust => render_assert_sql(&statements),
            }
        }
        Expectation::TranslationFailed { message_contains } => {
            describe_failure("translation failure", message_contains.as_deref())
        }
        Expectation::Fails {
            kind,
            message_contains,
        } => describe_failure(&format!("{kind} failure"), message_contains.as_deref()),
    };

    Ok(match &entry.description {
        Some(description) => format!("# {scenario}: {description}\n{rendered}"),
        None => format!("# {scenario}\n{rendered}"),
    })
}

fn describe_failure(kind: &str, message_contains: Option<&str>) -> String {
    match message_contains {
        Some(text) => format!("expects a {kind} containing '{text}'"),
        None => format!("expects a {kind}"),
    }
}
