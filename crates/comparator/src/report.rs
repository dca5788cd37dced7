// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mismatch reports and new-baseline emission
//!
//! When a comparison fails, the captured statements are rendered in a form that
//! can be pasted straight back into a baseline suite or an `assert_sql!` call.

use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{BaselineError, BaselineResult};

const NEW_BASELINES_FILE: &str = "new-baselines.txt";

/// Numbered listing of statements, used in count-mismatch reports
pub fn render_statement_list(statements: &[String]) -> String {
    if statements.is_empty() {
        return "(no statements)".to_string();
    }

    statements
        .iter()
        .enumerate()
        .map(|(index, sql)| format!("--- [{index}] ---\n{sql}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render captured statements as the `sql:` list of a baseline suite entry
pub fn render_yaml_baseline(statements: &[String]) -> String {
    if statements.is_empty() {
        return "sql: []".to_string();
    }

    let mut out = String::from("sql:\n");
    for statement in statements {
        out.push_str("  - |\n");
        for line in statement.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

/// Render captured statements as an `assert_sql!` invocation
pub fn render_assert_sql(statements: &[String]) -> String {
    if statements.is_empty() {
        return "assert_sql!(sink);".to_string();
    }

    let blocks: Vec<String> = statements
        .iter()
        .map(|sql| format!("    r#\"\n{sql}\n\"#"))
        .collect();
    format!("assert_sql!(\n    sink,\n{}\n);", blocks.join(",\n"))
}

/// Append a new baseline for `test_name` to `<dir>/new-baselines.txt`
pub fn write_new_baseline(
    dir: &Path,
    test_name: &str,
    statements: &[String],
) -> BaselineResult<PathBuf> {
    let path = dir.join(NEW_BASELINES_FILE);
    let io_error = |source| BaselineError::Io {
        path: path.clone(),
        source,
    };

    create_dir_all(dir).map_err(io_error)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(io_error)?;

    writeln!(
        file,
        "# {test_name}\n{}\n",
        render_yaml_baseline(statements).trim_end()
    )
    .map_err(io_error)?;

    tracing::info!(test = test_name, path = %path.display(), "New baseline written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_statement_list() {
        let listing = render_statement_list(&["SELECT 1".into(), "SELECT 2".into()]);
        assert_eq!(listing, "--- [0] ---\nSELECT 1\n--- [1] ---\nSELECT 2");
        assert_eq!(render_statement_list(&[]), "(no statements)");
    }

    #[test]
    fn test_render_yaml_baseline_keeps_blank_preamble_line() {
        let yaml = render_yaml_baseline(&["@__p_0='10'\n\nSELECT 1".into()]);
        assert_eq!(yaml, "sql:\n  - |\n    @__p_0='10'\n\n    SELECT 1\n");
    }

    #[test]
    fn test_render_assert_sql() {
        assert_eq!(render_assert_sql(&[]), "assert_sql!(sink);");
        let code = render_assert_sql(&["SELECT 1".into()]);
        assert!(code.starts_with("assert_sql!(\n    sink,\n    r#\"\nSELECT 1\n\"#"));
    }

    #[test]
    fn test_write_new_baseline_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_new_baseline(dir.path(), "first", &["SELECT 1".into()]).unwrap();
        write_new_baseline(dir.path(), "second", &[]).unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("# first\nsql:\n  - |\n    SELECT 1\n"));
        assert!(content.contains("# second\nsql: []"));
    }
}
