// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL text normalization applied before baseline equality
//!
//! Only superficial formatting is removed: line-ending style, trailing
//! whitespace on each line, and blank lines or whitespace around the whole
//! block. Keyword case, identifier quoting, literals, inner indentation and the
//! parameter preamble are compared exactly.

/// Normalize a statement for comparison
pub fn normalize_sql(sql: &str) -> String {
    let unified = sql.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = unified.split('\n').map(str::trim_end).collect();
    lines.join("\n").trim().to_string()
}

/// Whether two statements are equal after normalization
pub fn sql_eq(left: &str, right: &str) -> bool {
    normalize_sql(left) == normalize_sql(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_are_unified() {
        assert_eq!(normalize_sql("SELECT 1\r\nFROM t\rWHERE x"), "SELECT 1\nFROM t\nWHERE x");
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        assert!(sql_eq("SELECT 1  \nFROM t\n\n", "SELECT 1\nFROM t"));
        assert!(sql_eq("\n\nSELECT 1", "SELECT 1 "));
    }

    #[test]
    fn test_inner_indentation_is_kept() {
        let nested = "SELECT 1\nFROM (\n    SELECT 2\n) AS [t]";
        assert_eq!(normalize_sql(nested), nested);
        assert!(!sql_eq(nested, "SELECT 1\nFROM (\nSELECT 2\n) AS [t]"));
    }

    #[test]
    fn test_semantic_differences_are_kept() {
        assert!(!sql_eq("SELECT [c].[Id]", "SELECT [c].[ID]"));
        assert!(!sql_eq("SELECT [c].[Id]", "SELECT \"c\".\"Id\""));
        assert!(!sql_eq("LEFT JOIN [t]", "INNER JOIN [t]"));
        assert!(!sql_eq("@__p_0='10'", "@__p_0='11'"));
    }

    #[test]
    fn test_preamble_blank_line_is_kept() {
        assert_eq!(
            normalize_sql("@__p_0='10'\r\n\r\nSELECT 1\r\n"),
            "@__p_0='10'\n\nSELECT 1"
        );
    }
}
