// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the baseline comparator and `assert_sql!`

use query_baseline_capture::{CaptureSink, CapturedStatement, Parameter};
use query_baseline_comparator::{
    BaselineError, Comparator, ComparisonOrder, ExpectedStatement, assert_baseline, assert_sql,
    expected,
};

const INCLUDE_REFERENCE: &str = r#"SELECT [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate], [c].[CustomerID], [c].[Address], [c].[City], [c].[CompanyName], [c].[ContactName], [c].[ContactTitle], [c].[Country], [c].[Fax], [c].[Phone], [c].[PostalCode], [c].[Region]
FROM [Orders] AS [o]
LEFT JOIN [Customers] AS [c] ON [o].[CustomerID] = [c].[CustomerID]"#;

fn record_all(sink: &CaptureSink, statements: &[&str]) {
    for sql in statements {
        sink.record(CapturedStatement::new(*sql));
    }
}

#[test]
fn test_assert_sql_macro_passes_on_match() {
    let sink = CaptureSink::new();
    sink.record(CapturedStatement::new(format!("{INCLUDE_REFERENCE}\n")));

    assert_sql!(sink, INCLUDE_REFERENCE);
}

#[test]
fn test_assert_sql_macro_without_statements() {
    let sink = CaptureSink::new();
    assert_sql!(sink);
}

#[test]
#[should_panic(expected = "Expected 0 statement(s) but 1 were captured")]
fn test_assert_sql_macro_panics_with_report() {
    let sink = CaptureSink::new();
    record_all(&sink, &["SELECT 1"]);
    assert_sql!(sink);
}

#[test]
fn test_macro_accepts_shared_sink() {
    let sink = CaptureSink::shared();
    record_all(&sink, &["SELECT 1", "SELECT 2"]);
    assert_sql!(sink, "SELECT 1", "SELECT 2",);
}

#[test]
fn test_capture_is_idempotent_across_sinks() {
    let first = CaptureSink::new();
    let second = CaptureSink::new();
    for sink in [&first, &second] {
        sink.record(
            CapturedStatement::new("SELECT [c].[CustomerID] FROM [Customers] AS [c] WHERE [c].[City] = @__city_0")
                .with_parameter(Parameter::new("__city_0", "London").with_size(4000)),
        );
    }
    assert_eq!(first.rendered(), second.rendered());
}

#[test]
fn test_skip_parameter_preamble() {
    let sink = CaptureSink::new();
    sink.record(
        CapturedStatement::new(
            "SELECT [c].[CustomerID], [o].[OrderID]\nFROM (\n    SELECT [c].[CustomerID]\n    FROM [Customers] AS [c]\n    ORDER BY (SELECT 1)\n    OFFSET @__p_0 ROWS\n) AS [c]\nLEFT JOIN [Orders] AS [o] ON [c].[CustomerID] = [o].[CustomerID]",
        )
        .with_parameter(Parameter::new("__p_0", 10)),
    );

    let rendered = sink.rendered();
    let mut lines = rendered[0].lines();
    assert_eq!(lines.next(), Some("@__p_0='10'"));
    assert_eq!(lines.next(), Some(""));

    assert_sql!(
        sink,
        r#"@__p_0='10'

SELECT [c].[CustomerID], [o].[OrderID]
FROM (
    SELECT [c].[CustomerID]
    FROM [Customers] AS [c]
    ORDER BY (SELECT 1)
    OFFSET @__p_0 ROWS
) AS [c]
LEFT JOIN [Orders] AS [o] ON [c].[CustomerID] = [o].[CustomerID]"#
    );
}

#[test]
fn test_content_mismatch_reports_every_position() {
    let sink = CaptureSink::new();
    record_all(&sink, &["SELECT 1", "SELECT [x]", "SELECT 3"]);

    let err = assert_baseline(&sink, &["SELECT 1", "SELECT [y]", "SELECT 4"]).unwrap_err();
    assert!(err.is_mismatch());
    match &err {
        BaselineError::ContentMismatch { mismatches, report } => {
            let positions: Vec<usize> = mismatches.iter().map(|m| m.position).collect();
            assert_eq!(positions, vec![1, 2]);
            assert!(report.contains("2 statement(s) differ"));
            assert!(report.contains("SELECT [x]"));
            assert!(report.contains("SELECT [y]"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_opaque_entry_among_literal_statements() {
    let sink = CaptureSink::new();
    record_all(&sink, &["SELECT 1", "SELECT whatever FROM [Anything]"]);

    let baseline = expected(["SELECT 1", " "]);
    assert_eq!(baseline[1], ExpectedStatement::Opaque);
    assert!(Comparator::new().assert_baseline(&sink, &baseline).is_ok());
}

#[test]
fn test_unordered_with_opaque_entry() {
    let sink = CaptureSink::new();
    record_all(&sink, &["SELECT split_2", "SELECT split_1"]);

    let comparator = Comparator::new().with_order(ComparisonOrder::Unordered);
    assert!(
        comparator
            .assert_baseline(&sink, &expected([" ", "SELECT split_2"]))
            .is_ok()
    );
}

#[test]
fn test_new_baseline_file_collects_multiple_tests() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CaptureSink::new();
    record_all(&sink, &["SELECT 1"]);

    for name in ["first_test", "second_test"] {
        let result = Comparator::new()
            .for_test(name)
            .with_baseline_output(dir.path())
            .assert_baseline(&sink, &[]);
        assert!(result.is_err());
    }

    let content = std::fs::read_to_string(dir.path().join("new-baselines.txt")).unwrap();
    let first = content.find("# first_test").unwrap();
    let second = content.find("# second_test").unwrap();
    assert!(first < second);
}
