// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Baseline comparison for query-baseline
//!
//! Compares the statements recorded by a [`CaptureSink`](query_baseline_capture::CaptureSink)
//! against literal expected SQL, producing a readable report and a
//! ready-to-paste new baseline on mismatch.
//!
//! ```rust,ignore
//! use query_baseline_comparator::assert_sql;
//!
//! assert_sql!(
//!     fixture.sink(),
//!     r#"@__p_0='10'
//!
//! SELECT [c].[CustomerID]
//! FROM [Customers] AS [c]
//! ORDER BY [c].[CustomerID]
//! OFFSET @__p_0 ROWS"#
//! );
//! ```

pub mod compare;
pub mod error;
pub mod normalize;
pub mod report;

pub use compare::{
    Comparator, ComparisonOrder, ExpectedStatement, assert_baseline, assert_no_sql, expected,
};
pub use error::{BaselineError, BaselineResult, Mismatch};
pub use normalize::{normalize_sql, sql_eq};
pub use report::{render_assert_sql, render_statement_list, render_yaml_baseline, write_new_baseline};

/// Assert the statements captured by a sink, panicking with the mismatch report
///
/// `assert_sql!(sink)` asserts that no SQL was issued.
#[macro_export]
macro_rules! assert_sql {
    ($sink:expr $(,)?) => {
        if let Err(e) = $crate::assert_no_sql(&$sink) {
            panic!("{}", e);
        }
    };
    ($sink:expr, $($expected:expr),+ $(,)?) => {
        if let Err(e) = $crate::assert_baseline(&$sink, &[$($expected),+]) {
            panic!("{}", e);
        }
    };
}
