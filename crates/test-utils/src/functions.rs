// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Store function scenarios over [`Datasets::udf_catalog`]
//!
//! SQL Server calls the `dbo` functions directly; the other dialects read the
//! views that stand in for them.
//!
//! [`Datasets::udf_catalog`]: crate::Datasets::udf_catalog

use query_baseline_fixture::Command;
use query_baseline_runner::{Dialect, ScenarioCatalog};

use crate::scripted::{ScriptedScenario, translate};

const SCALAR_UDF: &str = r#"SELECT TOP(2) [dbo].[CustomerOrderCount]([c].[Id])
FROM [Customers] AS [c]
WHERE [c].[Id] = @__customerId_0"#;

const SCALAR_VIEW: &str = r#"SELECT (
    SELECT [v].[Count]
    FROM [CustomerOrderCounts] AS [v]
    WHERE [v].[CustomerId] = [c].[Id])
FROM [Customers] AS [c]
WHERE [c].[Id] = @__customerId_0
LIMIT 2"#;

const TVF_UDF: &str = r#"SELECT [o].[Count], [o].[CustomerId], [o].[Year]
FROM [dbo].[GetCustomerOrderCountByYear](@__customerId_0) AS [o]
ORDER BY [o].[Count] DESC"#;

const TVF_VIEW: &str = r#"SELECT [o].[Count], [o].[CustomerId], [o].[Year]
FROM [CustomerOrderCountsByYear] AS [o]
WHERE [o].[CustomerId] = @__customerId_0
ORDER BY [o].[Count] DESC"#;

pub fn udf_catalog(dialect: Dialect) -> ScenarioCatalog {
    let (scalar, table_valued) = match dialect {
        Dialect::SqlServer => (SCALAR_UDF, TVF_UDF),
        _ => (SCALAR_VIEW, TVF_VIEW),
    };

    ScenarioCatalog::new()
        .with(
            ScriptedScenario::new("scalar_function_projection")
                .query(Command::new(translate(scalar, dialect)).param("__customerId_0", 1)),
        )
        .with(
            ScriptedScenario::new("table_valued_function")
                .query(Command::new(translate(table_valued, dialect)).param("__customerId_0", 3)),
        )
        .with(ScriptedScenario::new("function_not_mapped").fail_translation(
            "The function 'IsTopCustomer' is not mapped to a store function and cannot be translated.",
        ))
}
