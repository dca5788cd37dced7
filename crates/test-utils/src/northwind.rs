// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Northwind scenarios
//!
//! Include, split-query and paging shapes over [`Datasets::northwind`].
//!
//! [`Datasets::northwind`]: crate::Datasets::northwind

use query_baseline_capture::Parameter;
use query_baseline_fixture::Command;
use query_baseline_runner::{Dialect, ScenarioCatalog};

use crate::scripted::{ScriptedScenario, translate};

const INCLUDE_REFERENCE: &str = r#"SELECT [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate], [c].[CustomerID], [c].[Address], [c].[City], [c].[CompanyName], [c].[ContactName], [c].[ContactTitle], [c].[Country], [c].[Fax], [c].[Phone], [c].[PostalCode], [c].[Region]
FROM [Orders] AS [o]
LEFT JOIN [Customers] AS [c] ON [o].[CustomerID] = [c].[CustomerID]"#;

const SKIP_OFFSET_FETCH: &str = r#"SELECT [t].[CustomerID], [t].[Address], [t].[City], [t].[CompanyName], [t].[ContactName], [t].[ContactTitle], [t].[Country], [t].[Fax], [t].[Phone], [t].[PostalCode], [t].[Region], [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate]
FROM (
    SELECT [c].[CustomerID], [c].[Address], [c].[City], [c].[CompanyName], [c].[ContactName], [c].[ContactTitle], [c].[Country], [c].[Fax], [c].[Phone], [c].[PostalCode], [c].[Region]
    FROM [Customers] AS [c]
    ORDER BY (SELECT 1)
    OFFSET @__p_0 ROWS
) AS [t]
LEFT JOIN [Orders] AS [o] ON [t].[CustomerID] = [o].[CustomerID]
ORDER BY [t].[CustomerID]"#;

const SKIP_LIMIT_OFFSET: &str = r#"SELECT [t].[CustomerID], [t].[Address], [t].[City], [t].[CompanyName], [t].[ContactName], [t].[ContactTitle], [t].[Country], [t].[Fax], [t].[Phone], [t].[PostalCode], [t].[Region], [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate]
FROM (
    SELECT [c].[CustomerID], [c].[Address], [c].[City], [c].[CompanyName], [c].[ContactName], [c].[ContactTitle], [c].[Country], [c].[Fax], [c].[Phone], [c].[PostalCode], [c].[Region]
    FROM [Customers] AS [c]
    LIMIT -1 OFFSET @__p_0
) AS [t]
LEFT JOIN [Orders] AS [o] ON [t].[CustomerID] = [o].[CustomerID]
ORDER BY [t].[CustomerID]"#;

const SPLIT_CUSTOMERS: &str = r#"SELECT [c].[CustomerID], [c].[Address], [c].[City], [c].[CompanyName], [c].[ContactName], [c].[ContactTitle], [c].[Country], [c].[Fax], [c].[Phone], [c].[PostalCode], [c].[Region]
FROM [Customers] AS [c]
WHERE [c].[CustomerID] = N'ALFKI'
ORDER BY [c].[CustomerID]"#;

const SPLIT_ORDERS: &str = r#"SELECT [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate], [c].[CustomerID]
FROM [Customers] AS [c]
INNER JOIN [Orders] AS [o] ON [c].[CustomerID] = [o].[CustomerID]
WHERE [c].[CustomerID] = N'ALFKI'
ORDER BY [c].[CustomerID]"#;

const INCLUDES_MERGED: &str = r#"SELECT [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate], [c].[CustomerID], [c].[CompanyName], [e].[EmployeeID], [e].[City], [e].[FirstName], [e].[LastName], [e].[ReportsTo]
FROM [Orders] AS [o]
LEFT JOIN [Customers] AS [c] ON [o].[CustomerID] = [c].[CustomerID]
LEFT JOIN [Employees] AS [e] ON [o].[EmployeeID] = [e].[EmployeeID]
WHERE [o].[OrderID] < 10300"#;

const SINGLE_TOP: &str = r#"SELECT TOP(2) [c].[CustomerID], [c].[CompanyName]
FROM [Customers] AS [c]
WHERE [c].[CustomerID] = N'XXXXX'"#;

const SINGLE_LIMIT: &str = r#"SELECT [c].[CustomerID], [c].[CompanyName]
FROM [Customers] AS [c]
WHERE [c].[CustomerID] = N'XXXXX'
LIMIT 2"#;

const CITY: &str = r#"SELECT [c].[CustomerID], [c].[CompanyName], [c].[City]
FROM [Customers] AS [c]
WHERE [c].[City] = @__city_0
ORDER BY [c].[CustomerID]"#;

/// Scenario catalog over the Northwind dataset, rendered for `dialect`
pub fn northwind_catalog(dialect: Dialect) -> ScenarioCatalog {
    let sql = |template: &str| translate(template, dialect);
    let sqlserver = dialect == Dialect::SqlServer;

    let skip = if sqlserver {
        SKIP_OFFSET_FETCH
    } else {
        SKIP_LIMIT_OFFSET
    };
    let single = if sqlserver { SINGLE_TOP } else { SINGLE_LIMIT };
    // Inferred from the column's declared length on SQL Server, the value's length elsewhere
    let city_size = if sqlserver { 15 } else { 6 };

    ScenarioCatalog::new()
        .with(ScriptedScenario::new("include_reference").query(sql(INCLUDE_REFERENCE)))
        .with(
            ScriptedScenario::new("include_collection_skip_no_order_by")
                .query(Command::new(sql(skip)).param("__p_0", 10)),
        )
        .with(
            ScriptedScenario::new("include_collection_split")
                .query(sql(SPLIT_CUSTOMERS))
                .query(sql(SPLIT_ORDERS)),
        )
        .with(ScriptedScenario::new("collection_first_or_default_client_side"))
        .with(ScriptedScenario::new("where_client_eval").fail_translation(
            "The query expression 'Customers.Where(c => c.IsLondon)' could not be translated. \
             Either rewrite the query in a form that can be translated, or switch to client \
             evaluation explicitly.",
        ))
        .with(ScriptedScenario::new("includes_merged").query(sql(INCLUDES_MERGED)))
        .with(ScriptedScenario::new("single_on_empty").single(sql(single)))
        .with(
            ScriptedScenario::new("where_city_parameter").query(
                Command::new(sql(CITY))
                    .bind(Parameter::new("__city_0", "London").with_size(city_size)),
            ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_shared_by_dialects() {
        let sqlserver = northwind_catalog(Dialect::SqlServer);
        let sqlite = northwind_catalog(Dialect::Sqlite);
        assert_eq!(sqlserver.names(), sqlite.names());
        assert_eq!(sqlserver.len(), 8);
    }

    #[test]
    fn test_include_reference_shape() {
        assert!(INCLUDE_REFERENCE.starts_with(
            "SELECT [o].[OrderID], [o].[CustomerID], [o].[EmployeeID], [o].[OrderDate], [c].[CustomerID]"
        ));
        assert!(INCLUDE_REFERENCE.ends_with(
            "FROM [Orders] AS [o]\nLEFT JOIN [Customers] AS [c] ON [o].[CustomerID] = [c].[CustomerID]"
        ));
    }
}
