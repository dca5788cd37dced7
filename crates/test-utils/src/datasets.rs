// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Seed datasets
//!
//! Scripts are embedded at compile time; the same files are also reachable
//! through their YAML manifests under [`Datasets::data_dir`].

use std::path::PathBuf;

use query_baseline_fixture::Dataset;
use query_baseline_runner::Dialect;

/// Seed datasets shared by the scenario catalogs
pub struct Datasets;

impl Datasets {
    // ===== Northwind =====

    /// Customers, employees and orders; one order has no customer
    pub fn northwind() -> Dataset {
        Dataset::new("northwind")
            .with_schema(include_str!("../data/northwind/schema.sql"))
            .with_seed(include_str!("../data/northwind/seed.sql"))
            .with_teardown(include_str!("../data/northwind/teardown.sql"))
    }

    // ===== UDF catalog =====

    /// Customers and orders plus store functions
    ///
    /// SQL Server gets real scalar and table-valued functions; the other
    /// dialects get views the translator maps the functions onto.
    pub fn udf_catalog(dialect: Dialect) -> Dataset {
        let functions = match dialect {
            Dialect::SqlServer => include_str!("../data/functions/sqlserver.sql"),
            _ => include_str!("../data/functions/sqlite.sql"),
        };

        Dataset::new("udf_catalog")
            .with_schema(include_str!("../data/functions/schema.sql"))
            .with_seed(include_str!("../data/functions/seed.sql"))
            .with_functions(functions)
    }

    // ===== Many-to-many =====

    pub fn many_to_many() -> Dataset {
        Dataset::new("many_to_many")
            .with_schema(include_str!("../data/many_to_many/schema.sql"))
            .with_seed(include_str!("../data/many_to_many/seed.sql"))
    }

    // ===== Owned entities =====

    /// People with flattened owned addresses, their orders and order details
    pub fn owned() -> Dataset {
        Dataset::new("owned")
            .with_schema(include_str!("../data/owned/schema.sql"))
            .with_seed(include_str!("../data/owned/seed.sql"))
    }

    // ===== Temporal =====

    /// Many-to-many and owned tables together, read through `FOR SYSTEM_TIME`
    pub fn temporal() -> Dataset {
        Dataset::new("temporal")
            .with_schema(include_str!("../data/many_to_many/schema.sql"))
            .with_schema(include_str!("../data/owned/schema.sql"))
            .with_seed(include_str!("../data/many_to_many/seed.sql"))
            .with_seed(include_str!("../data/owned/seed.sql"))
    }

    /// Directory holding the dataset scripts and manifests
    pub fn data_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    /// Manifest path of a dataset directory, e.g. `manifest("northwind", "dataset")`
    pub fn manifest(dataset: &str, manifest: &str) -> PathBuf {
        Self::data_dir()
            .join(dataset)
            .join(format!("{manifest}.yaml"))
    }
}
