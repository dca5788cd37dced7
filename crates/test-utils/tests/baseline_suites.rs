// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Checked-in baseline suites are well formed and cover their catalogs

use anyhow::{Context, Result};
use query_baseline_runner::{
    BaselineSuite, Dialect, ExpectedSqlProvider, ScenarioCatalog, SuiteDocument,
    check_all_scenarios_covered,
};
use query_baseline_test_utils::{
    baseline_dir, baseline_path, many_to_many_catalog, northwind_catalog, owned_catalog,
    temporal_catalog, udf_catalog,
};

fn catalogs(dialect: Dialect) -> Vec<(&'static str, ScenarioCatalog)> {
    vec![
        ("northwind", northwind_catalog(dialect)),
        ("functions", udf_catalog(dialect)),
        ("many_to_many", many_to_many_catalog(dialect)),
        ("owned", owned_catalog(dialect)),
    ]
}

#[test]
fn test_every_suite_file_is_valid() -> Result<()> {
    for dialect_dir in std::fs::read_dir(baseline_dir())? {
        let dialect_dir = dialect_dir?.path();
        let expected: Dialect = dialect_dir
            .file_name()
            .and_then(|name| name.to_str())
            .context("dialect directory name")?
            .parse()?;

        for file in std::fs::read_dir(&dialect_dir)? {
            let path = file?.path();
            let yaml = std::fs::read_to_string(&path)?;
            let document = SuiteDocument::from_yaml(&yaml)?;
            assert!(
                document.problems().is_empty(),
                "{path:?}: {:?}",
                document.problems()
            );
            assert_eq!(document.dialect, expected, "{path:?} sits in the wrong directory");
        }
    }
    Ok(())
}

#[test]
fn test_suites_cover_catalogs() -> Result<()> {
    for dialect in [Dialect::SqlServer, Dialect::Sqlite] {
        for (suite, catalog) in catalogs(dialect) {
            let suite = BaselineSuite::from_file(baseline_path(dialect, suite))?;
            assert_eq!(suite.dialect(), dialect);
            check_all_scenarios_covered(&catalog, &suite)?;
        }
    }
    Ok(())
}

#[test]
fn test_temporal_suite_is_sqlserver_only() -> Result<()> {
    let suite = BaselineSuite::from_file(baseline_path(Dialect::SqlServer, "temporal"))?;
    check_all_scenarios_covered(&temporal_catalog(), &suite)?;
    assert!(!baseline_path(Dialect::Sqlite, "temporal").exists());

    let document = suite.document();
    let Some(skip_navigation) = document.scenario("temporal_skip_navigation_count_as_of")
    else {
        anyhow::bail!("temporal_skip_navigation_count_as_of missing from the suite");
    };
    let Some(sql) = &skip_navigation.sql else {
        anyhow::bail!("temporal_skip_navigation_count_as_of has no statements");
    };
    assert_eq!(sql.len(), 1);
    assert_eq!(sql[0].matches("FOR SYSTEM_TIME AS OF").count(), 3);
    Ok(())
}

#[test]
fn test_opaque_entries_are_alone() -> Result<()> {
    let suite = BaselineSuite::from_file(baseline_path(Dialect::SqlServer, "northwind"))?;
    let document = suite.document();
    let Some(merged) = document.scenario("includes_merged") else {
        anyhow::bail!("includes_merged missing from the suite");
    };
    assert_eq!(merged.sql, Some(vec![" ".to_string()]));
    Ok(())
}
