// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Coverage check between the shared scenario catalog and a dialect's expectations

use std::collections::HashSet;

use crate::error::{RunnerError, RunnerResult};
use crate::expectation::ExpectedSqlProvider;
use crate::scenario::ScenarioCatalog;

/// Fail unless every scenario has an expectation and every expectation has a scenario
///
/// Scenarios are reported in catalog order, orphaned expectations in the
/// provider's order.
pub fn check_all_scenarios_covered(
    catalog: &ScenarioCatalog,
    provider: &dyn ExpectedSqlProvider,
) -> RunnerResult<()> {
    let declared: Vec<String> = provider.scenario_names();
    let declared_set: HashSet<&str> = declared.iter().map(String::as_str).collect();
    let known: HashSet<&str> = catalog.names().into_iter().collect();

    let missing: Vec<String> = catalog
        .names()
        .into_iter()
        .filter(|name| !declared_set.contains(name))
        .map(str::to_string)
        .collect();
    let orphaned: Vec<String> = declared
        .iter()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() && orphaned.is_empty() {
        tracing::debug!(
            dialect = %provider.dialect(),
            scenarios = catalog.len(),
            "All scenarios covered"
        );
        return Ok(());
    }

    Err(RunnerError::Coverage {
        dialect: provider.dialect(),
        missing,
        orphaned,
    })
}
