// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scenario runner
//!
//! One invocation is: clear the fixture's sink, run the scenario through a
//! fresh session, then check the outcome against the dialect's expectation.
//! Runs on one fixture are sequential; use one runner per fixture.

use std::sync::Arc;

use query_baseline_comparator::{Comparator, ExpectedStatement};
use query_baseline_fixture::{Fixture, Row};

use crate::config::HarnessConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::expectation::{Expectation, ExpectedSqlProvider};
use crate::lifecycle::{LifecycleManager, LifecycleOutcome, TestContext, TestLifecycle};
use crate::scenario::{FailureKind, QueryError, QueryMode, Scenario, ScenarioCatalog};

/// Check that `result` is a translation failure whose message contains `message_contains`
///
/// Returns the failure message.
pub fn assert_translation_failed<T>(
    result: Result<T, QueryError>,
    message_contains: Option<&str>,
) -> RunnerResult<String> {
    assert_failure(result, FailureKind::TranslationFailed, message_contains)
}

/// Check that `result` failed with `kind` and a message containing `message_contains`
pub fn assert_failure<T>(
    result: Result<T, QueryError>,
    kind: FailureKind,
    message_contains: Option<&str>,
) -> RunnerResult<String> {
    let expected = match message_contains {
        Some(text) => format!("{kind} containing '{text}'"),
        None => kind.to_string(),
    };

    let error = match result {
        Ok(_) => {
            return Err(RunnerError::UnexpectedSuccess {
                context: "query".to_string(),
                expected,
            });
        }
        Err(error) => error,
    };

    let message = match &error {
        QueryError::TranslationFailed(message) | QueryError::InvalidOperation(message) => {
            message.clone()
        }
        QueryError::Store(source) => source.to_string(),
    };

    let kind_matches = error.kind() == kind;
    let message_matches = message_contains.is_none_or(|text| message.contains(text));
    if kind_matches && message_matches {
        Ok(message)
    } else {
        Err(RunnerError::WrongFailure {
            context: "query".to_string(),
            expected,
            actual: error.to_string(),
        })
    }
}

/// Drives scenarios of a catalog against one fixture and one dialect's expectations
pub struct ScenarioRunner<'a> {
    fixture: &'a Fixture,
    catalog: &'a ScenarioCatalog,
    provider: &'a dyn ExpectedSqlProvider,
    config: HarnessConfig,
    lifecycle: LifecycleManager,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(
        fixture: &'a Fixture,
        catalog: &'a ScenarioCatalog,
        provider: &'a dyn ExpectedSqlProvider,
        config: HarnessConfig,
    ) -> Self {
        Self {
            fixture,
            catalog,
            provider,
            config,
            lifecycle: LifecycleManager::new(),
        }
    }

    pub fn with_lifecycle(mut self, lifecycle: impl TestLifecycle + 'static) -> Self {
        self.lifecycle = LifecycleManager::with_lifecycle(lifecycle);
        self
    }

    pub fn with_shared_lifecycle(mut self, lifecycle: Arc<dyn TestLifecycle>) -> Self {
        self.lifecycle = LifecycleManager::from_arc(lifecycle);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one scenario in one mode and check it against its expectation
    pub async fn run(&self, name: &str, mode: QueryMode) -> RunnerResult<()> {
        let scenario = self
            .catalog
            .get(name)
            .ok_or_else(|| RunnerError::UnknownScenario(name.to_string()))?
            .clone();
        let expectation =
            self.provider
                .expectation(name)
                .ok_or_else(|| RunnerError::MissingExpectation {
                    scenario: name.to_string(),
                    dialect: self.provider.dialect(),
                })?;

        let ctx = TestContext::new(name, mode, self.provider.dialect(), self.fixture.sink().clone());
        let run_name = ctx.run_name();

        let outcome = self
            .lifecycle
            .execute_test(ctx, |_| async {
                let result = self.invoke(scenario.as_ref(), mode).await;
                self.check(name, &run_name, &expectation, result)
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(LifecycleOutcome::Run(error)) => Err(error),
            Err(LifecycleOutcome::Setup(error)) => Err(RunnerError::Lifecycle {
                context: run_name,
                message: error.to_string(),
            }),
        }
    }

    /// Run one scenario in every configured mode, stopping at the first failure
    pub async fn run_all_modes(&self, name: &str) -> RunnerResult<()> {
        for mode in &self.config.modes {
            self.run(name, *mode).await?;
        }
        Ok(())
    }

    /// Run every scenario of the catalog in every mode, reporting all failures
    pub async fn run_catalog(&self) -> RunnerResult<()> {
        let mut failures = Vec::new();
        let mut total = 0;

        for scenario in self.catalog.iter() {
            for mode in &self.config.modes {
                total += 1;
                if let Err(error) = self.run(scenario.name(), *mode).await {
                    failures.push(format!("{} [{mode}]:\n{error}", scenario.name()));
                }
            }
        }

        tracing::info!(
            dialect = %self.provider.dialect(),
            total,
            failed = failures.len(),
            "Scenario catalog finished"
        );

        if failures.is_empty() {
            return Ok(());
        }
        Err(RunnerError::Summary {
            failed: failures.len(),
            total,
            report: failures.join("\n\n"),
        })
    }

    async fn invoke(&self, scenario: &dyn Scenario, mode: QueryMode) -> Result<Vec<Row>, QueryError> {
        self.fixture.sink().clear();
        let session = self.fixture.create_context();
        scenario.run(&session, mode).await
    }

    fn check(
        &self,
        name: &str,
        run_name: &str,
        expectation: &Expectation,
        result: Result<Vec<Row>, QueryError>,
    ) -> RunnerResult<()> {
        match expectation {
            Expectation::Statements(expected) => {
                if let Err(source) = result {
                    return Err(RunnerError::UnexpectedFailure {
                        context: run_name.to_string(),
                        source,
                    });
                }
                self.check_statements(name, run_name, expected)
            }
            Expectation::TranslationFailed { message_contains } => {
                assert_translation_failed(result, message_contains.as_deref())
                    .map(|_| ())
                    .map_err(|e| e.in_context(run_name))
            }
            Expectation::Fails {
                kind,
                message_contains,
            } => assert_failure(result, *kind, message_contains.as_deref())
                .map(|_| ())
                .map_err(|e| e.in_context(run_name)),
        }
    }

    fn check_statements(
        &self,
        name: &str,
        run_name: &str,
        expected: &[ExpectedStatement],
    ) -> RunnerResult<()> {
        let mut comparator = Comparator::new()
            .with_order(self.config.order)
            .for_test(run_name);
        if let Some(dir) = &self.config.baseline_output_dir {
            comparator = comparator.with_baseline_output(dir);
        }

        let actual = self.fixture.sink().rendered();
        let Err(source) = comparator.compare(&actual, expected) else {
            return Ok(());
        };

        if self.config.rewrite_baselines && source.is_mismatch() {
            match self.provider.rewrite(name, &actual) {
                Ok(true) => tracing::info!(scenario = name, "Baseline rewritten with captured SQL"),
                Ok(false) => tracing::warn!(
                    scenario = name,
                    "Baseline rewrite requested but expectations are not file-backed"
                ),
                Err(e) => tracing::warn!(scenario = name, "Baseline rewrite failed: {e}"),
            }
        }

        Err(RunnerError::Baseline {
            context: run_name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_baseline_fixture::FixtureError;

    #[test]
    fn test_assert_translation_failed() {
        let failed: Result<(), QueryError> = Err(QueryError::TranslationFailed(
            "The LINQ expression 'Where(c => c.IsLondon)' could not be translated.".into(),
        ));
        let message = assert_translation_failed(failed, Some("could not be translated")).unwrap();
        assert!(message.contains("IsLondon"));
    }

    #[test]
    fn test_assert_translation_failed_rejects_success() {
        let err = assert_translation_failed(Ok::<_, QueryError>(()), None).unwrap_err();
        assert!(matches!(err, RunnerError::UnexpectedSuccess { .. }));
    }

    #[test]
    fn test_assert_translation_failed_rejects_other_failures() {
        let store: Result<(), QueryError> =
            Err(QueryError::Store(FixtureError::Disposed { dataset: "northwind".into() }));
        assert!(matches!(
            assert_translation_failed(store, None),
            Err(RunnerError::WrongFailure { .. })
        ));

        let wrong_message: Result<(), QueryError> =
            Err(QueryError::TranslationFailed("unsupported method".into()));
        assert!(matches!(
            assert_translation_failed(wrong_message, Some("could not be translated")),
            Err(RunnerError::WrongFailure { .. })
        ));
    }

    #[test]
    fn test_assert_failure_by_kind() {
        let invalid: Result<(), QueryError> =
            Err(QueryError::InvalidOperation("Sequence contains no elements".into()));
        assert!(assert_failure(invalid, FailureKind::InvalidOperation, Some("no elements")).is_ok());
    }
}
