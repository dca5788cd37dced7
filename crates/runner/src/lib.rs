// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scenario driver for query-baseline
//!
//! Shared scenarios are registered once in a [`ScenarioCatalog`]; each dialect
//! supplies its expected SQL through an [`ExpectedSqlProvider`], either in code
//! ([`InMemoryBaselines`]) or as a YAML [`BaselineSuite`]. A [`ScenarioRunner`]
//! runs every scenario in sync and async mode against a provisioned fixture and
//! compares the captured statements with the expectation.
//!
//! ```rust,ignore
//! let fixture = Fixture::provision(&northwind(), &Dialect::SqlServer.default_store()).await?;
//! let suite = BaselineSuite::from_file("baselines/sqlserver/northwind.yaml")?;
//! check_all_scenarios_covered(&catalog, &suite)?;
//!
//! let runner = ScenarioRunner::new(&fixture, &catalog, &suite, HarnessConfig::from_env()?);
//! runner.run_catalog().await?;
//! ```

pub mod config;
pub mod coverage;
pub mod dialect;
pub mod error;
pub mod expectation;
pub mod lifecycle;
pub mod logging;
pub mod runner;
pub mod scenario;
pub mod suite;

pub use config::HarnessConfig;
pub use coverage::check_all_scenarios_covered;
pub use dialect::{Dialect, InvalidDialect};
pub use error::{RunnerError, RunnerResult};
pub use expectation::{Expectation, ExpectedSqlProvider, InMemoryBaselines};
pub use lifecycle::{
    DefaultTestLifecycle, FailureLogLifecycle, LifecycleManager, LifecycleOutcome, TestContext,
    TestLifecycle, TestPhase,
};
pub use runner::{ScenarioRunner, assert_failure, assert_translation_failed};
pub use scenario::{FailureKind, QueryError, QueryMode, Scenario, ScenarioCatalog};
pub use suite::{BaselineSuite, ScenarioBaseline, SuiteDocument, SuiteError, SuiteProblem};
