// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Test Lifecycle Management
//!
//! Hooks around every scenario run. `after_test` always runs, including
//! after a failed run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use query_baseline_capture::{
    BufferedOutput, CaptureSink, OutputHelper, TracingOutput, workspace_log_dir,
};
use tracing::{info, warn};

use crate::dialect::Dialect;
use crate::scenario::QueryMode;

/// Test execution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    /// Before the scenario runs
    Setup,
    /// While the scenario runs and is checked
    Execution,
    /// After the run completed or failed
    Teardown,
}

/// Context passed to lifecycle hooks
#[derive(Debug, Clone)]
pub struct TestContext {
    pub scenario: String,
    pub mode: QueryMode,
    pub dialect: Dialect,
    pub phase: TestPhase,
    /// Sink of the fixture the scenario runs against
    pub sink: Arc<CaptureSink>,
    pub metadata: HashMap<String, String>,
}

impl TestContext {
    pub fn new(
        scenario: impl Into<String>,
        mode: QueryMode,
        dialect: Dialect,
        sink: Arc<CaptureSink>,
    ) -> Self {
        Self {
            scenario: scenario.into(),
            mode,
            dialect,
            phase: TestPhase::Setup,
            sink,
            metadata: HashMap::new(),
        }
    }

    /// `scenario [mode]`, used to tag reports
    pub fn run_name(&self) -> String {
        format!("{} [{}]", self.scenario, self.mode)
    }

    pub fn set_phase(&mut self, phase: TestPhase) {
        self.phase = phase;
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }
}

/// Lifecycle hooks around scenario runs
#[async_trait::async_trait]
pub trait TestLifecycle: Send + Sync {
    /// Called before the sink is cleared and the scenario runs
    async fn before_test(&self, ctx: &mut TestContext) -> Result<()>;

    /// Called after every run, successful or not
    async fn after_test(&self, ctx: &TestContext) -> Result<()>;

    /// Called when a run fails, before `after_test`
    async fn on_test_failure(&self, ctx: &TestContext, error: &anyhow::Error) -> Result<()> {
        warn!("Scenario {} failed: {}", ctx.run_name(), error);
        Ok(())
    }
}

/// Logs run boundaries and streams captured SQL to `query_baseline::sql`
pub struct DefaultTestLifecycle;

#[async_trait::async_trait]
impl TestLifecycle for DefaultTestLifecycle {
    async fn before_test(&self, ctx: &mut TestContext) -> Result<()> {
        info!(
            scenario = %ctx.scenario,
            mode = %ctx.mode,
            dialect = %ctx.dialect,
            "Running scenario"
        );
        ctx.add_metadata("start_time", chrono::Utc::now().to_rfc3339());
        ctx.sink
            .set_output_helper(Arc::new(TracingOutput::for_test(ctx.run_name())));
        Ok(())
    }

    async fn after_test(&self, ctx: &TestContext) -> Result<()> {
        ctx.sink.clear_output_helper();
        info!(
            scenario = %ctx.scenario,
            mode = %ctx.mode,
            statements = ctx.sink.len(),
            "Scenario finished"
        );
        Ok(())
    }
}

/// Buffers captured SQL per run and writes it to a log file only on failure
pub struct FailureLogLifecycle {
    log_dir: PathBuf,
    current: Mutex<Option<Arc<BufferedOutput>>>,
    written: Mutex<Vec<PathBuf>>,
}

impl FailureLogLifecycle {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            current: Mutex::new(None),
            written: Mutex::new(Vec::new()),
        }
    }

    /// Write failure logs under the workspace's `target/query-baseline-logs`
    pub fn in_workspace_target() -> Self {
        Self::new(workspace_log_dir())
    }

    pub fn log_dir(&self) -> &std::path::Path {
        &self.log_dir
    }

    /// Log files written so far
    pub fn written_logs(&self) -> Vec<PathBuf> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl TestLifecycle for FailureLogLifecycle {
    async fn before_test(&self, ctx: &mut TestContext) -> Result<()> {
        let output = Arc::new(BufferedOutput::new(&self.log_dir));
        ctx.sink.set_output_helper(output.clone());
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(output);
        Ok(())
    }

    async fn after_test(&self, ctx: &TestContext) -> Result<()> {
        ctx.sink.clear_output_helper();
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }

    async fn on_test_failure(&self, ctx: &TestContext, error: &anyhow::Error) -> Result<()> {
        let output = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(output) = output else {
            return Ok(());
        };

        output.write_line(&format!("{} failed: {error}", ctx.run_name()));
        let path = output.flush_to_file()?;
        warn!("Captured SQL for {} written to {:?}", ctx.run_name(), path);
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path);
        Ok(())
    }
}

impl Default for FailureLogLifecycle {
    fn default() -> Self {
        Self::in_workspace_target()
    }
}

/// Runs a closure between lifecycle hooks
pub struct LifecycleManager {
    lifecycle: Arc<dyn TestLifecycle>,
}

impl LifecycleManager {
    pub fn new() -> Self {
        Self {
            lifecycle: Arc::new(DefaultTestLifecycle),
        }
    }

    pub fn with_lifecycle<L: TestLifecycle + 'static>(lifecycle: L) -> Self {
        Self {
            lifecycle: Arc::new(lifecycle),
        }
    }

    pub fn from_arc(lifecycle: Arc<dyn TestLifecycle>) -> Self {
        Self { lifecycle }
    }

    /// Execute `test_fn` with lifecycle hooks
    ///
    /// Setup failures abort the run. Failure and teardown hook errors are
    /// logged and do not replace the run's own result.
    pub async fn execute_test<F, Fut, T, E>(
        &self,
        mut ctx: TestContext,
        test_fn: F,
    ) -> std::result::Result<T, LifecycleOutcome<E>>
    where
        F: FnOnce(TestContext) -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        ctx.set_phase(TestPhase::Setup);
        if let Err(e) = self.lifecycle.before_test(&mut ctx).await {
            warn!("Setup of {} failed: {e}", ctx.run_name());
            return Err(LifecycleOutcome::Setup(e));
        }

        ctx.set_phase(TestPhase::Execution);
        let result = test_fn(ctx.clone()).await;

        if let Err(ref e) = result {
            let error = anyhow::anyhow!("{e}");
            if let Err(hook_err) = self.lifecycle.on_test_failure(&ctx, &error).await {
                warn!("Failure hook of {} failed: {hook_err}", ctx.run_name());
            }
        }

        ctx.set_phase(TestPhase::Teardown);
        if let Err(e) = self.lifecycle.after_test(&ctx).await {
            warn!("Teardown of {} failed: {e}", ctx.run_name());
        }

        result.map_err(LifecycleOutcome::Run)
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a run executed under [`LifecycleManager`] failed
#[derive(Debug)]
pub enum LifecycleOutcome<E> {
    /// `before_test` failed; the run did not start
    Setup(anyhow::Error),
    /// The run itself failed
    Run(E),
}
