// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Fixtures
//!
//! A [`Fixture`] owns one provisioned store and one capture sink. Provisioning
//! runs the dataset's schema, seed and function statements exactly once and
//! fails fast: a fixture whose dataset did not fully load is never handed out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use query_baseline_capture::CaptureSink;
use tokio::sync::OnceCell;

use crate::dataset::Dataset;
use crate::error::{FixtureError, FixtureResult, ProvisionStep};
use crate::session::Session;
use crate::store::{Store, StoreConfig};

const PROVISION_STEPS: [ProvisionStep; 3] = [
    ProvisionStep::Schema,
    ProvisionStep::Seed,
    ProvisionStep::Functions,
];

/// A provisioned store plus its capture sink
#[derive(Debug)]
pub struct Fixture {
    dataset: String,
    teardown: Vec<String>,
    store: Store,
    sink: Arc<CaptureSink>,
    disposed: AtomicBool,
}

impl Fixture {
    /// Connect a store and load `dataset` into it
    pub async fn provision(dataset: &Dataset, config: &StoreConfig) -> FixtureResult<Self> {
        tracing::info!(
            dataset = dataset.name(),
            statements = dataset.provisioning_len(),
            "Provisioning fixture"
        );

        let store = Store::connect(dataset.name(), config).await?;

        for step in PROVISION_STEPS {
            for statement in dataset.statements(step) {
                if let Err(source) = store.execute_raw_unchecked(statement).await {
                    store.close().await;
                    tracing::error!(dataset = dataset.name(), %step, "Provisioning failed: {source}");
                    return Err(FixtureError::Provisioning {
                        dataset: dataset.name().to_string(),
                        step,
                        statement: statement.clone(),
                        source,
                    });
                }
            }
        }

        let sink = CaptureSink::shared();
        tracing::info!(dataset = dataset.name(), store = store.description(), "Fixture ready");
        Ok(Self {
            dataset: dataset.name().to_string(),
            teardown: dataset.statements(ProvisionStep::Teardown).to_vec(),
            store,
            sink,
            disposed: AtomicBool::new(false),
        })
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// A new session bound to the store and sharing this fixture's sink
    pub fn create_context(&self) -> Session {
        Session::new(self.store.clone(), self.sink.clone())
    }

    /// The fixture's capture sink
    pub fn sink(&self) -> &Arc<CaptureSink> {
        &self.sink
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run a DDL statement without recording it
    pub async fn execute_raw_ddl(&self, statement: &str) -> FixtureResult<()> {
        self.store.execute_raw(statement).await?;
        tracing::debug!(dataset = %self.dataset, "Raw DDL executed");
        Ok(())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Run teardown statements and release the store
    ///
    /// Teardown failures are logged and skipped. Calling this twice is a no-op.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        for statement in &self.teardown {
            if let Err(e) = self.store.execute_raw(statement).await {
                tracing::warn!(dataset = %self.dataset, "Teardown statement failed: {e}");
            }
        }

        self.store.close().await;
        self.sink.clear_output_helper();
        tracing::info!(dataset = %self.dataset, "Fixture disposed");
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        if self.is_disposed() {
            return;
        }
        tracing::debug!(dataset = %self.dataset, "Fixture dropped without dispose, releasing store");

        // Sessions may still hold the store; close it so they observe the disposal
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let store = self.store.clone();
            handle.spawn(async move { store.close().await });
        }
    }
}

/// Lazily provisioned fixture shared by a test collection
///
/// The first provisioning outcome is kept: after a failure every later
/// [`SharedFixture::get`] returns the cached error without touching a store.
#[derive(Debug)]
pub struct SharedFixture {
    dataset: Dataset,
    config: StoreConfig,
    cell: OnceCell<Result<Fixture, Arc<FixtureError>>>,
}

impl SharedFixture {
    pub fn new(dataset: Dataset, config: StoreConfig) -> Self {
        Self {
            dataset,
            config,
            cell: OnceCell::new(),
        }
    }

    /// Provision on first use; concurrent first callers share one provisioning
    pub async fn get(&self) -> FixtureResult<&Fixture> {
        let outcome = self
            .cell
            .get_or_init(|| async {
                Fixture::provision(&self.dataset, &self.config)
                    .await
                    .map_err(Arc::new)
            })
            .await;

        outcome
            .as_ref()
            .map_err(|source| FixtureError::SharedProvisioning {
                dataset: self.dataset.name().to_string(),
                source: Arc::clone(source),
            })
    }

    pub fn is_provisioned(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// Whether provisioning was attempted and failed
    pub fn has_failed(&self) -> bool {
        matches!(self.cell.get(), Some(Err(_)))
    }

    /// Dispose the fixture if it was provisioned
    pub async fn dispose(&self) {
        if let Some(Ok(fixture)) = self.cell.get() {
            fixture.dispose().await;
        }
    }
}
