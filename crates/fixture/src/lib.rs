// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Fixtures for query-baseline
//!
//! Provisions a backing store from a deterministic [`Dataset`] and hands out
//! [`Session`]s that record every dispatched command into the fixture's
//! [`CaptureSink`](query_baseline_capture::CaptureSink).
//!
//! ```rust,ignore
//! let fixture = Fixture::provision(&dataset, &StoreConfig::in_memory()).await?;
//! let session = fixture.create_context();
//! session.query(Command::new("SELECT 1")).await?;
//! assert_eq!(fixture.sink().len(), 1);
//! fixture.dispose().await;
//! ```

pub mod dataset;
pub mod error;
pub mod fixture;
pub mod session;
pub mod store;

pub use dataset::{Dataset, DatasetManifest, split_statements};
pub use error::{FixtureError, FixtureResult, ProvisionStep};
pub use fixture::{Fixture, SharedFixture};
pub use session::{Command, Row, Session};
pub use store::{RecordOnlyStore, SqlxStore, Store, StoreAdapter, StoreConfig, StoreTarget};
