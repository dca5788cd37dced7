// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Store adapters
//!
//! The backing store a fixture provisions and sessions dispatch to.
//!
//! - [`SqlxStore`]: a `sqlx` [`AnyPool`] for any default driver URL
//!   (`sqlite:`, `postgres:`, `mysql:`), including isolated in-memory and
//!   temporary-file SQLite databases.
//! - [`RecordOnlyStore`]: accepts every statement and returns no rows, for
//!   dialects whose store is not reachable from the test run.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use query_baseline_capture::{Parameter, ParameterValue};
use serde::{Deserialize, Serialize};
use sqlx::any::{AnyArguments, AnyPoolOptions, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyPool, Column as _, Row as _};
use tempfile::TempDir;

use crate::error::{FixtureError, FixtureResult};
use crate::session::{Command, Row};

const DEFAULT_POOL_SIZE: u32 = 4;

/// Where a fixture's store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreTarget {
    /// Private in-memory SQLite database
    InMemory,
    /// SQLite file inside a temporary directory removed with the store
    TempFile,
    /// Any URL understood by sqlx's default drivers
    Url { url: String },
    /// No store; statements are recorded and answered with empty results
    RecordOnly,
}

/// Store connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub target: StoreTarget,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            target: StoreTarget::InMemory,
            pool_size: 1,
        }
    }

    pub fn temp_file() -> Self {
        Self {
            target: StoreTarget::TempFile,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self {
            target: StoreTarget::Url { url: url.into() },
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    pub fn record_only() -> Self {
        Self {
            target: StoreTarget::RecordOnly,
            pool_size: 0,
        }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Backing store operations
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Human-readable location of the store
    fn description(&self) -> &str;

    /// Run a statement without parameters, returning rows affected
    async fn execute_raw(&self, sql: &str) -> Result<u64, sqlx::Error>;

    /// Run a command, returning rows affected
    async fn execute(&self, command: &Command) -> Result<u64, sqlx::Error>;

    /// Run a command and materialize its rows
    async fn fetch_all(&self, command: &Command) -> Result<Vec<Row>, sqlx::Error>;

    /// Release the store; later calls fail
    async fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Store backed by a sqlx `Any` pool
pub struct SqlxStore {
    url: String,
    pool: AnyPool,
    placeholders: PlaceholderStyle,
    // Dropped after the pool so the file outlives every connection
    _temp_dir: Option<TempDir>,
}

impl SqlxStore {
    /// Connect to `url` and verify that one connection can be acquired
    pub async fn connect(url: &str, pool_size: u32) -> FixtureResult<Self> {
        Self::connect_with(url, pool_size, None).await
    }

    async fn connect_with(
        url: &str,
        pool_size: u32,
        temp_dir: Option<TempDir>,
    ) -> FixtureResult<Self> {
        sqlx::any::install_default_drivers();

        let connection_error = |source| FixtureError::Connection {
            url: url.to_string(),
            source,
        };

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut options = AnyPoolOptions::new().max_connections(pool_size.max(1));
        if in_memory {
            // Each SQLite in-memory connection is its own database; keep exactly one alive
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.idle_timeout(Duration::from_secs(300));
        }

        let pool = options.connect(url).await.map_err(connection_error)?;
        drop(pool.acquire().await.map_err(connection_error)?);

        tracing::info!(url, "Store connection pool ready");
        Ok(Self {
            url: url.to_string(),
            pool,
            placeholders: PlaceholderStyle::for_url(url),
            _temp_dir: temp_dir,
        })
    }

    /// Open a private in-memory SQLite database
    pub async fn in_memory() -> FixtureResult<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Create a SQLite database file in a fresh temporary directory
    pub async fn temp_file(pool_size: u32) -> FixtureResult<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix("query-baseline-")
            .tempdir()
            .map_err(|source| FixtureError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let path = temp_dir.path().join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect_with(&url, pool_size, Some(temp_dir)).await
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

/// How a driver spells bind parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderStyle {
    /// `?1`, `$1`: each parameter bound once, in declaration order
    Numbered(char),
    /// `?`: one binding per occurrence
    Positional,
}

impl PlaceholderStyle {
    fn for_url(url: &str) -> Self {
        if url.starts_with("postgres") {
            Self::Numbered('$')
        } else if url.starts_with("mysql") || url.starts_with("mariadb") {
            Self::Positional
        } else {
            Self::Numbered('?')
        }
    }
}

/// Rewrite named placeholders (`@name`, `:name`, `$name`) into the driver's form
///
/// Returns the SQL to dispatch and the index of the parameter bound at each
/// position. Quoted literals, bracketed identifiers and comments are left alone. The
/// captured SQL is never rewritten; this only affects what reaches the driver.
fn bind_plan(sql: &str, parameters: &[Parameter], style: PlaceholderStyle) -> (String, Vec<usize>) {
    if parameters.is_empty() {
        return (sql.to_string(), Vec::new());
    }

    let placeholders: Vec<String> = parameters.iter().map(Parameter::placeholder).collect();
    let mut out = String::with_capacity(sql.len());
    let mut order = Vec::new();
    let mut closing: Option<char> = None;
    let mut rest = sql;

    while let Some(c) = rest.chars().next() {
        if let Some(close) = closing {
            if c == close {
                closing = None;
            }
        } else if rest.starts_with("--") || rest.starts_with("/*") {
            let end = if rest.starts_with("--") {
                rest.find('\n').unwrap_or(rest.len())
            } else {
                rest[2..].find("*/").map_or(rest.len(), |i| i + 4)
            };
            out.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        } else {
            match c {
                '\'' | '"' | '`' => closing = Some(c),
                '[' => closing = Some(']'),
                '@' | ':' | '$' => {
                    let name_len = rest[1..]
                        .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                        .unwrap_or(rest.len() - 1);
                    let token = &rest[..=name_len];
                    if let Some(index) = placeholders.iter().position(|p| p == token) {
                        match style {
                            PlaceholderStyle::Numbered(sigil) => {
                                out.push(sigil);
                                out.push_str(&(index + 1).to_string());
                            }
                            PlaceholderStyle::Positional => {
                                out.push('?');
                                order.push(index);
                            }
                        }
                        rest = &rest[token.len()..];
                        continue;
                    }
                }
                _ => {}
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    if let PlaceholderStyle::Numbered(_) = style {
        order = (0..parameters.len()).collect();
    }
    (out, order)
}

fn bind_parameters<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    parameters: &[Parameter],
    order: &[usize],
) -> Query<'q, Any, AnyArguments<'q>> {
    for parameter in order.iter().filter_map(|&index| parameters.get(index)) {
        query = match &parameter.value {
            ParameterValue::Null => query.bind(None::<String>),
            ParameterValue::Bool(value) => query.bind(*value),
            ParameterValue::Int(value) => query.bind(*value),
            ParameterValue::Float(value) => query.bind(*value),
            ParameterValue::Text(value) => query.bind(value.clone()),
            ParameterValue::Bytes(value) => query.bind(value.clone()),
        };
    }
    query
}

fn decode_row(row: &AnyRow) -> Row {
    let columns = row
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();
    let values = (0..row.len()).map(|index| decode_value(row, index)).collect();
    Row { columns, values }
}

fn decode_value(row: &AnyRow, index: usize) -> serde_json::Value {
    use serde_json::Value;

    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map_or(Value::Null, Value::from);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value
            .and_then(serde_json::Number::from_f64)
            .map_or(Value::Null, Value::Number);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map_or(Value::Null, Value::String);
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map_or(Value::Null, Value::Bool);
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return value.map_or(Value::Null, |bytes| {
            Value::String(ParameterValue::Bytes(bytes).to_string().trim_matches('\'').to_string())
        });
    }
    Value::Null
}

#[async_trait]
impl StoreAdapter for SqlxStore {
    fn description(&self) -> &str {
        &self.url
    }

    async fn execute_raw(&self, sql: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn execute(&self, command: &Command) -> Result<u64, sqlx::Error> {
        let (sql, order) = bind_plan(command.sql(), command.parameters(), self.placeholders);
        let query = bind_parameters(sqlx::query(&sql), command.parameters(), &order);
        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, command: &Command) -> Result<Vec<Row>, sqlx::Error> {
        let (sql, order) = bind_plan(command.sql(), command.parameters(), self.placeholders);
        let query = bind_parameters(sqlx::query(&sql), command.parameters(), &order);
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(decode_row).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!(url = %self.url, "Store connection pool closed");
    }

    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

/// Store that executes nothing
#[derive(Debug, Default)]
pub struct RecordOnlyStore {
    closed: AtomicBool,
}

impl RecordOnlyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreAdapter for RecordOnlyStore {
    fn description(&self) -> &str {
        "record-only"
    }

    async fn execute_raw(&self, _sql: &str) -> Result<u64, sqlx::Error> {
        Ok(0)
    }

    async fn execute(&self, _command: &Command) -> Result<u64, sqlx::Error> {
        Ok(0)
    }

    async fn fetch_all(&self, _command: &Command) -> Result<Vec<Row>, sqlx::Error> {
        Ok(Vec::new())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Shared handle to a fixture's store
#[derive(Clone)]
pub struct Store {
    dataset: Arc<str>,
    adapter: Arc<dyn StoreAdapter>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("dataset", &self.dataset)
            .field("store", &self.adapter.description())
            .field("closed", &self.adapter.is_closed())
            .finish()
    }
}

impl Store {
    /// Open the store described by `config` for `dataset`
    pub async fn connect(dataset: &str, config: &StoreConfig) -> FixtureResult<Self> {
        let adapter: Arc<dyn StoreAdapter> = match &config.target {
            StoreTarget::InMemory => Arc::new(SqlxStore::in_memory().await?),
            StoreTarget::TempFile => Arc::new(SqlxStore::temp_file(config.pool_size).await?),
            StoreTarget::Url { url } => Arc::new(SqlxStore::connect(url, config.pool_size).await?),
            StoreTarget::RecordOnly => Arc::new(RecordOnlyStore::new()),
        };
        Ok(Self::from_adapter(dataset, adapter))
    }

    /// Wrap a custom adapter
    pub fn from_adapter(dataset: &str, adapter: Arc<dyn StoreAdapter>) -> Self {
        Self {
            dataset: Arc::from(dataset),
            adapter,
        }
    }

    pub fn description(&self) -> &str {
        self.adapter.description()
    }

    pub fn is_closed(&self) -> bool {
        self.adapter.is_closed()
    }

    /// Fail with [`FixtureError::Disposed`] once the store is closed
    pub fn ensure_open(&self) -> FixtureResult<()> {
        if self.adapter.is_closed() {
            return Err(FixtureError::Disposed {
                dataset: self.dataset.to_string(),
            });
        }
        Ok(())
    }

    fn query_error(&self, sql: &str, source: sqlx::Error) -> FixtureError {
        match source {
            sqlx::Error::PoolClosed => FixtureError::Disposed {
                dataset: self.dataset.to_string(),
            },
            source => FixtureError::Query {
                sql: sql.to_string(),
                source,
            },
        }
    }

    pub(crate) async fn execute_raw_unchecked(&self, sql: &str) -> Result<u64, sqlx::Error> {
        self.adapter.execute_raw(sql).await
    }

    /// Run a statement without recording it
    pub async fn execute_raw(&self, sql: &str) -> FixtureResult<u64> {
        self.ensure_open()?;
        self.adapter
            .execute_raw(sql)
            .await
            .map_err(|e| self.query_error(sql, e))
    }

    pub async fn execute(&self, command: &Command) -> FixtureResult<u64> {
        self.ensure_open()?;
        self.adapter
            .execute(command)
            .await
            .map_err(|e| self.query_error(command.sql(), e))
    }

    pub async fn fetch_all(&self, command: &Command) -> FixtureResult<Vec<Row>> {
        self.ensure_open()?;
        self.adapter
            .fetch_all(command)
            .await
            .map_err(|e| self.query_error(command.sql(), e))
    }

    pub async fn close(&self) {
        if !self.adapter.is_closed() {
            self.adapter.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_only_store_returns_nothing() {
        let store = Store::connect("empty", &StoreConfig::record_only()).await.unwrap();
        assert_eq!(store.description(), "record-only");
        assert!(store.fetch_all(&Command::new("SELECT 1")).await.unwrap().is_empty());
        assert_eq!(store.execute(&Command::new("DELETE FROM t")).await.unwrap(), 0);

        store.close().await;
        assert!(matches!(
            store.fetch_all(&Command::new("SELECT 1")).await,
            Err(FixtureError::Disposed { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_memory_store_round_trip() {
        let store = Store::connect("memory", &StoreConfig::in_memory()).await.unwrap();
        store
            .execute_raw("CREATE TABLE [Items] ([Id] INTEGER PRIMARY KEY, [Name] TEXT, [Price] REAL)")
            .await
            .unwrap();
        let inserted = store
            .execute(
                &Command::new("INSERT INTO [Items] ([Id], [Name], [Price]) VALUES (@id, @name, @price)")
                    .param("id", 1)
                    .param("name", "Chai")
                    .param("price", 18.5),
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = store
            .fetch_all(&Command::new("SELECT [Id], [Name], [Price] FROM [Items] WHERE [Id] = @id").param("id", 1))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some(&serde_json::json!("Chai")));
        assert_eq!(rows[0].get("Id"), Some(&serde_json::json!(1)));
        assert_eq!(rows[0].get("Price"), Some(&serde_json::json!(18.5)));
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_isolated() {
        let first = Store::connect("a", &StoreConfig::in_memory()).await.unwrap();
        let second = Store::connect("b", &StoreConfig::in_memory()).await.unwrap();
        first.execute_raw("CREATE TABLE t (x INTEGER)").await.unwrap();

        let result = second.fetch_all(&Command::new("SELECT x FROM t")).await;
        assert!(matches!(result, Err(FixtureError::Query { .. })));
    }

    #[tokio::test]
    async fn test_query_error_keeps_sql() {
        let store = Store::connect("memory", &StoreConfig::in_memory()).await.unwrap();
        let err = store
            .fetch_all(&Command::new("SELECT * FROM [Missing]"))
            .await
            .unwrap_err();
        match err {
            FixtureError::Query { sql, .. } => assert_eq!(sql, "SELECT * FROM [Missing]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bind_plan_numbers_named_placeholders() {
        let parameters = [
            Parameter::new("__p_0", 10),
            Parameter::new("__p_01", 2),
        ];
        let (sql, order) = bind_plan(
            "SELECT '@__p_0', [@__p_0] FROM t WHERE a = @__p_01 AND b = @__p_0",
            &parameters,
            PlaceholderStyle::Numbered('?'),
        );
        assert_eq!(sql, "SELECT '@__p_0', [@__p_0] FROM t WHERE a = ?2 AND b = ?1");
        assert_eq!(order, vec![0, 1]);
    }

    #[test]
    fn test_bind_plan_skips_comments() {
        let parameters = [Parameter::new("city", "London"), Parameter::new("id", 3)];
        let (sql, _) = bind_plan(
            "-- don't inline @city\nSELECT * FROM c /* it's @id */ WHERE a = @city AND b = @id",
            &parameters,
            PlaceholderStyle::Numbered('?'),
        );
        assert_eq!(
            sql,
            "-- don't inline @city\nSELECT * FROM c /* it's @id */ WHERE a = ?1 AND b = ?2"
        );
    }

    #[test]
    fn test_bind_plan_positional_repeats_bindings() {
        let parameters = [Parameter::new("city", "London")];
        let (sql, order) = bind_plan(
            "SELECT * FROM c WHERE a = @city OR b = @city",
            &parameters,
            PlaceholderStyle::for_url("mysql://localhost/db"),
        );
        assert_eq!(sql, "SELECT * FROM c WHERE a = ? OR b = ?");
        assert_eq!(order, vec![0, 0]);
        assert_eq!(PlaceholderStyle::for_url("postgres://x"), PlaceholderStyle::Numbered('$'));
    }

    #[test]
    fn test_store_config_from_yaml() {
        let config: StoreConfig =
            serde_yaml::from_str("target:\n  kind: url\n  url: \"sqlite::memory:\"\n").unwrap();
        assert_eq!(config.target, StoreTarget::Url { url: "sqlite::memory:".into() });
        assert_eq!(config.pool_size, DEFAULT_POOL_SIZE);

        // A plain scalar ending in ':' opens a nested mapping and is rejected
        let unquoted = serde_yaml::from_str::<StoreConfig>("target:\n  kind: url\n  url: sqlite::memory:\n");
        assert!(unquoted.is_err());
    }
}
