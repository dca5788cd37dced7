// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL dialects that own a set of baselines

use std::fmt;

use query_baseline_fixture::StoreConfig;
use thiserror::Error;

/// Target dialect of a translator and its baselines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    SqlServer,
    Sqlite,
    PostgreSQL,
    MySQL,
}

#[derive(Debug, Error)]
#[error("Invalid dialect value: {0}")]
pub struct InvalidDialect(pub String);

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::SqlServer,
        Dialect::Sqlite,
        Dialect::PostgreSQL,
        Dialect::MySQL,
    ];

    /// Store used when no connection is configured for this dialect
    ///
    /// SQL Server baselines are checked without a live server.
    pub fn default_store(&self) -> StoreConfig {
        match self {
            Dialect::Sqlite => StoreConfig::in_memory(),
            Dialect::SqlServer | Dialect::PostgreSQL | Dialect::MySQL => StoreConfig::record_only(),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::SqlServer => write!(f, "sqlserver"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::PostgreSQL => write!(f, "postgresql"),
            Dialect::MySQL => write!(f, "mysql"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = InvalidDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            "sqlite" => Ok(Dialect::Sqlite),
            "postgresql" | "postgres" => Ok(Dialect::PostgreSQL),
            "mysql" => Ok(Dialect::MySQL),
            _ => Err(InvalidDialect(s.to_string())),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Dialect {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for Dialect {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
