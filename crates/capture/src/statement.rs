// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Captured statement model
//!
//! A [`CapturedStatement`] is one command dispatched to the store: its SQL text
//! and the parameters bound to it, in declaration order. The baseline form of a
//! statement is the parameter preamble, a blank line, then the SQL:
//!
//! ```text
//! @__p_0='10'
//!
//! SELECT [c].[CustomerID] FROM [Customers] AS [c] ...
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value bound to a statement parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl ParameterValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParameterValue::Null)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Null => write!(f, "NULL"),
            ParameterValue::Bool(true) => write!(f, "'True'"),
            ParameterValue::Bool(false) => write!(f, "'False'"),
            ParameterValue::Int(v) => write!(f, "'{v}'"),
            ParameterValue::Float(v) => write!(f, "'{v}'"),
            ParameterValue::Text(v) => write!(f, "'{v}'"),
            ParameterValue::Bytes(bytes) => {
                write!(f, "'0x")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                write!(f, "'")
            }
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Int(i64::from(value))
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<Vec<u8>> for ParameterValue {
    fn from(value: Vec<u8>) -> Self {
        ParameterValue::Bytes(value)
    }
}

impl<T: Into<ParameterValue>> From<Option<T>> for ParameterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParameterValue::Null, Into::into)
    }
}

/// Inferred store-side facets of a parameter
///
/// Only facets that are set appear in the baseline preamble.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterFacets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_type: Option<String>,
}

/// A named parameter bound to a captured statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: ParameterValue,
    #[serde(default)]
    pub facets: ParameterFacets,
}

impl Parameter {
    /// Create a parameter; a leading `@` on the name is optional
    pub fn new(name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            facets: ParameterFacets::default(),
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.facets.nullable = Some(nullable);
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.facets.size = Some(size);
        self
    }

    pub fn with_precision(mut self, precision: u8) -> Self {
        self.facets.precision = Some(precision);
        self
    }

    pub fn with_scale(mut self, scale: u8) -> Self {
        self.facets.scale = Some(scale);
        self
    }

    pub fn with_db_type(mut self, db_type: impl Into<String>) -> Self {
        self.facets.db_type = Some(db_type.into());
        self
    }

    /// Name as it appears in SQL text, always carrying a placeholder sigil
    pub fn placeholder(&self) -> String {
        if self.name.starts_with(['@', ':', '$']) {
            self.name.clone()
        } else {
            format!("@{}", self.name)
        }
    }

    /// Render the preamble line for this parameter
    pub fn render(&self) -> String {
        let mut line = format!("{}={}", self.placeholder(), self.value);

        if let Some(nullable) = self.facets.nullable {
            line.push_str(if nullable {
                " (Nullable = true)"
            } else {
                " (Nullable = false)"
            });
        }
        if let Some(size) = self.facets.size {
            line.push_str(&format!(" (Size = {size})"));
        }
        if let Some(precision) = self.facets.precision {
            line.push_str(&format!(" (Precision = {precision})"));
        }
        if let Some(scale) = self.facets.scale {
            line.push_str(&format!(" (Scale = {scale})"));
        }
        if let Some(db_type) = &self.facets.db_type {
            line.push_str(&format!(" (DbType = {db_type})"));
        }

        line
    }
}

/// One statement dispatched to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedStatement {
    pub sql: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl CapturedStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Render the baseline text: parameter preamble, blank line, SQL
    pub fn render(&self) -> String {
        if self.parameters.is_empty() {
            return self.sql.clone();
        }

        let preamble: Vec<String> = self.parameters.iter().map(Parameter::render).collect();
        format!("{}\n\n{}", preamble.join("\n"), self.sql)
    }
}

impl fmt::Display for CapturedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
