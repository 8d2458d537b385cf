// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log records and read-side projections
//!
//! Field names on the wire are case-sensitive (`Timestamp`, `Filename`,
//! `Function`, `Line`, `Level`, `Message`) and must match exactly for
//! documents written by other producers to decode.

use crate::query::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Severity of a log record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    /// A level name this crate does not know; kept verbatim
    Other(String),
}

impl Level {
    pub fn as_str(&self) -> &str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Other(s) => s,
        }
    }
}

impl From<String> for Level {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" | "warning" => Level::Warn,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            _ => Level::Other(s),
        }
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Level::from(s.to_string())
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        match level {
            Level::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub filename: String,
    pub function: String,
    pub line: u32,
    pub level: Level,
    pub message: String,
}

impl LogLine {
    pub const TIMESTAMP_FIELD: &'static str = "Timestamp";
    pub const MESSAGE_FIELD: &'static str = "Message";

    /// Create a record stamped now, attributed to the caller's source location
    #[track_caller]
    pub fn new(level: impl Into<Level>, message: impl Into<String>) -> Self {
        let caller = Location::caller();
        Self {
            timestamp: Utc::now(),
            filename: caller.file().to_string(),
            function: String::new(),
            line: caller.line(),
            level: level.into(),
            message: message.into(),
        }
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the source attribution
    pub fn from_source(
        mut self,
        filename: impl Into<String>,
        function: impl Into<String>,
        line: u32,
    ) -> Self {
        self.filename = filename.into();
        self.function = function.into();
        self.line = line;
        self
    }

    /// Set the function name, keeping file and line
    pub fn in_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    pub fn to_document(&self) -> Result<Document, serde_json::Error> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(serde::ser::Error::custom(format!(
                "log line serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Decode a stored document; extra fields such as `_id` are ignored
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(doc))
    }
}

/// One row of a grouped count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupCount {
    /// Label value; `None` for documents that lack the label field
    pub name: Option<String>,
    pub count: u64,
}

impl GroupCount {
    pub fn from_document(doc: Document) -> Result<Self, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(doc))
    }
}

#[cfg(test)]
#[path = "line_tests.rs"]
mod tests;
