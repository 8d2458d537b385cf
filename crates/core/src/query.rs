// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed queries understood by document store backends

use serde_json::Value;
use std::fmt;

/// A stored document
pub type Document = serde_json::Map<String, Value>;

/// Database + collection pair addressed by a store call
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Document predicate
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// Every document
    #[default]
    All,
    /// Field equals value
    Eq { field: String, value: Value },
    /// Field strictly greater than value
    ///
    /// RFC 3339 strings compare as instants, numbers numerically,
    /// other strings lexicographically.
    After { field: String, value: Value },
    /// Field is a string matching a case-insensitive regex
    Matches { field: String, pattern: String },
    /// All sub-filters hold
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn after(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::After {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::Matches {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Conjunction that drops `All` terms and collapses single-element lists
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut terms: Vec<Filter> = filters
            .into_iter()
            .filter(|f| !matches!(f, Filter::All))
            .collect();
        match terms.len() {
            0 => Filter::All,
            1 => terms.remove(0),
            _ => Filter::And(terms),
        }
    }
}

/// Sort key for find
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Sort {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// Sort and limit applied to a find
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Grouped count aggregation
///
/// Produces one `{ "Name": <key value>, "Count": n }` document per distinct
/// value of `key` among documents matching `filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    pub filter: Filter,
    pub key: String,
}

impl GroupBy {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            filter: Filter::All,
            key: key.into(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
