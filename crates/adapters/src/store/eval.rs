// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process evaluation of typed queries
//!
//! Shared by backends that hold documents locally.

use super::StoreError;
use chrono::{DateTime, Utc};
use lodge_core::{Document, Filter, FindOptions, GroupBy};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A filter with its regexes compiled
#[derive(Debug)]
pub enum Predicate {
    All,
    Eq(String, Value),
    After(String, Value),
    Matches(String, Regex),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn compile(filter: &Filter) -> Result<Self, StoreError> {
        Ok(match filter {
            Filter::All => Predicate::All,
            Filter::Eq { field, value } => Predicate::Eq(field.clone(), value.clone()),
            Filter::After { field, value } => Predicate::After(field.clone(), value.clone()),
            Filter::Matches { field, pattern } => {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| StoreError::InvalidQuery(e.to_string()))?;
                Predicate::Matches(field.clone(), regex)
            }
            Filter::And(filters) => Predicate::And(
                filters
                    .iter()
                    .map(Predicate::compile)
                    .collect::<Result<_, _>>()?,
            ),
        })
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Eq(field, value) => doc.get(field).is_some_and(|v| v == value),
            Predicate::After(field, bound) => doc
                .get(field)
                .and_then(|v| compare(v, bound))
                .is_some_and(|o| o == Ordering::Greater),
            Predicate::Matches(field, regex) => doc
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| regex.is_match(s)),
            Predicate::And(preds) => preds.iter().all(|p| p.matches(doc)),
        }
    }
}

/// Order two values of the same kind
///
/// RFC 3339 strings compare as instants, numbers numerically, other strings
/// lexicographically. Mixed kinds are unordered.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            match (parse_instant(a), parse_instant(b)) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => Some(a.cmp(b)),
            }
        }
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Missing fields sort first
fn sort_cmp(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

/// Give each document an `_id` if it lacks a string one
///
/// Returns the ids in document order alongside the stamped documents.
pub fn assign_ids(docs: Vec<Document>) -> (Vec<String>, Vec<Document>) {
    let mut ids = Vec::with_capacity(docs.len());
    let mut stamped = Vec::with_capacity(docs.len());
    for mut doc in docs {
        let id = match doc.get("_id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                doc.insert("_id".to_string(), Value::String(id.clone()));
                id
            }
        };
        ids.push(id);
        stamped.push(doc);
    }
    (ids, stamped)
}

/// Filter, sort and limit a set of documents
pub fn find<'a>(
    docs: impl IntoIterator<Item = &'a Document>,
    filter: &Filter,
    options: &FindOptions,
) -> Result<Vec<Document>, StoreError> {
    let predicate = Predicate::compile(filter)?;
    let mut out: Vec<Document> = docs
        .into_iter()
        .filter(|d| predicate.matches(d))
        .cloned()
        .collect();

    if let Some(sort) = &options.sort {
        out.sort_by(|a, b| {
            let ord = sort_cmp(a.get(&sort.field), b.get(&sort.field));
            if sort.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
    if let Some(limit) = options.limit {
        out.truncate(limit);
    }
    Ok(out)
}

pub fn count<'a>(
    docs: impl IntoIterator<Item = &'a Document>,
    filter: &Filter,
) -> Result<u64, StoreError> {
    let predicate = Predicate::compile(filter)?;
    Ok(docs.into_iter().filter(|d| predicate.matches(d)).count() as u64)
}

/// Grouped count, ordered by the key's JSON rendering
pub fn group<'a>(
    docs: impl IntoIterator<Item = &'a Document>,
    group: &GroupBy,
) -> Result<Vec<Document>, StoreError> {
    let predicate = Predicate::compile(&group.filter)?;
    let mut groups: BTreeMap<String, (Value, u64)> = BTreeMap::new();

    for doc in docs.into_iter().filter(|d| predicate.matches(d)) {
        let key = doc.get(&group.key).cloned().unwrap_or(Value::Null);
        let entry = groups.entry(key.to_string()).or_insert((key, 0));
        entry.1 += 1;
    }

    Ok(groups
        .into_values()
        .map(|(name, count)| {
            let mut doc = Map::new();
            doc.insert("Name".to_string(), name);
            doc.insert("Count".to_string(), Value::from(count));
            doc
        })
        .collect())
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod tests;
