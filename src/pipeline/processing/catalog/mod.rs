//! The persisted catalog and the logic that reconciles it with a fresh scrape.

pub mod idempotency;
pub mod merger;
pub mod query;

pub use merger::{CatalogMerger, MergeResult, MergeStats};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::common::types::Record;

/// Ordered records with unique links.
///
/// Building a catalog from a list that repeats a link keeps the last
/// occurrence of that link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Record>", into = "Vec<Record>")]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let (records, _) = keep_last_per_link(records);
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, link: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.link == link)
    }
}

impl From<Vec<Record>> for Catalog {
    fn from(records: Vec<Record>) -> Self {
        Self::from_records(records)
    }
}

impl From<Catalog> for Vec<Record> {
    fn from(catalog: Catalog) -> Self {
        catalog.records
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Drops every record whose link appears again later in the list.
/// Returns the survivors in their original relative order and the number dropped.
pub(crate) fn keep_last_per_link(records: Vec<Record>) -> (Vec<Record>, usize) {
    let last_index: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(index, record)| (record.link.clone(), index))
        .collect();

    let total = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .enumerate()
        .filter(|(index, record)| last_index.get(&record.link) == Some(index))
        .map(|(_, record)| record)
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// The JSON document shared by the catalog store and the public copy:
/// `{ "lastUpdated": ..., "count": ..., "webinars": [...] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub webinars: Catalog,
}

impl CatalogDocument {
    pub fn new(webinars: Catalog, last_updated: DateTime<Utc>) -> Self {
        Self {
            last_updated: Some(last_updated),
            count: webinars.len(),
            webinars,
        }
    }
}
