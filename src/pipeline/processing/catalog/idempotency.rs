use crate::common::types::Record;

/// Handles change detection between a persisted record and its fresh scrape.
///
/// Only `title`, `status` and `airDate` are tracked. A difference confined to
/// `description` or `source` is not a change.
pub struct IdempotencyChecker;

impl IdempotencyChecker {
    /// Names of the tracked fields that differ, in catalog field order
    pub fn changed_fields(existing: &Record, scraped: &Record) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if existing.title != scraped.title {
            fields.push("title");
        }
        if existing.status != scraped.status {
            fields.push("status");
        }
        if existing.air_date != scraped.air_date {
            fields.push("airDate");
        }
        fields
    }
}
