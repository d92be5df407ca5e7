use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::idempotency::IdempotencyChecker;
use super::{keep_last_per_link, Catalog};
use crate::common::types::Record;
use crate::observability::metrics;

/// Tallies from one merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Links of prior records that did not reappear, sorted
    pub removed: Vec<String>,
    /// Snapshot records dropped because a later record shared their link
    pub duplicates_collapsed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub catalog: Catalog,
    pub changed: bool,
    pub stats: MergeStats,
}

/// Merges a fresh snapshot into the persisted catalog.
///
/// Identity is the record `link`. A matched record is replaced whole by the
/// scraped one when a tracked field differs and kept whole otherwise. Prior
/// records missing from the snapshot are dropped. Output order is snapshot
/// order.
pub struct CatalogMerger;

impl CatalogMerger {
    #[instrument(skip_all, fields(prior = prior.len(), scraped = snapshot.len()))]
    pub fn merge(prior: Catalog, snapshot: Vec<Record>) -> MergeResult {
        let mut stats = MergeStats::default();

        let (snapshot, duplicates) = keep_last_per_link(snapshot);
        if duplicates > 0 {
            debug!("Collapsed {} scraped record(s) sharing a link with a later one", duplicates);
        }
        stats.duplicates_collapsed = duplicates;

        // Entries are removed as they are matched; leftovers were not re-scraped.
        let mut existing_by_link: HashMap<String, Record> = prior
            .into_records()
            .into_iter()
            .map(|record| (record.link.clone(), record))
            .collect();

        let mut merged = Vec::with_capacity(snapshot.len());
        for scraped in snapshot {
            match existing_by_link.remove(&scraped.link) {
                None => {
                    debug!(link = %scraped.link, "New webinar");
                    stats.added += 1;
                    merged.push(scraped);
                }
                Some(existing) => {
                    let changed_fields = IdempotencyChecker::changed_fields(&existing, &scraped);
                    if changed_fields.is_empty() {
                        stats.unchanged += 1;
                        merged.push(existing);
                    } else {
                        debug!(link = %scraped.link, fields = ?changed_fields, "Updated webinar");
                        stats.updated += 1;
                        merged.push(scraped);
                    }
                }
            }
        }

        let mut removed: Vec<String> = existing_by_link.into_keys().collect();
        removed.sort();
        stats.removed = removed;

        let changed = stats.added > 0 || stats.updated > 0 || !stats.removed.is_empty();
        Self::log_tallies(&stats);

        MergeResult {
            catalog: Catalog { records: merged },
            changed,
            stats,
        }
    }

    fn log_tallies(stats: &MergeStats) {
        if stats.added > 0 {
            info!("[Merge] {} new webinar(s) added.", stats.added);
        }
        if stats.updated > 0 {
            info!("[Merge] {} webinar(s) updated.", stats.updated);
        }
        if !stats.removed.is_empty() {
            info!(
                "[Merge] {} webinar(s) no longer found on source and will be removed.",
                stats.removed.len()
            );
        }
        metrics::merge::records_added(stats.added);
        metrics::merge::records_updated(stats.updated);
        metrics::merge::records_removed(stats.removed.len());
    }
}
