use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, info_span, instrument, warn, Instrument};

use crate::app::ports::{CatalogPublisherPort, CatalogStorePort};
use crate::common::error::Result;
use crate::common::types::{Extractor, Record, Source};
use crate::observability::metrics;
use crate::pipeline::processing::catalog::{CatalogDocument, CatalogMerger, MergeStats};
use crate::pipeline::processing::status::{ReconcileReport, StatusReconciler};

/// What one extractor contributed to a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    pub source: Source,
    /// Valid records kept for the snapshot
    pub records: usize,
    /// Candidates dropped for a missing title or link
    pub invalid: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub sources: Vec<SourceOutcome>,
    pub reconcile: ReconcileReport,
    pub merge: MergeStats,
    /// Size of the merged catalog
    pub total: usize,
    pub changed: bool,
    /// False when nothing changed or the run was a dry run
    pub written: bool,
}

impl RefreshSummary {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.sources.iter().filter(|outcome| outcome.error.is_some())
    }
}

/// Runs every extractor once, reconciles statuses, merges against the stored
/// catalog and writes the result when something changed.
pub struct RefreshUseCase {
    extractors: Vec<Box<dyn Extractor>>,
    store: Box<dyn CatalogStorePort>,
    publishers: Vec<Box<dyn CatalogPublisherPort>>,
    dry_run: bool,
}

impl RefreshUseCase {
    pub fn new(extractors: Vec<Box<dyn Extractor>>, store: Box<dyn CatalogStorePort>) -> Self {
        Self {
            extractors,
            store,
            publishers: Vec::new(),
            dry_run: false,
        }
    }

    pub fn with_publisher(mut self, publisher: Box<dyn CatalogPublisherPort>) -> Self {
        self.publishers.push(publisher);
        self
    }

    /// Compute everything but skip the writes
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// One refresh judged against `reference` as "now"
    #[instrument(skip_all, fields(extractors = self.extractors.len(), dry_run = self.dry_run))]
    pub async fn run(&self, reference: DateTime<Utc>) -> Result<RefreshSummary> {
        let prior = self.store.load_prior().await;
        info!("Loaded {} existing webinar(s)", prior.len());

        let mut snapshot = Vec::new();
        let mut outcomes = Vec::with_capacity(self.extractors.len());
        for extractor in &self.extractors {
            let source = extractor.source();
            let span = info_span!("extract", source = %source);
            let outcome = Self::collect(extractor.as_ref(), &mut snapshot).instrument(span).await;
            outcomes.push(outcome);
        }
        info!("Total webinars scraped: {}", snapshot.len());

        let reconciler = StatusReconciler::new(reference);
        let (snapshot, reconcile) = reconciler.reconcile_all(snapshot);

        let merged = CatalogMerger::merge(prior, snapshot);
        let total = merged.catalog.len();

        let mut summary = RefreshSummary {
            sources: outcomes,
            reconcile,
            merge: merged.stats,
            total,
            changed: merged.changed,
            written: false,
        };

        if !merged.changed {
            info!("[No Changes] Data is up to date. Skipping file write.");
            metrics::refresh::run_skipped();
            return Ok(summary);
        }
        if self.dry_run {
            info!("Dry run: {} webinar(s) would be written", total);
            return Ok(summary);
        }

        info!("[Changes Detected] Updating data files...");
        let document = CatalogDocument::new(merged.catalog, reference);
        // The stored catalog is written last so a failed publish is retried next run.
        for publisher in &self.publishers {
            publisher.publish(&document).await?;
            info!("Published catalog via {}", publisher.name());
        }
        self.store.persist(&document).await?;

        metrics::refresh::run_written();
        info!("Successfully saved {} webinars", total);
        summary.written = true;
        Ok(summary)
    }

    async fn collect(extractor: &dyn Extractor, snapshot: &mut Vec<Record>) -> SourceOutcome {
        let source = extractor.source();
        info!("Scraping {}...", source);

        match extractor.produce_candidates().await {
            Ok(candidates) => {
                let found = candidates.len();
                let valid: Vec<Record> = candidates.into_iter().filter(Record::is_valid).collect();
                let invalid = found - valid.len();
                if invalid > 0 {
                    warn!("Dropped {} {} candidate(s) without a title or link", invalid, source);
                    metrics::extract::invalid_records(source.as_str(), invalid);
                }

                info!("Found {} webinars from {}", valid.len(), source);
                metrics::extract::success(source.as_str());
                metrics::extract::records(source.as_str(), valid.len());

                let records = valid.len();
                snapshot.extend(valid);
                SourceOutcome { source, records, invalid, error: None }
            }
            Err(e) => {
                error!("[Error] Failed to scrape {}: {}", source, e);
                metrics::extract::failure(source.as_str());
                SourceOutcome {
                    source,
                    records: 0,
                    invalid: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::ScraperError;
    use crate::common::types::Status;
    use crate::pipeline::processing::catalog::Catalog;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Arc;

    struct MockExtractor {
        source: Source,
        records: Vec<Record>,
        fail: bool,
    }

    impl MockExtractor {
        fn returning(source: Source, records: Vec<Record>) -> Box<dyn Extractor> {
            Box::new(Self { source, records, fail: false })
        }

        fn failing(source: Source) -> Box<dyn Extractor> {
            Box::new(Self { source, records: Vec::new(), fail: true })
        }
    }

    #[async_trait]
    impl Extractor for MockExtractor {
        fn source(&self) -> Source {
            self.source.clone()
        }

        async fn produce_candidates(&self) -> Result<Vec<Record>> {
            if self.fail {
                return Err(ScraperError::Extract {
                    source_name: self.source.to_string(),
                    message: "listing page returned 503".to_string(),
                });
            }
            Ok(self.records.clone())
        }
    }

    #[derive(Clone, Default)]
    struct MockStore {
        pub documents: Arc<tokio::sync::Mutex<Vec<CatalogDocument>>>,
    }

    #[async_trait]
    impl CatalogStorePort for MockStore {
        async fn load_prior(&self) -> Catalog {
            self.documents
                .lock()
                .await
                .last()
                .map(|document| document.webinars.clone())
                .unwrap_or_default()
        }

        async fn persist(&self, document: &CatalogDocument) -> Result<()> {
            self.documents.lock().await.push(document.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockPublisher {
        pub published: Arc<tokio::sync::Mutex<Vec<usize>>>,
        pub failures_left: Arc<tokio::sync::Mutex<usize>>,
    }

    impl MockPublisher {
        fn failing_times(times: usize) -> Self {
            Self {
                failures_left: Arc::new(tokio::sync::Mutex::new(times)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CatalogPublisherPort for MockPublisher {
        fn name(&self) -> &str {
            "mock"
        }

        async fn publish(&self, document: &CatalogDocument) -> Result<()> {
            let mut failures_left = self.failures_left.lock().await;
            if *failures_left > 0 {
                *failures_left -= 1;
                return Err(ScraperError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.published.lock().await.push(document.count);
            Ok(())
        }
    }

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn pave_records() -> Vec<Record> {
        vec![
            Record::new(
                Source::Pave,
                "Merit cycles explained",
                Status::Upcoming,
                "Jan 5, 2026",
                "",
                "https://explore.pave.com/merit",
            ),
            Record::new(
                Source::Pave,
                "Planning 2027 budgets",
                Status::Upcoming,
                "Dec 1, 2099",
                "",
                "https://explore.pave.com/budgets",
            ),
        ]
    }

    fn syndio_records() -> Vec<Record> {
        vec![Record::new(
            Source::Syndio,
            "Pay equity at scale",
            Status::OnDemand,
            "May 2, 2025",
            "",
            "https://synd.io/pay-equity",
        )]
    }

    #[tokio::test]
    async fn test_failing_extractor_does_not_stop_others() {
        let store = MockStore::default();
        let documents = store.documents.clone();
        let use_case = RefreshUseCase::new(
            vec![
                MockExtractor::returning(Source::Pave, pave_records()),
                MockExtractor::failing(Source::WorldAtWork),
                MockExtractor::returning(Source::Syndio, syndio_records()),
            ],
            Box::new(store),
        );

        let summary = use_case.run(reference()).await.unwrap();

        assert!(summary.changed);
        assert!(summary.written);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.failed_sources().count(), 1);
        assert_eq!(summary.sources[1].source, Source::WorldAtWork);
        assert_eq!(summary.reconcile.corrected(), 1);

        let documents = documents.lock().await;
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].count, 3);
        assert_eq!(documents[0].last_updated, Some(reference()));
        let merit = documents[0].webinars.get("https://explore.pave.com/merit").unwrap();
        assert_eq!(merit.status, Status::OnDemand);
    }

    #[tokio::test]
    async fn test_second_identical_run_writes_nothing() {
        let store = MockStore::default();
        let documents = store.documents.clone();
        let publisher = MockPublisher::default();
        let published = publisher.published.clone();

        let build = || {
            RefreshUseCase::new(
                vec![
                    MockExtractor::returning(Source::Pave, pave_records()),
                    MockExtractor::returning(Source::Syndio, syndio_records()),
                ],
                Box::new(store.clone()),
            )
            .with_publisher(Box::new(publisher.clone()))
        };

        let first = build().run(reference()).await.unwrap();
        let second = build().run(reference()).await.unwrap();

        assert!(first.written);
        // No changes
        assert!(!second.changed);
        assert!(!second.written);
        assert_eq!(second.merge.unchanged, 3);
        assert_eq!(documents.lock().await.len(), 1);
        assert_eq!(*published.lock().await, vec![3]);
    }

    #[tokio::test]
    async fn test_dry_run_skips_writes() {
        let store = MockStore::default();
        let documents = store.documents.clone();
        let use_case = RefreshUseCase::new(
            vec![MockExtractor::returning(Source::Syndio, syndio_records())],
            Box::new(store),
        )
        .with_dry_run(true);

        let summary = use_case.run(reference()).await.unwrap();

        assert!(summary.changed);
        assert!(!summary.written);
        assert!(documents.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_candidates_are_dropped() {
        let mut records = syndio_records();
        records.push(Record::new(
            Source::Syndio,
            "",
            Status::OnDemand,
            "",
            "",
            "https://synd.io/untitled",
        ));
        records.push(Record::new(Source::Syndio, "No link here", Status::OnDemand, "", "", ""));
        let use_case = RefreshUseCase::new(
            vec![MockExtractor::returning(Source::Syndio, records)],
            Box::new(MockStore::default()),
        );

        let summary = use_case.run(reference()).await.unwrap();

        assert_eq!(summary.sources[0].records, 1);
        assert_eq!(summary.sources[0].invalid, 2);
        assert_eq!(summary.total, 1);
    }

    #[tokio::test]
    async fn test_publisher_failure_is_fatal() {
        let store = MockStore::default();
        let documents = store.documents.clone();
        let use_case = RefreshUseCase::new(
            vec![MockExtractor::returning(Source::Syndio, syndio_records())],
            Box::new(store),
        )
        .with_publisher(Box::new(MockPublisher::failing_times(1)));

        let result = use_case.run(reference()).await;

        assert!(matches!(result, Err(ScraperError::Io(_))));
        // Stored catalog untouched
        assert!(documents.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_publish_is_retried_next_run() {
        let store = MockStore::default();
        let documents = store.documents.clone();
        let publisher = MockPublisher::failing_times(1);
        let published = publisher.published.clone();

        let build = || {
            RefreshUseCase::new(
                vec![MockExtractor::returning(Source::Syndio, syndio_records())],
                Box::new(store.clone()),
            )
            .with_publisher(Box::new(publisher.clone()))
        };

        assert!(build().run(reference()).await.is_err());
        let second = build().run(reference()).await.unwrap();

        assert!(second.changed);
        assert!(second.written);
        assert_eq!(second.merge.added, 1);
        assert_eq!(*published.lock().await, vec![1]);
        assert_eq!(documents.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_all_extractors_failing_empties_catalog() {
        let store = MockStore::default();
        store
            .documents
            .lock()
            .await
            .push(CatalogDocument::new(Catalog::from_records(syndio_records()), reference()));
        let documents = store.documents.clone();

        let use_case =
            RefreshUseCase::new(vec![MockExtractor::failing(Source::Syndio)], Box::new(store));
        let summary = use_case.run(reference()).await.unwrap();

        // Removal of every prior record still counts as a change
        assert!(summary.changed);
        assert_eq!(summary.merge.removed, vec!["https://synd.io/pay-equity".to_string()]);
        assert_eq!(documents.lock().await.last().unwrap().count, 0);
    }
}
