use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;

use super::dates::DateNormalizer;
use crate::common::types::{Record, Status};
use crate::observability::metrics;

/// One Upcoming → On Demand correction made during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCorrection {
    pub link: String,
    pub title: String,
    pub air_date: String,
}

/// Corrections made by [`StatusReconciler::reconcile_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub corrections: Vec<StatusCorrection>,
}

impl ReconcileReport {
    pub fn corrected(&self) -> usize {
        self.corrections.len()
    }
}

/// Moves records whose air date has passed from Upcoming to On Demand.
///
/// The reference instant is fixed at construction, so a whole run is judged
/// against the same "now". Only `status` is ever rewritten.
pub struct StatusReconciler {
    reference: NaiveDateTime,
    normalizer: DateNormalizer,
}

impl StatusReconciler {
    pub fn new(reference: DateTime<Utc>) -> Self {
        Self {
            reference: reference.naive_utc(),
            normalizer: DateNormalizer::at(reference),
        }
    }

    /// Returns the record, corrected if needed, and whether it was corrected
    pub fn reconcile(&self, mut record: Record) -> (Record, bool) {
        if record.status != Status::Upcoming {
            return (record, false);
        }
        if !self.normalizer.normalize(&record.air_date).is_before(self.reference) {
            return (record, false);
        }

        info!(
            link = %record.link,
            "[Status Fix] \"{}\" ({}) changed from Upcoming to On Demand",
            record.title,
            record.air_date
        );
        metrics::reconcile::status_corrected(record.source.as_str());
        record.status = Status::OnDemand;
        (record, true)
    }

    pub fn reconcile_all(&self, records: Vec<Record>) -> (Vec<Record>, ReconcileReport) {
        let mut report = ReconcileReport::default();
        let reconciled = records
            .into_iter()
            .map(|record| {
                let (record, corrected) = self.reconcile(record);
                if corrected {
                    report.corrections.push(StatusCorrection {
                        link: record.link.clone(),
                        title: record.title.clone(),
                        air_date: record.air_date.clone(),
                    });
                }
                record
            })
            .collect();

        if report.corrected() > 0 {
            info!(
                "[Status Fix] Corrected {} webinar(s) with past dates marked as Upcoming.",
                report.corrected()
            );
        }
        (reconciled, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Source;
    use chrono::{NaiveDate, TimeZone};

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn record(status: Status, air_date: &str) -> Record {
        Record::new(
            Source::Pave,
            "Comp planning in a downturn",
            status,
            air_date,
            "Join us",
            "https://explore.pave.com/comp-planning",
        )
    }

    #[test]
    fn test_past_upcoming_becomes_on_demand() {
        let reconciler = StatusReconciler::new(reference());
        let original = record(Status::Upcoming, "Jan 1, 2024");

        let (corrected, was_corrected) = reconciler.reconcile(original.clone());

        assert!(was_corrected);
        assert_eq!(corrected.status, Status::OnDemand);
        assert_eq!(corrected.air_date, original.air_date);
        assert_eq!(corrected.title, original.title);
        assert_eq!(corrected.description, original.description);
        assert_eq!(corrected.link, original.link);
    }

    #[test]
    fn test_on_demand_is_never_touched() {
        let reconciler = StatusReconciler::new(reference());
        for air_date in ["Jan 1, 2024", "Dec 1, 2099", "", "not a date"] {
            let original = record(Status::OnDemand, air_date);
            let (after, was_corrected) = reconciler.reconcile(original.clone());
            assert!(!was_corrected);
            assert_eq!(after, original);
        }
    }

    #[test]
    fn test_future_or_same_instant_upcoming_is_kept() {
        let at_reference = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let reconciler = StatusReconciler::new(at_reference);

        let (same_day, corrected) =
            reconciler.reconcile(record(Status::Upcoming, "October 19, 2026"));
        assert!(!corrected);
        assert_eq!(same_day.status, Status::Upcoming);

        let (future, corrected) = reconciler.reconcile(record(Status::Upcoming, "Dec 1, 2099"));
        assert!(!corrected);
        assert_eq!(future.status, Status::Upcoming);
    }

    #[test]
    fn test_year_less_dates_use_reference_utc_year() {
        // Still Dec 31 in the Americas, already Jan 1 in UTC
        let new_year = Utc.with_ymd_and_hms(2027, 1, 1, 0, 30, 0).unwrap();
        let reconciler = StatusReconciler::new(new_year);
        let expected = NaiveDate::from_ymd_opt(2027, 12, 31).unwrap().and_hms_opt(0, 0, 0);

        assert_eq!(DateNormalizer::at(new_year).normalize("Dec 31").instant(), expected);
        let (after, corrected) = reconciler.reconcile(record(Status::Upcoming, "Dec 31"));
        assert!(!corrected);
        assert_eq!(after.status, Status::Upcoming);
    }

    #[test]
    fn test_unknown_date_is_never_corrected() {
        let reconciler = StatusReconciler::new(reference());
        let (after, corrected) = reconciler.reconcile(record(Status::Upcoming, "TBA"));
        assert!(!corrected);
        assert_eq!(after.status, Status::Upcoming);
    }

    #[test]
    fn test_reconcile_all_reports_each_correction() {
        let reconciler = StatusReconciler::new(reference());
        let mut second = record(Status::Upcoming, "2025-05-05");
        second.link = "https://explore.pave.com/other".to_string();
        let records = vec![
            record(Status::Upcoming, "Jan 1, 2024"),
            record(Status::Upcoming, "Dec 1, 2099"),
            second,
            record(Status::OnDemand, "Jan 1, 2024"),
        ];

        let (reconciled, report) = reconciler.reconcile_all(records);

        assert_eq!(reconciled.len(), 4);
        assert_eq!(report.corrected(), 2);
        assert_eq!(report.corrections[1].link, "https://explore.pave.com/other");
        assert_eq!(
            reconciled.iter().map(|r| r.status).collect::<Vec<_>>(),
            vec![Status::OnDemand, Status::Upcoming, Status::OnDemand, Status::OnDemand]
        );
    }
}
