//! Filtering, sorting and summary counts for browsing a catalog.

use std::cmp::Ordering;
use std::str::FromStr;

use super::Catalog;
use crate::common::types::{Record, Status};
use crate::pipeline::processing::dates::{DateNormalizer, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Source,
    Title,
    Status,
    AirDate,
    Description,
    Link,
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "source" => Ok(SortColumn::Source),
            "title" => Ok(SortColumn::Title),
            "status" => Ok(SortColumn::Status),
            "airdate" | "date" => Ok(SortColumn::AirDate),
            "description" => Ok(SortColumn::Description),
            "link" => Ok(SortColumn::Link),
            _ => Err(format!("unknown column '{}'", s)),
        }
    }
}

/// Search, filters and ordering applied to a catalog listing
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the title or description
    pub search: Option<String>,
    /// Exact source name, compared case-insensitively
    pub source: Option<String>,
    pub status: Option<Status>,
    pub sort: Option<(SortColumn, SortDirection)>,
}

impl CatalogQuery {
    pub fn matches(&self, record: &Record) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                record.title.to_lowercase().contains(&term)
                    || record.description.to_lowercase().contains(&term)
            }
        };
        let matches_source = self
            .source
            .as_deref()
            .map_or(true, |source| record.source.as_str().eq_ignore_ascii_case(source.trim()));
        let matches_status = self.status.map_or(true, |status| record.status == status);

        matches_search && matches_source && matches_status
    }

    /// Matching records, sorted if a sort column was requested
    pub fn apply<'a>(&self, catalog: &'a Catalog, normalizer: &DateNormalizer) -> Vec<&'a Record> {
        let mut rows: Vec<&Record> = catalog.iter().filter(|record| self.matches(record)).collect();
        if let Some((column, direction)) = self.sort {
            rows.sort_by(|a, b| compare_records(a, b, column, direction, normalizer));
        }
        rows
    }
}

fn compare_records(
    a: &Record,
    b: &Record,
    column: SortColumn,
    direction: SortDirection,
    normalizer: &DateNormalizer,
) -> Ordering {
    if column == SortColumn::AirDate {
        return normalizer.compare(&a.air_date, &b.air_date, direction);
    }

    let text = |record: &Record| -> String {
        match column {
            SortColumn::Source => record.source.as_str().to_lowercase(),
            SortColumn::Title => record.title.to_lowercase(),
            SortColumn::Status => record.status.as_str().to_lowercase(),
            SortColumn::Description => record.description.to_lowercase(),
            SortColumn::Link | SortColumn::AirDate => record.link.to_lowercase(),
        }
    };
    let ordering = text(a).cmp(&text(b));
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Header counts shown above the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub upcoming: usize,
    pub on_demand: usize,
}

impl CatalogStats {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        catalog.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.status {
                Status::Upcoming => stats.upcoming += 1,
                Status::OnDemand => stats.on_demand += 1,
            }
            stats
        })
    }
}
