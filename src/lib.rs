pub mod apis;
pub mod app;
pub mod common;
pub mod config;
pub mod infra;
pub mod observability;
pub mod pipeline;

pub use common::error::{Result, ScraperError};
pub use common::types::{Extractor, Record, Source, Status};
pub use config::Config;
pub use pipeline::processing::catalog::{
    Catalog, CatalogDocument, CatalogMerger, MergeResult, MergeStats,
};
pub use pipeline::processing::dates::{DateNormalizer, NormalizedInstant, SortDirection};
pub use pipeline::processing::status::{ReconcileReport, StatusReconciler};
