use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use crate::app::ports::CatalogPublisherPort;
use crate::common::constants::CSV_HEADER;
use crate::common::error::Result;
use crate::common::types::Record;
use crate::pipeline::processing::catalog::{Catalog, CatalogDocument};

/// Quotes a non-empty field and doubles embedded quotes; empty stays empty
pub fn csv_field(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn csv_row(record: &Record) -> String {
    [
        record.source.as_str(),
        record.title.as_str(),
        record.status.as_str(),
        record.air_date.as_str(),
        record.description.as_str(),
        record.link.as_str(),
    ]
    .iter()
    .map(|field| csv_field(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Header plus one row per record in catalog order, joined with `\n`
pub fn render_csv(catalog: &Catalog) -> String {
    std::iter::once(CSV_HEADER.to_string())
        .chain(catalog.iter().map(csv_row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes the CSV rendering to every configured path
pub struct CsvFilePublisher {
    paths: Vec<PathBuf>,
}

impl CsvFilePublisher {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl CatalogPublisherPort for CsvFilePublisher {
    fn name(&self) -> &str {
        "csv"
    }

    async fn publish(&self, document: &CatalogDocument) -> Result<()> {
        let csv = render_csv(&document.webinars);
        for path in &self.paths {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, &csv).await?;
            info!("Wrote CSV to {}", path.display());
        }
        Ok(())
    }
}
