use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::app::ports::CatalogStorePort;
use crate::common::error::Result;
use crate::common::types::Record;
use crate::pipeline::processing::catalog::{Catalog, CatalogDocument};

/// Older files may hold a bare array of records instead of the full document.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCatalog {
    Bare(Vec<Record>),
    Document(CatalogDocument),
}

/// The authoritative catalog kept as a pretty-printed JSON document
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored document. `Ok(None)` when there is no file yet.
    pub async fn read_document(&self) -> Result<Option<CatalogDocument>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document = match serde_json::from_str::<StoredCatalog>(&content)? {
            StoredCatalog::Bare(records) => CatalogDocument {
                last_updated: None,
                count: records.len(),
                webinars: Catalog::from_records(records),
            },
            StoredCatalog::Document(document) => document,
        };
        Ok(Some(document))
    }
}

#[async_trait]
impl CatalogStorePort for JsonCatalogStore {
    async fn load_prior(&self) -> Catalog {
        match self.read_document().await {
            Ok(Some(document)) => document.webinars,
            Ok(None) => {
                debug!("No existing catalog at {}", self.path.display());
                Catalog::new()
            }
            Err(e) => {
                warn!(
                    "Could not read existing catalog at {}: {}. Starting fresh.",
                    self.path.display(),
                    e
                );
                Catalog::new()
            }
        }
    }

    async fn persist(&self, document: &CatalogDocument) -> Result<()> {
        write_json_document(&self.path, document).await?;
        info!("Saved {} webinars to {}", document.count, self.path.display());
        Ok(())
    }
}

/// Writes the document with two-space indentation, creating parent directories
pub(crate) async fn write_json_document(path: &Path, document: &CatalogDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(document)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
