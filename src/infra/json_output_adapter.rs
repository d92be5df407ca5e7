use async_trait::async_trait;
use std::path::PathBuf;

use super::catalog_store_adapter::write_json_document;
use crate::app::ports::CatalogPublisherPort;
use crate::common::error::Result;
use crate::pipeline::processing::catalog::CatalogDocument;

/// Copy of the catalog document served statically to the listing page
pub struct JsonFilePublisher {
    path: PathBuf,
}

impl JsonFilePublisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogPublisherPort for JsonFilePublisher {
    fn name(&self) -> &str {
        "public json"
    }

    async fn publish(&self, document: &CatalogDocument) -> Result<()> {
        write_json_document(&self.path, document).await
    }
}
