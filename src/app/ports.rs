use async_trait::async_trait;

use crate::common::error::Result;
use crate::pipeline::processing::catalog::{Catalog, CatalogDocument};

/// Where the authoritative catalog lives between runs
#[async_trait]
pub trait CatalogStorePort: Send + Sync {
    /// The previously persisted catalog. Missing or unreadable storage yields
    /// an empty catalog rather than an error.
    async fn load_prior(&self) -> Catalog;

    async fn persist(&self, document: &CatalogDocument) -> Result<()>;
}

/// A derived rendering of the catalog (public JSON copy, CSV, ...)
#[async_trait]
pub trait CatalogPublisherPort: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, document: &CatalogDocument) -> Result<()>;
}
