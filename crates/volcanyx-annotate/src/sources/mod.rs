//! Gene annotation source clients.

pub mod mygene;

use async_trait::async_trait;
use volcanyx_common::{Paper, Result};

/// Common interface for gene-metadata services.
#[async_trait]
pub trait AnnotationSource: Send + Sync {
    /// Resolve a gene symbol to the service's identifier (first match).
    /// Fails with `VolcanyxError::LookupMiss` when nothing matches.
    async fn resolve_gene_id(&self, symbol: &str) -> Result<String>;

    /// Literature references for a resolved identifier, in source order.
    async fn fetch_references(&self, gene_id: &str) -> Result<Vec<Paper>>;
}
