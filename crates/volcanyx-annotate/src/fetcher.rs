//! Failure-boundary around an [`AnnotationSource`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use volcanyx_common::config::AnnotationConfig;
use volcanyx_common::{AnnotationResult, Result, VolcanyxError};

use crate::sources::mygene::MyGeneClient;
use crate::sources::AnnotationSource;

/// Runs the two-stage lookup under one deadline. `fetch` never fails: every
/// error becomes an empty result with a short message.
#[derive(Clone)]
pub struct AnnotationFetcher {
    source: Arc<dyn AnnotationSource>,
    timeout: Duration,
}

impl AnnotationFetcher {
    pub fn new(source: Arc<dyn AnnotationSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fetcher backed by MyGene.info.
    pub fn from_config(config: &AnnotationConfig) -> Result<Self> {
        let client = MyGeneClient::new(config)?;
        Ok(Self::new(Arc::new(client), Duration::from_secs(config.timeout_secs)))
    }

    pub async fn fetch(&self, symbol: &str) -> AnnotationResult {
        let lookup = async {
            let gene_id = self.source.resolve_gene_id(symbol).await?;
            self.source.fetch_references(&gene_id).await
        };

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(papers)) => {
                debug!(symbol, count = papers.len(), "Annotation fetch complete");
                AnnotationResult::found(symbol, papers)
            }
            Ok(Err(err)) => {
                if err.is_network() {
                    warn!(symbol, "Annotation fetch failed: {}", err);
                } else {
                    debug!(symbol, "Annotation fetch found nothing: {}", err);
                }
                AnnotationResult::failed(symbol, failure_message(symbol, &err))
            }
            Err(_) => {
                let err = VolcanyxError::Timeout(self.timeout.as_secs());
                warn!(symbol, "Annotation fetch failed: {}", err);
                AnnotationResult::failed(symbol, failure_message(symbol, &err))
            }
        }
    }
}

/// Short, user-facing text for the link panel.
pub fn failure_message(symbol: &str, err: &VolcanyxError) -> String {
    match err {
        VolcanyxError::LookupMiss(_) => format!("No external gene record found for {}.", symbol),
        VolcanyxError::Timeout(_) => format!("Literature lookup for {} timed out.", symbol),
        VolcanyxError::Status { status, .. } => {
            format!("Literature service returned HTTP {} for {}.", status, symbol)
        }
        VolcanyxError::Parse(_) => format!("Literature service sent an unreadable response for {}.", symbol),
        _ => format!("Literature lookup for {} failed.", symbol),
    }
}
