//! In-memory [`AnnotationSource`] for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use volcanyx_common::{Paper, Result, VolcanyxError};

use crate::sources::AnnotationSource;

/// Failure injected at the reference-lookup stage.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Status(u16),
    Malformed,
}

#[derive(Default)]
pub struct MockAnnotationSource {
    genes: HashMap<String, (String, Vec<Paper>)>,
    symbols_by_id: HashMap<String, String>,
    failures: HashMap<String, MockFailure>,
    delays: HashMap<String, Duration>,
    gates: HashMap<String, Arc<Notify>>,
    calls: AtomicUsize,
}

impl MockAnnotationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gene(mut self, symbol: &str, gene_id: &str, papers: Vec<Paper>) -> Self {
        self.genes.insert(symbol.to_string(), (gene_id.to_string(), papers));
        self.symbols_by_id.insert(gene_id.to_string(), symbol.to_string());
        self
    }

    pub fn with_failure(mut self, symbol: &str, failure: MockFailure) -> Self {
        self.failures.insert(symbol.to_string(), failure);
        self
    }

    pub fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    /// Identifier resolution for `symbol` waits until `gate` is notified.
    pub fn with_gate(mut self, symbol: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(symbol.to_string(), gate);
        self
    }

    /// Number of identifier resolutions started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnnotationSource for MockAnnotationSource {
    async fn resolve_gene_id(&self, symbol: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(symbol) {
            gate.notified().await;
        }
        if let Some(delay) = self.delays.get(symbol) {
            tokio::time::sleep(*delay).await;
        }
        self.genes
            .get(symbol)
            .map(|(id, _)| id.clone())
            .ok_or_else(|| VolcanyxError::LookupMiss(symbol.to_string()))
    }

    async fn fetch_references(&self, gene_id: &str) -> Result<Vec<Paper>> {
        let symbol = self
            .symbols_by_id
            .get(gene_id)
            .ok_or_else(|| VolcanyxError::LookupMiss(gene_id.to_string()))?;
        match self.failures.get(symbol) {
            Some(MockFailure::Status(status)) => Err(VolcanyxError::Status {
                status: *status,
                url: format!("mock://gene/{}", gene_id),
            }),
            Some(MockFailure::Malformed) => Err(VolcanyxError::Parse("expected JSON object".to_string())),
            None => Ok(self.genes.get(symbol).map(|(_, p)| p.clone()).unwrap_or_default()),
        }
    }
}
