//! MyGene.info REST client.
//!
//! Endpoints used:
//!   query: {base}/query?q=symbol:<SYMBOL>&species=<species>&fields=_id
//!   gene:  {base}/gene/<id>?fields=generif

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use volcanyx_common::config::AnnotationConfig;
use volcanyx_common::sandbox::SandboxClient as Client;
use volcanyx_common::{Paper, Result, VolcanyxError};

use super::AnnotationSource;

pub struct MyGeneClient {
    client: Client,
    base_url: String,
    species: String,
    pubmed_url: String,
    max_papers: usize,
}

impl MyGeneClient {
    pub fn new(config: &AnnotationConfig) -> Result<Self> {
        Ok(Self {
            client: Client::for_annotation(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            species: config.species.clone(),
            pubmed_url: config.pubmed_url.trim_end_matches('/').to_string(),
            max_papers: config.max_papers,
        })
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value> {
        let resp = self.client.get(url)?.query(params).send().await?;
        if !resp.status().is_success() {
            return Err(VolcanyxError::Status {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| VolcanyxError::Parse(e.to_string()))
    }
}

/// First hit's `_id`, as a string even when the service returns a number.
pub fn parse_first_hit(resp: &Value) -> Option<String> {
    let id = resp["hits"].as_array()?.first()?.get("_id")?;
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// GeneRIF entries carrying both text and a PubMed id, in source order.
/// `generif` may be a single object or a list.
pub fn parse_generifs(resp: &Value, pubmed_url: &str) -> Vec<Paper> {
    let entries: Vec<&Value> = match &resp["generif"] {
        Value::Array(items) => items.iter().collect(),
        obj @ Value::Object(_) => vec![obj],
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let text = entry["text"].as_str().map(str::trim).filter(|t| !t.is_empty())?;
            let pmid = match &entry["pubmed"] {
                Value::Number(n) => n.to_string(),
                Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                _ => return None,
            };
            Some(Paper {
                title: text.to_string(),
                url: format!("{}/{}/", pubmed_url, pmid),
            })
        })
        .collect()
}

#[async_trait]
impl AnnotationSource for MyGeneClient {
    #[instrument(skip(self))]
    async fn resolve_gene_id(&self, symbol: &str) -> Result<String> {
        let url = format!("{}/query", self.base_url);
        let query = format!("symbol:{}", symbol);
        let resp = self
            .get_json(
                &url,
                &[("q", query.as_str()), ("species", self.species.as_str()), ("fields", "_id"), ("size", "1")],
            )
            .await?;

        let id = parse_first_hit(&resp).ok_or_else(|| VolcanyxError::LookupMiss(symbol.to_string()))?;
        debug!(%id, "MyGene query resolved symbol");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn fetch_references(&self, gene_id: &str) -> Result<Vec<Paper>> {
        let url = format!("{}/gene/{}", self.base_url, gene_id);
        let resp = self.get_json(&url, &[("fields", "generif")]).await?;

        let mut papers = parse_generifs(&resp, &self.pubmed_url);
        papers.truncate(self.max_papers);
        debug!(count = papers.len(), "MyGene returned GeneRIFs");
        Ok(papers)
    }
}
