use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::config::AnnotationConfig;
use crate::error::VolcanyxError;

/// HTTP client that only allows requests to approved hosts.
/// Every request inherits the per-request timeout set at construction.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client allowed to reach the gene-metadata service and PubMed.
    pub fn new(timeout: Duration) -> Result<Self, VolcanyxError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("volcanyx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VolcanyxError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let allowlist = ["mygene.info", "pubmed.ncbi.nlm.nih.gov"]
            .iter()
            .map(|d| d.to_string())
            .collect();

        Ok(Self { client, allowlist })
    }

    /// Builds a client whose allowlist also covers the configured annotation hosts.
    pub fn for_annotation(config: &AnnotationConfig) -> Result<Self, VolcanyxError> {
        let mut sandbox = Self::new(Duration::from_secs(config.timeout_secs))?;
        for base in [&config.base_url, &config.pubmed_url] {
            let host = Url::parse(base)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .ok_or_else(|| VolcanyxError::Config(format!("Invalid URL in annotation config: {}", base)))?;
            sandbox.allow_domain(&host);
        }
        Ok(sandbox)
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Exact host match or subdomain of an allowed host.
    pub fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else { return false };
        let Some(host) = parsed.host_str() else { return false };
        self.allowlist
            .iter()
            .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)))
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, VolcanyxError> {
        if !self.is_allowed(url) {
            return Err(VolcanyxError::Blocked(url.to_string()));
        }
        Ok(self.client.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let client = SandboxClient::new(Duration::from_secs(5)).unwrap();
        assert!(client.is_allowed("https://mygene.info/v3/query?q=TP53"));
        assert!(client.is_allowed("https://pubmed.ncbi.nlm.nih.gov/12345/"));
        assert!(!client.is_allowed("https://evil.example.com/"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_subdomain_allowed_but_not_suffix_lookalike() {
        let client = SandboxClient::new(Duration::from_secs(5)).unwrap();
        assert!(client.is_allowed("https://api.mygene.info/v3"));
        assert!(!client.is_allowed("https://notmygene.info/v3"));
    }

    #[test]
    fn test_configured_hosts_are_allowed() {
        let config = AnnotationConfig {
            base_url: "http://127.0.0.1:9999/v3".to_string(),
            ..AnnotationConfig::default()
        };
        let client = SandboxClient::for_annotation(&config).unwrap();
        assert!(client.is_allowed("http://127.0.0.1:9999/v3/gene/7157"));
        assert!(matches!(
            client.get("https://elsewhere.org/"),
            Err(VolcanyxError::Blocked(_))
        ));
    }
}
