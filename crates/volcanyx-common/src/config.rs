//! Configuration loading for Volcanyx.
//! Reads volcanyx.toml from the current directory or the path in VOLCANYX_CONFIG.
//! A missing file falls back to built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VolcanyxError};

pub const CONFIG_ENV_VAR: &str = "VOLCANYX_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "volcanyx.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

// ── Input tables ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_diff_table")]
    pub diff_table: PathBuf,
    #[serde(default = "default_expression_table")]
    pub expression_table: PathBuf,
    #[serde(default = "default_symbol_column")]
    pub symbol_column: String,
    #[serde(default = "default_logfc_column")]
    pub logfc_column: String,
    #[serde(default = "default_adj_p_column")]
    pub adj_p_column: String,
    #[serde(default = "default_old_marker")]
    pub old_marker: String,
    #[serde(default = "default_young_marker")]
    pub young_marker: String,
}

fn default_diff_table()       -> PathBuf { PathBuf::from("data/diff_expression.csv") }
fn default_expression_table() -> PathBuf { PathBuf::from("data/expression.csv") }
fn default_symbol_column()    -> String  { "EntrezGeneSymbol".to_string() }
fn default_logfc_column()     -> String  { "logFC".to_string() }
fn default_adj_p_column()     -> String  { "adj.P.Val".to_string() }
fn default_old_marker()       -> String  { "OD".to_string() }
fn default_young_marker()     -> String  { "YD".to_string() }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            diff_table: default_diff_table(),
            expression_table: default_expression_table(),
            symbol_column: default_symbol_column(),
            logfc_column: default_logfc_column(),
            adj_p_column: default_adj_p_column(),
            old_marker: default_old_marker(),
            young_marker: default_young_marker(),
        }
    }
}

// ── UI control defaults and bounds ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    #[serde(default = "default_width")]
    pub default_width: u32,
    #[serde(default = "default_height")]
    pub default_height: u32,
    #[serde(default = "default_threshold_bounds")]
    pub threshold_bounds: (f64, f64),
    #[serde(default = "default_width_bounds")]
    pub width_bounds: (u32, u32),
    #[serde(default = "default_height_bounds")]
    pub height_bounds: (u32, u32),
}

fn default_threshold()        -> f64        { 0.05 }
fn default_width()            -> u32        { 1200 }
fn default_height()           -> u32        { 700 }
fn default_threshold_bounds() -> (f64, f64) { (0.01, 0.1) }
fn default_width_bounds()     -> (u32, u32) { (400, 1600) }
fn default_height_bounds()    -> (u32, u32) { (300, 1200) }

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            default_threshold: default_threshold(),
            default_width: default_width(),
            default_height: default_height(),
            threshold_bounds: default_threshold_bounds(),
            width_bounds: default_width_bounds(),
            height_bounds: default_height_bounds(),
        }
    }
}

// ── External annotation service ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_pubmed_url")]
    pub pubmed_url: String,
    #[serde(default = "default_max_papers")]
    pub max_papers: usize,
}

fn default_base_url()     -> String { "https://mygene.info/v3".to_string() }
fn default_species()      -> String { "human".to_string() }
fn default_timeout_secs() -> u64    { 10 }
fn default_pubmed_url()   -> String { "https://pubmed.ncbi.nlm.nih.gov".to_string() }
fn default_max_papers()   -> usize  { 50 }

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            species: default_species(),
            timeout_secs: default_timeout_secs(),
            pubmed_url: default_pubmed_url(),
            max_papers: default_max_papers(),
        }
    }
}

// ── HTTP server ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_channel_capacity")]
    pub session_channel_capacity: usize,
}

fn default_bind()             -> String { "127.0.0.1:8050".to_string() }
fn default_channel_capacity() -> usize  { 64 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_channel_capacity: default_channel_capacity(),
        }
    }
}

impl AppConfig {
    /// Load configuration from volcanyx.toml.
    /// Checks VOLCANYX_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if !Path::new(&path).exists() {
            tracing::info!("Config file {} not found, using built-in defaults", path);
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        Self::from_path(Path::new(&path))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| VolcanyxError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| VolcanyxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.controls;
        let (t_lo, t_hi) = c.threshold_bounds;
        if !(t_lo > 0.0 && t_lo <= t_hi && t_hi <= 1.0) {
            return Err(VolcanyxError::Config(format!(
                "controls.threshold_bounds must satisfy 0 < lo <= hi <= 1, got ({}, {})",
                t_lo, t_hi
            )));
        }
        if !(t_lo..=t_hi).contains(&c.default_threshold) {
            return Err(VolcanyxError::Config(format!(
                "controls.default_threshold {} outside [{}, {}]",
                c.default_threshold, t_lo, t_hi
            )));
        }
        if c.width_bounds.0 > c.width_bounds.1 || c.height_bounds.0 > c.height_bounds.1 {
            return Err(VolcanyxError::Config("figure bounds must be ordered (lo, hi)".to_string()));
        }
        if !(c.width_bounds.0..=c.width_bounds.1).contains(&c.default_width) {
            return Err(VolcanyxError::Config(format!(
                "controls.default_width {} outside [{}, {}]",
                c.default_width, c.width_bounds.0, c.width_bounds.1
            )));
        }
        if !(c.height_bounds.0..=c.height_bounds.1).contains(&c.default_height) {
            return Err(VolcanyxError::Config(format!(
                "controls.default_height {} outside [{}, {}]",
                c.default_height, c.height_bounds.0, c.height_bounds.1
            )));
        }
        if self.annotation.timeout_secs == 0 {
            return Err(VolcanyxError::Config("annotation.timeout_secs must be > 0".to_string()));
        }
        if self.data.old_marker.is_empty() || self.data.young_marker.is_empty() {
            return Err(VolcanyxError::Config("cohort markers must be non-empty".to_string()));
        }
        if self.data.old_marker == self.data.young_marker {
            return Err(VolcanyxError::Config("cohort markers must differ".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_column_names() {
        let config = AppConfig::default();
        assert_eq!(config.data.symbol_column, "EntrezGeneSymbol");
        assert_eq!(config.data.adj_p_column, "adj.P.Val");
        assert_eq!(config.controls.default_threshold, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [data]
            diff_table = "tables/de.tsv"

            [annotation]
            timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.data.diff_table, PathBuf::from("tables/de.tsv"));
        assert_eq!(config.data.logfc_column, "logFC");
        assert_eq!(config.annotation.timeout_secs, 3);
        assert_eq!(config.server.bind, "127.0.0.1:8050");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AppConfig::from_toml("[annotation]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, VolcanyxError::Config(_)));
    }

    #[test]
    fn test_default_threshold_outside_bounds_rejected() {
        let err = AppConfig::from_toml("[controls]\ndefault_threshold = 0.5\n").unwrap_err();
        assert!(err.to_string().contains("default_threshold"));
    }

    #[test]
    fn test_default_size_outside_bounds_rejected() {
        let err = AppConfig::from_toml("[controls]\ndefault_width = 2000\n").unwrap_err();
        assert!(err.to_string().contains("default_width"));
        let err = AppConfig::from_toml("[controls]\ndefault_height = 100\n").unwrap_err();
        assert!(err.to_string().contains("default_height"));
        assert!(AppConfig::from_toml("[controls]\ndefault_width = 1600\ndefault_height = 300\n").is_ok());
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volcanyx.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:9000\"\n").unwrap();
        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
    }
}
