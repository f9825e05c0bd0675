//! Data models shared by the store, the plot builders and the session controller.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VolcanyxError};

/// One row of the differential-expression table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneRecord {
    /// Zero-based data row position in the source table
    pub id: usize,
    /// Gene / protein symbol, e.g. "TP53"
    pub symbol: String,
    /// log2 fold change
    pub log_fc: f64,
    /// Multiple-testing adjusted p-value, in (0, 1]
    pub adj_p_value: f64,
    /// -log10(adj_p_value), computed once at construction
    pub neg_log10_p: f64,
}

impl GeneRecord {
    /// Build a record, rejecting adjusted p-values outside (0, 1].
    pub fn new(id: usize, symbol: impl Into<String>, log_fc: f64, adj_p_value: f64) -> Result<Self> {
        if !log_fc.is_finite() {
            return Err(VolcanyxError::InvalidValue {
                column: "logFC".to_string(),
                row: id,
                value: log_fc.to_string(),
            });
        }
        if !adj_p_value.is_finite() || adj_p_value <= 0.0 || adj_p_value > 1.0 {
            return Err(VolcanyxError::InvalidValue {
                column: "adjPValue".to_string(),
                row: id,
                value: adj_p_value.to_string(),
            });
        }
        Ok(Self {
            id,
            symbol: symbol.into(),
            log_fc,
            adj_p_value,
            neg_log10_p: -adj_p_value.log10(),
        })
    }
}

/// Colour class of a volcano point. Always derived from (record, threshold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorCategory {
    Up,
    Down,
    NotSignificant,
}

impl ColorCategory {
    pub const ALL: [ColorCategory; 3] = [Self::Up, Self::Down, Self::NotSignificant];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Up             => "Up",
            Self::Down           => "Down",
            Self::NotSignificant => "Not significant",
        }
    }
}

/// Donor cohort, inferred from a marker substring in the donor column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cohort {
    Old,
    Young,
}

impl Cohort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::Old   => "Old",
            Cohort::Young => "Young",
        }
    }
}

/// Per-session control values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub significance_threshold: f64,
    pub figure_width: u32,
    pub figure_height: u32,
    pub selected_gene: Option<String>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            significance_threshold: 0.05,
            figure_width: 1200,
            figure_height: 700,
            selected_gene: None,
        }
    }
}

/// A literature reference attached to a gene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub url: String,
}

/// Outcome of an annotation fetch. A failure carries an empty paper list and a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub gene_symbol: String,
    pub papers: Vec<Paper>,
    pub failure: Option<String>,
}

impl AnnotationResult {
    pub fn found(gene_symbol: impl Into<String>, papers: Vec<Paper>) -> Self {
        Self { gene_symbol: gene_symbol.into(), papers, failure: None }
    }

    pub fn failed(gene_symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            gene_symbol: gene_symbol.into(),
            papers: Vec::new(),
            failure: Some(message.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}
