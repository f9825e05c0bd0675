//! Immutable, indexed view of the two input tables.
//!
//! - the differential-expression table (symbol, logFC, adjusted p-value), and
//! - the per-donor expression table (symbol plus one column per donor).
//!
//! Both are loaded once at startup and shared read-only across sessions,
//! typically as `Arc<DataStore>`.
//!
//! # Failure policy
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | input file unreadable | `Err`, the process does not start |
//! | required diff columns missing | store built with [`DiffTableStatus::MissingColumns`] |
//! | bad numeric / non-positive p-value | row skipped and counted |
//! | undecodable bytes in an unused column | ignored |
//! | undecodable symbol or numeric cell | row (or donor cell) skipped |
//! | expression symbol column missing | empty expression index, logged |

pub mod cohort;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ByteRecord;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use volcanyx_common::config::DataConfig;
use volcanyx_common::{Cohort, GeneRecord, Result, VolcanyxError};

pub use cohort::{DonorColumn, DonorLayout};

/// One donor measurement of a gene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorValue {
    pub donor_id: String,
    pub cohort: Cohort,
    pub value: f64,
}

/// Expression values of one gene across classified donors, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionRow {
    pub symbol: String,
    pub values: Vec<DonorValue>,
}

/// Usability of the differential-expression table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "columns", rename_all = "snake_case")]
pub enum DiffTableStatus {
    Ready,
    /// Parsed, but no valid rows
    Empty,
    MissingColumns(Vec<String>),
}

/// Summary of what was loaded and what was dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub rows_loaded: usize,
    pub rows_skipped: usize,
    pub duplicate_symbols: usize,
    pub expression_rows: usize,
    pub old_donors: usize,
    pub young_donors: usize,
    pub excluded_columns: Vec<String>,
}

#[derive(Debug)]
pub struct DataStore {
    records: Vec<GeneRecord>,
    diff_index: HashMap<String, usize>,
    diff_status: DiffTableStatus,
    expression: HashMap<String, ExpressionRow>,
    donors: DonorLayout,
    report: LoadReport,
}

/// `.tsv` / `.txt` are tab-separated, everything else comma-separated.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "tsv" || ext == "txt" => b'\t',
        _ => b',',
    }
}

fn open_table(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|source| VolcanyxError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(reader(file, delimiter_for(path)))
}

fn reader<R: Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Header names, decoded lossily so an odd byte cannot hide a column.
fn decode_headers(headers: &ByteRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect()
}

/// A cell as text; `None` if absent or not valid UTF-8.
fn text_cell(record: &ByteRecord, index: usize) -> Option<&str> {
    std::str::from_utf8(record.get(index)?).ok().map(str::trim)
}

fn parse_cell(cell: Option<&str>) -> Option<f64> {
    let cell = cell?.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl DataStore {
    /// Load both tables from the paths in `config`.
    pub fn load(config: &DataConfig) -> Result<Self> {
        info!("Loading differential-expression table from {:?}", config.diff_table);
        let diff = open_table(&config.diff_table)?;
        info!("Loading expression table from {:?}", config.expression_table);
        let expr = open_table(&config.expression_table)?;
        Self::from_readers(diff, expr, config)
    }

    /// Build from in-memory table text (for testing / offline use).
    pub fn from_tables(
        diff: &str,
        diff_delimiter: u8,
        expr: &str,
        expr_delimiter: u8,
        config: &DataConfig,
    ) -> Result<Self> {
        Self::from_readers(
            reader(diff.as_bytes(), diff_delimiter),
            reader(expr.as_bytes(), expr_delimiter),
            config,
        )
    }

    fn from_readers<D: Read, E: Read>(
        diff: csv::Reader<D>,
        expr: csv::Reader<E>,
        config: &DataConfig,
    ) -> Result<Self> {
        let mut store = Self {
            records: Vec::new(),
            diff_index: HashMap::new(),
            diff_status: DiffTableStatus::Empty,
            expression: HashMap::new(),
            donors: DonorLayout::default(),
            report: LoadReport::default(),
        };
        store.load_diff_table(diff, config)?;
        store.load_expression_table(expr, config)?;

        info!(
            "DataStore ready: {} records ({} skipped), {} expression rows, {} old / {} young donors",
            store.report.rows_loaded,
            store.report.rows_skipped,
            store.report.expression_rows,
            store.report.old_donors,
            store.report.young_donors,
        );
        Ok(store)
    }

    fn load_diff_table<R: Read>(&mut self, mut rdr: csv::Reader<R>, config: &DataConfig) -> Result<()> {
        let headers = decode_headers(rdr.byte_headers()?);
        let position = |name: &str| headers.iter().position(|h| h == name);

        let required = [&config.symbol_column, &config.logfc_column, &config.adj_p_column];
        let missing: Vec<String> = required
            .iter()
            .filter(|c| position(c.as_str()).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            let err = VolcanyxError::MissingColumns {
                table: "differential-expression table".to_string(),
                columns: missing.clone(),
            };
            error!("{}", err);
            self.diff_status = DiffTableStatus::MissingColumns(missing);
            return Ok(());
        }
        let (Some(sym_idx), Some(fc_idx), Some(p_idx)) = (
            position(config.symbol_column.as_str()),
            position(config.logfc_column.as_str()),
            position(config.adj_p_column.as_str()),
        ) else {
            return Ok(());
        };

        for (row, result) in rdr.byte_records().enumerate() {
            let record = result?;
            let Some(symbol) = text_cell(&record, sym_idx).filter(|s| !s.is_empty()) else {
                debug!(row, "Skipping row without a readable symbol");
                self.report.rows_skipped += 1;
                continue;
            };
            let (Some(log_fc), Some(adj_p)) = (
                parse_cell(text_cell(&record, fc_idx)),
                parse_cell(text_cell(&record, p_idx)),
            ) else {
                debug!(row, symbol, "Skipping row with unparsable numeric value");
                self.report.rows_skipped += 1;
                continue;
            };
            let gene = match GeneRecord::new(row, symbol, log_fc, adj_p) {
                Ok(gene) => gene,
                Err(e) => {
                    debug!(row, symbol, "Skipping row: {}", e);
                    self.report.rows_skipped += 1;
                    continue;
                }
            };
            if self.diff_index.contains_key(symbol) {
                debug!(row, symbol, "Duplicate symbol, keeping first occurrence");
                self.report.duplicate_symbols += 1;
                continue;
            }
            self.diff_index.insert(symbol.to_string(), self.records.len());
            self.records.push(gene);
        }

        self.report.rows_loaded = self.records.len();
        if self.report.rows_skipped > 0 {
            warn!("Skipped {} invalid rows in differential-expression table", self.report.rows_skipped);
        }
        self.diff_status = if self.records.is_empty() {
            DiffTableStatus::Empty
        } else {
            DiffTableStatus::Ready
        };
        Ok(())
    }

    fn load_expression_table<R: Read>(&mut self, mut rdr: csv::Reader<R>, config: &DataConfig) -> Result<()> {
        let headers = decode_headers(rdr.byte_headers()?);
        let Some(sym_idx) = headers.iter().position(|h| *h == config.symbol_column) else {
            warn!(
                "Expression table has no {} column; drill-down will show placeholders only",
                config.symbol_column
            );
            return Ok(());
        };

        self.donors = DonorLayout::classify(
            headers.iter().map(String::as_str),
            sym_idx,
            &config.old_marker,
            &config.young_marker,
        );
        self.report.old_donors = self.donors.count(Cohort::Old);
        self.report.young_donors = self.donors.count(Cohort::Young);
        self.report.excluded_columns = self.donors.excluded.clone();
        if !self.donors.excluded.is_empty() {
            debug!(excluded = ?self.donors.excluded, "Expression columns without a cohort marker");
        }

        for result in rdr.byte_records() {
            let record = result?;
            let Some(symbol) = text_cell(&record, sym_idx).filter(|s| !s.is_empty()) else {
                continue;
            };
            if self.expression.contains_key(symbol) {
                continue;
            }
            let values = self
                .donors
                .donors
                .iter()
                .filter_map(|col| {
                    parse_cell(text_cell(&record, col.index)).map(|value| DonorValue {
                        donor_id: col.donor_id.clone(),
                        cohort: col.cohort,
                        value,
                    })
                })
                .collect();
            self.expression.insert(
                symbol.to_string(),
                ExpressionRow { symbol: symbol.to_string(), values },
            );
        }
        self.report.expression_rows = self.expression.len();
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    pub fn get_diff_row(&self, symbol: &str) -> Option<&GeneRecord> {
        self.diff_index.get(symbol.trim()).map(|&i| &self.records[i])
    }

    pub fn get_expression_row(&self, symbol: &str) -> Option<&ExpressionRow> {
        self.expression.get(symbol.trim())
    }

    /// All valid differential-expression rows, in file order.
    pub fn records(&self) -> &[GeneRecord] {
        &self.records
    }

    pub fn diff_status(&self) -> &DiffTableStatus {
        &self.diff_status
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }
}
