//! Loading the input tables from disk, as done at process start.

use std::path::PathBuf;

use volcanyx_common::config::DataConfig;
use volcanyx_common::{Cohort, VolcanyxError};
use volcanyx_store::{DataStore, DiffTableStatus};

fn config_for(dir: &std::path::Path, diff: &str, expr: &str) -> DataConfig {
    DataConfig {
        diff_table: dir.join(diff),
        expression_table: dir.join(expr),
        ..DataConfig::default()
    }
}

#[test]
fn test_load_tsv_tables() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("de.tsv"),
        "EntrezGeneSymbol\tlogFC\tadj.P.Val\nAPOE\t1.2\t0.004\nCLU\t-0.7\t0.02\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("expr.tsv"),
        "EntrezGeneSymbol\tOD_A\tYD_B\tYD_C\nAPOE\t10.1\t8.2\t8.0\n",
    )
    .unwrap();

    let store = DataStore::load(&config_for(dir.path(), "de.tsv", "expr.tsv")).unwrap();
    assert_eq!(store.diff_status(), &DiffTableStatus::Ready);
    assert_eq!(store.records().len(), 2);
    assert_eq!(store.get_diff_row("CLU").unwrap().log_fc, -0.7);

    let row = store.get_expression_row("APOE").unwrap();
    let young = row.values.iter().filter(|v| v.cohort == Cohort::Young).count();
    assert_eq!(young, 2);
    assert!(store.get_expression_row("CLU").is_none());
}

#[test]
fn test_missing_input_file_is_fatal() {
    let config = DataConfig {
        diff_table: PathBuf::from("/nonexistent/de.csv"),
        ..DataConfig::default()
    };
    let err = DataStore::load(&config).unwrap_err();
    assert!(matches!(err, VolcanyxError::Io { .. }));
}

#[test]
fn test_custom_column_names_and_markers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("de.csv"), "gene,fc,padj\nMYC,2.5,0.0001\n").unwrap();
    std::fs::write(dir.path().join("ex.csv"), "gene,old-1,young-1\nMYC,4,3\n").unwrap();

    let config = DataConfig {
        symbol_column: "gene".to_string(),
        logfc_column: "fc".to_string(),
        adj_p_column: "padj".to_string(),
        old_marker: "old".to_string(),
        young_marker: "young".to_string(),
        ..config_for(dir.path(), "de.csv", "ex.csv")
    };
    let store = DataStore::load(&config).unwrap();
    assert!((store.get_diff_row("MYC").unwrap().neg_log10_p - 4.0).abs() < 1e-9);
    assert_eq!(store.get_expression_row("MYC").unwrap().values.len(), 2);
}

#[test]
fn test_latin1_bytes_in_unused_column_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut diff = b"EntrezGeneSymbol,logFC,adj.P.Val,Description\n".to_vec();
    diff.extend_from_slice(b"APOE,1.2,0.004,apolipoprote\xEDna E\n");
    diff.extend_from_slice(b"CLU,-0.7,0.02,clusterin\n");
    std::fs::write(dir.path().join("de.csv"), diff).unwrap();

    let mut expr = b"EntrezGeneSymbol,Notes,OD_1,YD_1\n".to_vec();
    expr.extend_from_slice(b"APOE,r\xE1pido,10.1,8.2\n");
    std::fs::write(dir.path().join("ex.csv"), expr).unwrap();

    let store = DataStore::load(&config_for(dir.path(), "de.csv", "ex.csv")).unwrap();
    assert_eq!(store.diff_status(), &DiffTableStatus::Ready);
    assert_eq!(store.records().len(), 2);
    assert_eq!(store.report().rows_skipped, 0);
    assert_eq!(store.get_expression_row("APOE").unwrap().values.len(), 2);
}

#[test]
fn test_undecodable_needed_cells_skip_only_their_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut diff = b"EntrezGeneSymbol,logFC,adj.P.Val\n".to_vec();
    diff.extend_from_slice(b"BAD\xFF,1.0,0.01\n");
    diff.extend_from_slice(b"KRAS,\xE9,0.01\n");
    diff.extend_from_slice(b"TP53,1.8,0.001\n");
    std::fs::write(dir.path().join("de.csv"), diff).unwrap();

    let mut expr = b"EntrezGeneSymbol,OD_1,OD_2,YD_1\n".to_vec();
    expr.extend_from_slice(b"TP53,5.0,\xB5,3.1\n");
    std::fs::write(dir.path().join("ex.csv"), expr).unwrap();

    let store = DataStore::load(&config_for(dir.path(), "de.csv", "ex.csv")).unwrap();
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.report().rows_skipped, 2);
    assert!(store.get_diff_row("TP53").is_some());
    // the undecodable donor cell is dropped, the rest of the row kept
    let ids: Vec<&str> = store
        .get_expression_row("TP53")
        .unwrap()
        .values
        .iter()
        .map(|v| v.donor_id.as_str())
        .collect();
    assert_eq!(ids, vec!["OD_1", "YD_1"]);
}
