//! Fixture tables and helpers shared by integration tests.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use volcanyx_common::config::DataConfig;
use volcanyx_common::Paper;
use volcanyx_store::DataStore;

/// Differential table: two significant up, one significant down at 0.05,
/// one in [0.01, 0.05) and one clearly not significant.
pub const DIFF_CSV: &str = "\
EntrezGeneSymbol,logFC,adj.P.Val,AveExpr
TP53,1.8,0.001,7.1
KRAS,-0.9,0.03,6.0
EGFR,0.4,0.2,5.5
APOE,1.1,0.004,8.3
CLU,0.7,0.045,4.4
NOEXPR,2.2,0.0005,3.0
";

/// Expression table: three old and two young donors, one unmarked column.
pub const EXPR_CSV: &str = "\
EntrezGeneSymbol,OD_01,OD_02,OD_03,YD_01,YD_02,Batch
TP53,5.1,5.4,5.0,3.2,3.5,1
KRAS,2.0,2.1,,2.6,2.4,1
EGFR,4.0,4.2,4.1,4.3,4.4,2
APOE,9.9,10.2,10.0,8.1,8.0,2
CLU,1.0,1.1,1.2,,,2
";

pub fn fixture_store() -> Arc<DataStore> {
    Arc::new(
        DataStore::from_tables(DIFF_CSV, b',', EXPR_CSV, b',', &DataConfig::default())
            .expect("fixture tables are valid"),
    )
}

/// A store whose differential table lacks the adjusted p-value column.
pub fn missing_columns_store() -> Arc<DataStore> {
    let diff = "EntrezGeneSymbol,logFC\nTP53,1.8\n";
    Arc::new(
        DataStore::from_tables(diff, b',', EXPR_CSV, b',', &DataConfig::default())
            .expect("fixture tables are valid"),
    )
}

/// Write the fixture tables into `dir` and return a config pointing at them.
pub fn write_fixture_tables(dir: &Path) -> std::io::Result<DataConfig> {
    let diff_table = dir.join("diff_expression.csv");
    let expression_table = dir.join("expression.csv");
    std::fs::write(&diff_table, DIFF_CSV)?;
    std::fs::write(&expression_table, EXPR_CSV)?;
    Ok(DataConfig {
        diff_table,
        expression_table,
        ..DataConfig::default()
    })
}

pub fn paper(pmid: u32) -> Paper {
    Paper {
        title: format!("GeneRIF {}", pmid),
        url: format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid),
    }
}

/// Await `fut`, panicking if it takes longer than five seconds.
pub async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out waiting for session")
}
