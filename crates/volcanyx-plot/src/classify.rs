//! Significance classification.
//!
//! `significant = adj_p_value < threshold` (strict: a p-value equal to the
//! threshold is not significant). Significant records with positive logFC are
//! `Up`, all other significant records are `Down`.

use serde::Serialize;
use volcanyx_common::{ColorCategory, GeneRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub significant: bool,
    pub color: ColorCategory,
}

/// A record paired with its classification under one threshold.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedRow<'a> {
    pub record: &'a GeneRecord,
    pub class: Classification,
}

pub fn classify(record: &GeneRecord, threshold: f64) -> Classification {
    let significant = record.adj_p_value < threshold;
    let color = match (significant, record.log_fc > 0.0) {
        (true, true)  => ColorCategory::Up,
        (true, false) => ColorCategory::Down,
        (false, _)    => ColorCategory::NotSignificant,
    };
    Classification { significant, color }
}

pub fn classify_all(records: &[GeneRecord], threshold: f64) -> Vec<ClassifiedRow<'_>> {
    records
        .iter()
        .map(|record| ClassifiedRow { record, class: classify(record, threshold) })
        .collect()
}
