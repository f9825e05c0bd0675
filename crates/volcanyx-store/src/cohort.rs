//! Donor column classification for the per-donor expression table.
//!
//! Column names carry a cohort marker substring (`OD` for old donors, `YD`
//! for young donors by default). Classification runs once over the header row
//! at load time and the result is kept alongside the expression index.

use serde::Serialize;
use volcanyx_common::Cohort;

/// A donor column of the expression table with its resolved cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonorColumn {
    /// Position in the header row
    pub index: usize,
    pub donor_id: String,
    pub cohort: Cohort,
}

/// Classify a single column header. Returns `None` when the header carries
/// neither marker, or both.
pub fn classify_donor(header: &str, old_marker: &str, young_marker: &str) -> Option<Cohort> {
    match (header.contains(old_marker), header.contains(young_marker)) {
        (true, false) => Some(Cohort::Old),
        (false, true) => Some(Cohort::Young),
        _ => None,
    }
}

/// Result of classifying a header row.
#[derive(Debug, Clone, Default)]
pub struct DonorLayout {
    pub donors: Vec<DonorColumn>,
    /// Non-symbol headers that matched no cohort (or both)
    pub excluded: Vec<String>,
}

impl DonorLayout {
    pub fn classify<'a>(
        headers: impl IntoIterator<Item = &'a str>,
        symbol_index: usize,
        old_marker: &str,
        young_marker: &str,
    ) -> Self {
        let mut layout = Self::default();
        for (index, header) in headers.into_iter().enumerate() {
            if index == symbol_index {
                continue;
            }
            let header = header.trim();
            match classify_donor(header, old_marker, young_marker) {
                Some(cohort) => layout.donors.push(DonorColumn {
                    index,
                    donor_id: header.to_string(),
                    cohort,
                }),
                None => layout.excluded.push(header.to_string()),
            }
        }
        layout
    }

    pub fn count(&self, cohort: Cohort) -> usize {
        self.donors.iter().filter(|d| d.cohort == cohort).count()
    }
}
