//! Tabular extract of the highest-priority segments.

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::layer::StreetSegment;

const EXTRACT_COLUMNS: [&str; 9] = [
    "objectid",
    "streets_id",
    "label",
    "road_class",
    "speed",
    "segment_length_m",
    "addr_count",
    "priority_score",
    "priority_band",
];

/// Indices of the top `n` segments by descending score, ties broken by
/// original input order.
pub(crate) fn top_indices(segments: &[StreetSegment], n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&a, &b| {
        segments[b]
            .priority_score
            .total_cmp(&segments[a].priority_score)
            .then(a.cmp(&b))
    });
    order.truncate(n);
    order
}

/// Serialize the top-N extract as CSV.
pub(crate) fn top_extract_bytes(segments: &[StreetSegment], n: usize) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(EXTRACT_COLUMNS)
        .context("[io::csv] Failed to write header")?;

    for idx in top_indices(segments, n) {
        let seg = &segments[idx];
        writer
            .write_record([
                seg.objectid.to_string(),
                seg.streets_id.clone().unwrap_or_default(),
                seg.label.clone(),
                seg.road_class.value.clone(),
                seg.speed_raw(),
                seg.segment_length_m.to_string(),
                seg.addr_count.to_string(),
                format!("{:.2}", seg.priority_score),
                seg.priority_band.label().to_string(),
            ])
            .with_context(|| format!("[io::csv] Failed to write row for objectid {}", seg.objectid))?;
    }

    writer
        .into_inner()
        .context("[io::csv] Failed to flush CSV buffer")
}
