//! Enriched GeoJSON output and atomic file persistence.

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde_json::json;
use tempfile::NamedTempFile;

use crate::common;
use crate::layer::StreetSegment;

/// Serialize the enriched street layer as a GeoJSON FeatureCollection.
/// Original properties are preserved; derived fields are appended.
pub(crate) fn enriched_geojson_bytes(segments: &[StreetSegment]) -> Result<Vec<u8>> {
    let features = segments.iter().map(segment_to_feature).collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert(
        "crs".to_string(),
        json!({"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}}),
    );

    let fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    };
    serde_json::to_vec(&fc).context("[io::write] Failed to serialize enriched layer")
}

fn segment_to_feature(seg: &StreetSegment) -> Feature {
    let mut properties = seg.properties.clone();
    properties.insert("speed_num".to_string(), json!(seg.speed.value));
    properties.insert("segment_length_m".to_string(), json!(seg.segment_length_m));
    properties.insert("addr_count".to_string(), json!(seg.addr_count));
    properties.insert("road_class_w".to_string(), json!(seg.road_class_w));
    properties.insert("addr_norm".to_string(), json!(seg.addr_norm));
    properties.insert("speed_norm".to_string(), json!(seg.speed_norm));
    properties.insert("len_norm".to_string(), json!(seg.len_norm));
    properties.insert("class_norm".to_string(), json!(seg.class_norm));
    properties.insert("traffic_proxy".to_string(), json!(seg.traffic_proxy));
    properties.insert("priority_score".to_string(), json!(seg.priority_score));
    properties.insert("priority_band".to_string(), json!(seg.priority_band.label()));

    Feature {
        bbox: None,
        geometry: seg
            .geometry
            .as_ref()
            .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Write `bytes` to a temp file next to `path` and rename it into place, so
/// a failed run never leaves a partial output behind.
pub(crate) fn persist_atomic(bytes: &[u8], path: &Path) -> Result<()> {
    common::ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("[io::write] Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("[io::write] Failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| anyhow!("[io::write] Failed to persist {}: {e}", path.display()))?;
    Ok(())
}
