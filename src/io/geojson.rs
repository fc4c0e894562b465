//! GeoJSON input: parse the two raw layers into typed structs.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::Geometry;
use geojson::{Feature, FeatureCollection, GeoJson};
use serde_json::Value;

use crate::common;
use crate::crs::declared_crs;
use crate::layer::{
    coerce_f64, coerce_text, AddressLayer, AddressPoint, PriorityBand, StreetLayer, StreetSegment,
};

/// Read and parse a file as a GeoJSON FeatureCollection.
pub(crate) fn read_feature_collection(path: &Path) -> Result<FeatureCollection> {
    common::require_file_exists(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    let geojson: GeoJson = text.parse().with_context(|| {
        format!(
            "[io::geojson] Failed to parse {} as GeoJSON. This tool expects an \
             RFC 7946 FeatureCollection; re-export the layer or check the \
             exporting tool's GeoJSON driver version.",
            path.display()
        )
    })?;
    match geojson {
        GeoJson::FeatureCollection(fc) => Ok(fc),
        other => bail!(
            "[io::geojson] {} is valid GeoJSON but not a FeatureCollection (got {})",
            path.display(),
            match other {
                GeoJson::Geometry(_) => "a bare geometry",
                GeoJson::Feature(_) => "a single feature",
                GeoJson::FeatureCollection(_) => unreachable!(),
            }
        ),
    }
}

fn feature_objectid(feature: &Feature, layer: &str, idx: usize) -> Result<i64> {
    let value = feature
        .property("objectid")
        .ok_or_else(|| anyhow!("[io::geojson] {layer} feature {idx} has no objectid"))?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| anyhow!("[io::geojson] {layer} feature {idx}: objectid {n} is not integral")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| anyhow!("[io::geojson] {layer} feature {idx}: objectid '{s}' is not numeric")),
        other => bail!("[io::geojson] {layer} feature {idx}: objectid has unexpected type {other}"),
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn feature_geometry(feature: &Feature, layer: &str, idx: usize) -> Result<Option<Geometry<f64>>> {
    let Some(gj) = feature.geometry.as_ref() else {
        return Ok(None);
    };
    let geometry = Geometry::<f64>::try_from(gj.clone()).map_err(|e| {
        anyhow!("[io::geojson] {layer} feature {idx}: unsupported geometry: {e}")
    })?;
    Ok(Some(geometry))
}

/// Read the street network layer. Per-row data-quality problems (missing
/// speed, odd road class text) are coerced, never fatal; a broken unique key
/// or a non-polyline geometry is structural and aborts the run.
pub(crate) fn read_street_layer(path: &Path) -> Result<StreetLayer> {
    let fc = read_feature_collection(path)?;
    let crs = declared_crs(fc.foreign_members.as_ref(), "streets")?;

    let mut segments = Vec::with_capacity(fc.features.len());
    for (idx, feature) in fc.features.iter().enumerate() {
        let objectid = feature_objectid(feature, "street", idx)?;
        let geometry = feature_geometry(feature, "street", idx)?;
        if let Some(geometry) = &geometry {
            if !matches!(
                geometry,
                Geometry::LineString(_) | Geometry::MultiLineString(_)
            ) {
                bail!(
                    "[io::geojson] street feature {idx} (objectid {objectid}) is not a \
                     polyline; the street layer must contain LineString/MultiLineString \
                     geometry"
                );
            }
        }
        let properties = feature.properties.clone().unwrap_or_default();

        segments.push(StreetSegment {
            objectid,
            streets_id: optional_text(properties.get("streets_id")),
            label: optional_text(properties.get("label")).unwrap_or_default(),
            road_class: coerce_text(properties.get("road_class")),
            speed: coerce_f64(properties.get("speed")),
            geometry,
            properties,
            segment_length_m: 0.0,
            addr_count: 0,
            road_class_w: 1.0,
            addr_norm: 0.0,
            speed_norm: 0.0,
            len_norm: 0.0,
            class_norm: 0.0,
            traffic_proxy: 0.0,
            priority_score: 0.0,
            priority_band: PriorityBand::VeryLow,
        });
    }

    Ok(StreetLayer { crs, segments })
}

/// Read the civic address layer. Points only.
pub(crate) fn read_address_layer(path: &Path) -> Result<AddressLayer> {
    let fc = read_feature_collection(path)?;
    let crs = declared_crs(fc.foreign_members.as_ref(), "addresses")?;

    let mut points = Vec::with_capacity(fc.features.len());
    for (idx, feature) in fc.features.iter().enumerate() {
        let objectid = feature_objectid(feature, "address", idx)?;
        match feature_geometry(feature, "address", idx)? {
            Some(Geometry::Point(point)) => points.push(AddressPoint { objectid, point }),
            Some(_) => bail!(
                "[io::geojson] address feature {idx} (objectid {objectid}) is not a Point"
            ),
            // Address rows without geometry cannot join to anything; skip.
            None => continue,
        }
    }

    Ok(AddressLayer { crs, points })
}
