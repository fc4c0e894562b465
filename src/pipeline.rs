//! The scoring pipeline: one strictly-forward pass from raw layers to the
//! enriched output, per-segment stages parallelized with rayon, global
//! reductions (min/max, banding) run after the parallel stages complete.

use std::path::Path;

use anyhow::Result;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::crs::{Crs, CrsTransform};
use crate::geom::polyline_length;
use crate::io;
use crate::join::AddressIndex;
use crate::layer::AddressPoint;
use crate::score::{assign_bands, minmax, priority_score, road_class_weight, traffic_proxy};

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub segments: usize,
    pub addresses: usize,
    /// Segments with at least one address in their buffer.
    pub matched_segments: usize,
}

/// Run the full scoring pipeline and write both outputs.
///
/// Structural failures (missing file, malformed GeoJSON, missing CRS) abort
/// before anything is persisted; both output files are renamed into place
/// only after every segment has been scored and serialized.
pub fn score_network(
    cfg: &PipelineConfig,
    streets_path: &Path,
    addresses_path: &Path,
    output_path: &Path,
    top_output_path: &Path,
) -> Result<RunSummary> {
    let mut streets = io::geojson::read_street_layer(streets_path)?;
    let addresses = io::geojson::read_address_layer(addresses_path)?;
    info!(
        segments = streets.segments.len(),
        addresses = addresses.points.len(),
        "loaded input layers"
    );

    let projected = Crs::from_epsg(cfg.projected_epsg)?;
    let geographic = Crs::from_epsg(cfg.geographic_epsg)?;

    // Both layers into the shared projected CRS before any metric operation.
    let street_transform = CrsTransform::new(streets.crs, projected)?;
    streets
        .segments
        .par_iter_mut()
        .try_for_each(|seg| -> Result<()> {
            if let Some(geometry) = seg.geometry.take() {
                seg.geometry = Some(street_transform.apply(&geometry)?);
            }
            Ok(())
        })?;

    let address_transform = CrsTransform::new(addresses.crs, projected)?;
    let address_points = addresses
        .points
        .par_iter()
        .map(|a| -> Result<AddressPoint> {
            Ok(AddressPoint {
                objectid: a.objectid,
                point: address_transform.apply_point(a.point)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    debug!(crs = %projected, "layers reprojected");

    // Segment lengths in meters.
    streets
        .segments
        .par_iter_mut()
        .for_each(|seg| seg.segment_length_m = polyline_length(seg.geometry.as_ref()));

    // Address density: R-tree built once, read concurrently.
    let index = AddressIndex::build(&address_points);
    streets.segments.par_iter_mut().for_each(|seg| {
        seg.addr_count = index.count_within(seg.geometry.as_ref(), cfg.buffer_radius_m);
    });
    let matched_segments = streets
        .segments
        .iter()
        .filter(|s| s.addr_count > 0)
        .count();
    debug!(matched_segments, "buffered spatial join complete");

    // Road-class importance weight.
    streets
        .segments
        .par_iter_mut()
        .for_each(|seg| seg.road_class_w = road_class_weight(&seg.road_class.value));

    // Normalize the four feature columns over the full distribution.
    let addr: Vec<f64> = streets.segments.iter().map(|s| s.addr_count as f64).collect();
    let speed: Vec<f64> = streets.segments.iter().map(|s| s.speed.value).collect();
    let len: Vec<f64> = streets.segments.iter().map(|s| s.segment_length_m).collect();
    let class: Vec<f64> = streets.segments.iter().map(|s| s.road_class_w).collect();
    let addr_norm = minmax(&addr);
    let speed_norm = minmax(&speed);
    let len_norm = minmax(&len);
    let class_norm = minmax(&class);

    for (i, seg) in streets.segments.iter_mut().enumerate() {
        seg.addr_norm = addr_norm[i];
        seg.speed_norm = speed_norm[i];
        seg.len_norm = len_norm[i];
        seg.class_norm = class_norm[i];
        seg.traffic_proxy = traffic_proxy(cfg, seg.addr_norm, seg.speed_norm);
        seg.priority_score = priority_score(cfg, seg.traffic_proxy, seg.class_norm, seg.len_norm);
    }

    // Banding needs the full score distribution: hard barrier.
    let scores: Vec<f64> = streets.segments.iter().map(|s| s.priority_score).collect();
    let bands = assign_bands(&scores, cfg.band_count);
    for (seg, band) in streets.segments.iter_mut().zip(bands) {
        seg.priority_band = band;
    }

    // Back to geographic coordinates for web-map consumers.
    let output_transform = CrsTransform::new(projected, geographic)?;
    streets
        .segments
        .par_iter_mut()
        .try_for_each(|seg| -> Result<()> {
            if let Some(geometry) = seg.geometry.take() {
                seg.geometry = Some(output_transform.apply(&geometry)?);
            }
            Ok(())
        })?;

    // Serialize both outputs before persisting either: all-or-nothing.
    let geojson_bytes = io::write::enriched_geojson_bytes(&streets.segments)?;
    let csv_bytes = io::csv::top_extract_bytes(&streets.segments, cfg.top_n)?;
    io::write::persist_atomic(&geojson_bytes, output_path)?;
    io::write::persist_atomic(&csv_bytes, top_output_path)?;
    info!(
        output = %output_path.display(),
        top_output = %top_output_path.display(),
        "outputs written"
    );

    Ok(RunSummary {
        segments: streets.segments.len(),
        addresses: address_points.len(),
        matched_segments,
    })
}
