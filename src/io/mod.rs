//! File input/output: GeoJSON layers in, enriched GeoJSON + CSV extract out.

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod write;
