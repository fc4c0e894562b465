//! Fixed pipeline configuration.

/// Immutable configuration for one scoring run.
///
/// All constants are fixed at build time; the struct exists so the pipeline
/// entry point takes one explicit value instead of reaching for globals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// EPSG code of the projected CRS used for buffering and lengths (meters).
    pub projected_epsg: u32,
    /// EPSG code of the geographic CRS used for output (web maps).
    pub geographic_epsg: u32,
    /// Buffer radius around each segment, in projected units (meters).
    pub buffer_radius_m: f64,
    /// Traffic proxy blend: (addr_norm weight, speed_norm weight).
    pub traffic_weights: (f64, f64),
    /// Composite score blend: (traffic_proxy, class_norm, len_norm) weights.
    pub score_weights: (f64, f64, f64),
    /// Number of quantile bands.
    pub band_count: usize,
    /// Number of rows in the top-priority extract.
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            // NAD83 / Alberta 10-TM (Forest), meters
            projected_epsg: 3400,
            geographic_epsg: 4326,
            buffer_radius_m: 30.0,
            traffic_weights: (0.7, 0.3),
            score_weights: (0.5, 0.3, 0.2),
            band_count: 5,
            top_n: 50,
        }
    }
}
