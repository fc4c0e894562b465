//! Typed views of the two input layers and their derived fields.

use geo::{Geometry, Point};
use geojson::JsonObject;
use serde_json::Value;

/// A field parsed from loosely-typed input, with a record of whether the
/// neutral default was substituted for a missing/unparseable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced<T> {
    pub value: T,
    pub substituted: bool,
}

impl<T> Coerced<T> {
    pub fn parsed(value: T) -> Self {
        Self { value, substituted: false }
    }

    pub fn defaulted(value: T) -> Self {
        Self { value, substituted: true }
    }
}

/// Coerce a JSON property to f64. Numbers pass through; numeric strings
/// parse; anything else (missing, null, non-numeric text) substitutes 0.0.
pub(crate) fn coerce_f64(value: Option<&Value>) -> Coerced<f64> {
    match value {
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => Coerced::parsed(v),
            _ => Coerced::defaulted(0.0),
        },
        Some(Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Coerced::parsed(v),
            _ => Coerced::defaulted(0.0),
        },
        _ => Coerced::defaulted(0.0),
    }
}

/// Coerce a JSON property to text. Missing/null/empty substitutes "UNKNOWN".
pub(crate) fn coerce_text(value: Option<&Value>) -> Coerced<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Coerced::parsed(s.clone()),
        Some(Value::Number(n)) => Coerced::parsed(n.to_string()),
        _ => Coerced::defaulted("UNKNOWN".to_string()),
    }
}

/// Ordinal priority band, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityBand {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl PriorityBand {
    pub const LABELS: [&'static str; 5] = ["Very Low", "Low", "Medium", "High", "Very High"];

    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::VeryLow,
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self as usize]
    }
}

impl std::fmt::Display for PriorityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One street segment: extracted input fields, the untouched original
/// property map (carried through to output), and the derived fields filled
/// in by the pipeline stages.
#[derive(Debug, Clone)]
pub struct StreetSegment {
    pub objectid: i64,
    pub streets_id: Option<String>,
    pub label: String,
    pub road_class: Coerced<String>,
    pub speed: Coerced<f64>,
    /// LineString or MultiLineString; None when the feature has null geometry.
    pub geometry: Option<Geometry<f64>>,
    /// Original GeoJSON properties, passed through to the enriched output.
    pub properties: JsonObject,

    pub segment_length_m: f64,
    pub addr_count: u32,
    pub road_class_w: f64,
    pub addr_norm: f64,
    pub speed_norm: f64,
    pub len_norm: f64,
    pub class_norm: f64,
    pub traffic_proxy: f64,
    pub priority_score: f64,
    pub priority_band: PriorityBand,
}

impl StreetSegment {
    /// Raw speed as it appeared in the input, for the tabular extract.
    pub fn speed_raw(&self) -> String {
        match self.properties.get("speed") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// One civic-address point. Consumed only by the spatial join.
#[derive(Debug, Clone)]
pub struct AddressPoint {
    pub objectid: i64,
    pub point: Point<f64>,
}

/// The street layer with its declared CRS.
#[derive(Debug, Clone)]
pub struct StreetLayer {
    pub crs: crate::crs::Crs,
    pub segments: Vec<StreetSegment>,
}

/// The address layer with its declared CRS.
#[derive(Debug, Clone)]
pub struct AddressLayer {
    pub crs: crate::crs::Crs,
    pub points: Vec<AddressPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_f64_number_passes_through() {
        let c = coerce_f64(Some(&json!(50)));
        assert_eq!(c.value, 50.0);
        assert!(!c.substituted);
    }

    #[test]
    fn coerce_f64_numeric_string_parses() {
        let c = coerce_f64(Some(&json!(" 60.5 ")));
        assert_eq!(c.value, 60.5);
        assert!(!c.substituted);
    }

    #[test]
    fn coerce_f64_garbage_substitutes_zero() {
        for v in [Some(json!("n/a")), Some(json!(null)), None] {
            let c = coerce_f64(v.as_ref());
            assert_eq!(c.value, 0.0);
            assert!(c.substituted);
        }
    }

    #[test]
    fn coerce_text_missing_substitutes_unknown() {
        let c = coerce_text(None);
        assert_eq!(c.value, "UNKNOWN");
        assert!(c.substituted);

        let c = coerce_text(Some(&json!("")));
        assert!(c.substituted);

        let c = coerce_text(Some(&json!("Arterial")));
        assert_eq!(c.value, "Arterial");
        assert!(!c.substituted);
    }

    #[test]
    fn band_labels_are_ordered() {
        assert_eq!(PriorityBand::from_index(0).label(), "Very Low");
        assert_eq!(PriorityBand::from_index(4).label(), "Very High");
        assert!(PriorityBand::VeryLow < PriorityBand::VeryHigh);
    }
}
