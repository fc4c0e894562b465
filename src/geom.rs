//! Small polyline helpers shared by the length and join stages.

use geo::{BoundingRect, EuclideanDistance, EuclideanLength, Geometry, Point, Rect};

/// Total length of a polyline geometry, in the units of its CRS.
/// Non-polyline or missing geometry contributes zero length.
pub(crate) fn polyline_length(geometry: Option<&Geometry<f64>>) -> f64 {
    match geometry {
        Some(Geometry::LineString(ls)) => ls.euclidean_length(),
        Some(Geometry::MultiLineString(mls)) => {
            mls.0.iter().map(|ls| ls.euclidean_length()).sum()
        }
        _ => 0.0,
    }
}

/// Shortest distance from a point to a polyline geometry.
/// None when the geometry is missing or has no usable parts.
pub(crate) fn distance_to_polyline(point: &Point<f64>, geometry: &Geometry<f64>) -> Option<f64> {
    match geometry {
        Geometry::LineString(ls) => {
            (!ls.0.is_empty()).then(|| point.euclidean_distance(ls))
        }
        Geometry::MultiLineString(mls) => mls
            .0
            .iter()
            .filter(|ls| !ls.0.is_empty())
            .map(|ls| point.euclidean_distance(ls))
            .min_by(|a, b| a.total_cmp(b)),
        _ => None,
    }
}

/// Bounding rect of a polyline geometry, if it has one.
pub(crate) fn polyline_bounds(geometry: &Geometry<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}
