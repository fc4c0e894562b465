//! Buffered spatial join: address density per street segment.
//!
//! Every segment's 30 m buffer is never materialized as a polygon; a point
//! lies strictly inside the round-capped buffer exactly when its distance to
//! the centerline is strictly below the radius. Candidates come from an
//! R-tree over the address points, queried with the segment's bounding rect
//! expanded by the radius, so the join stays near-linear instead of
//! O(segments x addresses).

use geo::{Geometry, Point};
use rstar::{RTree, RTreeObject, AABB};

use crate::geom::{distance_to_polyline, polyline_bounds};
use crate::layer::AddressPoint;

#[derive(Debug, Clone)]
struct IndexedAddress {
    point: Point<f64>,
}

impl RTreeObject for IndexedAddress {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x(), self.point.y()])
    }
}

/// Read-only spatial index over the address layer. Built once per run and
/// shared across worker threads during the counting stage.
pub(crate) struct AddressIndex {
    rtree: RTree<IndexedAddress>,
}

impl AddressIndex {
    pub fn build(points: &[AddressPoint]) -> Self {
        let objects = points
            .iter()
            .map(|a| IndexedAddress { point: a.point })
            .collect();
        Self {
            rtree: RTree::bulk_load(objects),
        }
    }

    /// Number of address points strictly within `radius` of the polyline.
    pub fn count_within(&self, geometry: Option<&Geometry<f64>>, radius: f64) -> u32 {
        let Some(geometry) = geometry else { return 0 };
        let Some(rect) = polyline_bounds(geometry) else { return 0 };

        let search = AABB::from_corners(
            [rect.min().x - radius, rect.min().y - radius],
            [rect.max().x + radius, rect.max().y + radius],
        );

        self.rtree
            .locate_in_envelope_intersecting(&search)
            .filter(|cand| {
                distance_to_polyline(&cand.point, geometry)
                    .is_some_and(|d| d < radius)
            })
            .count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn addr(objectid: i64, x: f64, y: f64) -> AddressPoint {
        AddressPoint {
            objectid,
            point: Point::new(x, y),
        }
    }

    #[test]
    fn near_point_counts_far_point_does_not() {
        // Segment A along y=0, segment B along y=500; one address 10 m from
        // A and 200 m from nothing else within reach.
        let index = AddressIndex::build(&[addr(1, 50.0, 10.0)]);

        let a = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]);
        let b = Geometry::LineString(line_string![(x: 0.0, y: 210.0), (x: 100.0, y: 210.0)]);

        assert_eq!(index.count_within(Some(&a), 30.0), 1);
        assert_eq!(index.count_within(Some(&b), 30.0), 0);
    }

    #[test]
    fn overlapping_buffers_count_the_same_point_twice() {
        // Two parallel segments 20 m apart; a point between them is within
        // 30 m of both. Counts are per-segment, not globally deduplicated.
        let index = AddressIndex::build(&[addr(1, 50.0, 10.0)]);

        let a = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]);
        let b = Geometry::LineString(line_string![(x: 0.0, y: 20.0), (x: 100.0, y: 20.0)]);

        assert_eq!(index.count_within(Some(&a), 30.0), 1);
        assert_eq!(index.count_within(Some(&b), 30.0), 1);
    }

    #[test]
    fn containment_is_strict() {
        let index = AddressIndex::build(&[addr(1, 50.0, 30.0)]);
        let seg = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]);
        // Exactly on the buffer boundary: not strictly contained.
        assert_eq!(index.count_within(Some(&seg), 30.0), 0);
        assert_eq!(index.count_within(Some(&seg), 30.0 + 1e-9), 1);
    }

    #[test]
    fn missing_geometry_counts_zero() {
        let index = AddressIndex::build(&[addr(1, 0.0, 0.0)]);
        assert_eq!(index.count_within(None, 30.0), 0);
    }

    #[test]
    fn empty_index_counts_zero() {
        let index = AddressIndex::build(&[]);
        let seg = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 100.0, y: 0.0)]);
        assert_eq!(index.count_within(Some(&seg), 30.0), 0);
    }
}
