//! Coordinate reference system handling.
//!
//! Both input layers must end up in one shared projected CRS (meters) before
//! any buffering or length computation, and the enriched output goes back to
//! a geographic CRS for web maps. Reprojection uses PROJ.4 strings through
//! `proj4rs`, radians in/out for geographic systems.

use anyhow::{anyhow, bail, Result};
use geo::{Coord, Geometry, MapCoords, Point};
use geojson::JsonObject;
use proj4rs::{proj::Proj as Proj4, transform::transform};
use serde_json::Value;

/// A coordinate reference system known to this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        proj4_string(epsg)?;
        Ok(Self { epsg })
    }

    #[inline]
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// True for lon/lat systems (coordinates in degrees).
    #[inline]
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg, 4326 | 4269)
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// PROJ.4 definition for a supported EPSG code.
fn proj4_string(epsg: u32) -> Result<&'static str> {
    match epsg {
        4326 => Ok("+proj=longlat +datum=WGS84 +no_defs +type=crs"),
        4269 => Ok("+proj=longlat +datum=NAD83 +no_defs +type=crs"),
        // NAD83 / Alberta 10-TM (Forest), meters
        3400 => Ok(
            "+proj=tmerc +lat_0=0 +lon_0=-115 +k=0.9992 +x_0=500000 +y_0=0 \
             +datum=NAD83 +units=m +no_defs +type=crs",
        ),
        _ => bail!("[crs] No PROJ.4 definition for EPSG:{epsg}"),
    }
}

/// Resolve the CRS a GeoJSON layer declares.
///
/// RFC 7946 fixes compliant GeoJSON to WGS84, so an absent legacy `crs`
/// member *is* a declaration (EPSG:4326). An explicit `"crs": null` or an
/// unrecognized name means the layer's reference system is unknown, and
/// metric operations downstream would be undefined, so that is fatal here.
pub(crate) fn declared_crs(foreign_members: Option<&JsonObject>, layer_name: &str) -> Result<Crs> {
    let member = foreign_members.and_then(|m| m.get("crs"));
    match member {
        None => Crs::from_epsg(4326),
        Some(Value::Null) => bail!(
            "[crs] Layer '{layer_name}' declares a null CRS; refusing to guess one. \
             Re-export the layer with an explicit coordinate reference system."
        ),
        Some(value) => {
            let name = value
                .get("properties")
                .and_then(|p| p.get("name"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    anyhow!("[crs] Layer '{layer_name}' has a malformed crs member: {value}")
                })?;
            parse_crs_name(name)
                .ok_or_else(|| {
                    anyhow!("[crs] Layer '{layer_name}' declares unrecognized CRS '{name}'")
                })
                .and_then(Crs::from_epsg)
        }
    }
}

/// Accepts `EPSG:nnnn`, `urn:ogc:def:crs:EPSG::nnnn`, and the CRS84 alias.
fn parse_crs_name(name: &str) -> Option<u32> {
    let upper = name.to_ascii_uppercase();
    if upper.ends_with("CRS84") {
        return Some(4326);
    }
    upper
        .rsplit(':')
        .next()
        .and_then(|code| code.parse::<u32>().ok())
}

/// A reusable transform between two CRSs, built once per pipeline stage.
pub(crate) struct CrsTransform {
    from: Proj4,
    to: Proj4,
    from_geographic: bool,
    to_geographic: bool,
}

impl CrsTransform {
    pub fn new(from: Crs, to: Crs) -> Result<Self> {
        let build = |crs: Crs| -> Result<Proj4> {
            let proj_string = proj4_string(crs.epsg())?;
            Proj4::from_proj_string(proj_string)
                .map_err(|e| anyhow!("[crs] failed to build PROJ.4 for {crs}: {e}"))
        };
        Ok(Self {
            from: build(from)?,
            to: build(to)?,
            from_geographic: from.is_geographic(),
            to_geographic: to.is_geographic(),
        })
    }

    fn apply_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let (x, y) = if self.from_geographic {
            (coord.x.to_radians(), coord.y.to_radians())
        } else {
            (coord.x, coord.y)
        };
        let mut point = (x, y, 0.0);
        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("[crs] transform failed at ({}, {}): {e}", coord.x, coord.y))?;
        let (x, y) = if self.to_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        Ok(Coord { x, y })
    }

    pub fn apply(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|c| self.apply_coord(c))
    }

    pub fn apply_point(&self, point: Point<f64>) -> Result<Point<f64>> {
        self.apply_coord(point.into()).map(Point::from)
    }
}
