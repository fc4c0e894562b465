//! Quick inspection of the raw input layers: row counts, declared CRS,
//! geometry types, and fields likely to matter for scoring.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use geojson::FeatureCollection;

use crate::cli::{Cli, ProfileArgs};
use crate::crs::declared_crs;
use crate::io::geojson::read_feature_collection;

const USEFUL_KEYWORDS: [&str; 7] = ["class", "type", "speed", "surface", "name", "length", "id"];

pub fn run(_cli: &Cli, args: &ProfileArgs) -> Result<()> {
    let streets = read_feature_collection(&args.streets)?;
    let addresses = read_feature_collection(&args.addresses)?;

    print_profile(&streets, "Street Network", &args.streets)?;
    print_profile(&addresses, "Civic Address", &args.addresses)?;
    Ok(())
}

fn print_profile(fc: &FeatureCollection, name: &str, path: &Path) -> Result<()> {
    println!("\n=== {name} ({}) ===", path.display());
    println!("Rows: {}", fc.features.len());

    match declared_crs(fc.foreign_members.as_ref(), name) {
        Ok(crs) => println!("CRS: {crs}"),
        Err(_) => println!("CRS: none declared"),
    }

    let mut geometry_types: BTreeMap<&'static str, usize> = BTreeMap::new();
    for feature in &fc.features {
        let kind = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(_)) => "Point",
            Some(geojson::Value::MultiPoint(_)) => "MultiPoint",
            Some(geojson::Value::LineString(_)) => "LineString",
            Some(geojson::Value::MultiLineString(_)) => "MultiLineString",
            Some(geojson::Value::Polygon(_)) => "Polygon",
            Some(geojson::Value::MultiPolygon(_)) => "MultiPolygon",
            Some(geojson::Value::GeometryCollection(_)) => "GeometryCollection",
            None => "(none)",
        };
        *geometry_types.entry(kind).or_default() += 1;
    }
    let mut by_count: Vec<_> = geometry_types.into_iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1));
    let types: Vec<String> = by_count
        .iter()
        .take(5)
        .map(|(kind, count)| format!("{kind} ({count})"))
        .collect();
    println!("Geometry types: {}", types.join(", "));

    // Union of property keys, in order of first appearance.
    let mut columns: Vec<String> = Vec::new();
    for feature in &fc.features {
        if let Some(props) = &feature.properties {
            for key in props.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    println!(
        "Columns (first 30): {}",
        columns.iter().take(30).cloned().collect::<Vec<_>>().join(", ")
    );

    let useful: Vec<&String> = columns
        .iter()
        .filter(|c| {
            let lower = c.to_lowercase();
            USEFUL_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .take(20)
        .collect();
    println!(
        "Likely useful fields: {}",
        useful.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    );
    Ok(())
}
