//! End-to-end pipeline tests over synthetic GeoJSON fixtures near Edmonton
//! (inside the Alberta 10-TM projection the pipeline projects into).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use street_priority::{score_network, PipelineConfig};

const BASE_LON: f64 = -113.52;
const M_PER_DEG_LAT: f64 = 111_320.0;

fn lat_offset_m(meters: f64) -> f64 {
    meters / M_PER_DEG_LAT
}

fn lon_offset_m(meters: f64, lat: f64) -> f64 {
    meters / (M_PER_DEG_LAT * lat.to_radians().cos())
}

fn street_feature(objectid: i64, lat: f64, length_m: f64, road_class: &str, speed: f64) -> Value {
    let end_lon = BASE_LON + lon_offset_m(length_m, lat);
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": [[BASE_LON, lat], [end_lon, lat]]
        },
        "properties": {
            "objectid": objectid,
            "streets_id": format!("ST-{objectid}"),
            "label": format!("Segment {objectid}"),
            "road_class": road_class,
            "speed": speed
        }
    })
}

fn address_feature(objectid: i64, lat: f64, along_m: f64) -> Value {
    // 5 m north of the segment centerline: well inside the 30 m buffer.
    let lon = BASE_LON + lon_offset_m(along_m, lat);
    json!({
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [lon, lat + lat_offset_m(5.0)]},
        "properties": {"objectid": objectid}
    })
}

/// Four segments with speeds [50, 30, 60, 0], lengths [100, 50, 200, 10] m,
/// classes [Arterial, Local, Highway, Unknown], and [3, 0, 1, 10] addresses
/// inside the respective buffers. Segments sit >1 km apart so the buffers
/// never overlap.
fn write_fixtures(dir: &Path) -> (PathBuf, PathBuf) {
    let lats = [53.50, 53.51, 53.52, 53.53];
    let streets = json!({
        "type": "FeatureCollection",
        "features": [
            street_feature(1, lats[0], 100.0, "Arterial", 50.0),
            street_feature(2, lats[1], 50.0, "Local", 30.0),
            street_feature(3, lats[2], 200.0, "Highway", 60.0),
            street_feature(4, lats[3], 10.0, "Unknown", 0.0),
        ]
    });

    let mut addresses = Vec::new();
    // 3 along segment 1, none near segment 2, 1 near segment 3.
    addresses.push(address_feature(100, lats[0], 10.0));
    addresses.push(address_feature(101, lats[0], 50.0));
    addresses.push(address_feature(102, lats[0], 90.0));
    addresses.push(address_feature(103, lats[2], 100.0));
    // 10 clustered around the short segment 4.
    for i in 0..10 {
        addresses.push(address_feature(110 + i, lats[3], i as f64 * 2.0));
    }
    let addresses = json!({"type": "FeatureCollection", "features": addresses});

    let streets_path = dir.join("Street_Network.geojson");
    let addresses_path = dir.join("Civic_Address.geojson");
    fs::write(&streets_path, streets.to_string()).unwrap();
    fs::write(&addresses_path, addresses.to_string()).unwrap();
    (streets_path, addresses_path)
}

fn run_once(fixtures: &Path, out_dir: &Path) -> (Vec<Value>, String) {
    let (streets, addresses) = (
        fixtures.join("Street_Network.geojson"),
        fixtures.join("Civic_Address.geojson"),
    );
    let output = out_dir.join("streets_priority.geojson");
    let top_output = out_dir.join("top_50_priority_segments.csv");

    let summary = score_network(
        &PipelineConfig::default(),
        &streets,
        &addresses,
        &output,
        &top_output,
    )
    .unwrap();
    assert_eq!(summary.segments, 4);
    assert_eq!(summary.addresses, 14);

    let parsed: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let features = parsed["features"].as_array().unwrap().clone();
    let csv = fs::read_to_string(&top_output).unwrap();
    (features, csv)
}

fn prop<'a>(features: &'a [Value], objectid: i64, key: &str) -> &'a Value {
    features
        .iter()
        .find(|f| f["properties"]["objectid"] == json!(objectid))
        .unwrap_or_else(|| panic!("no feature with objectid {objectid}"))
        .get("properties")
        .unwrap()
        .get(key)
        .unwrap_or_else(|| panic!("no property {key}"))
}

#[test]
fn end_to_end_scenario() {
    let fixtures = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixtures(fixtures.path());

    let (features, csv) = run_once(fixtures.path(), out.path());

    // Address counts from the 30 m buffered join.
    for (objectid, expected) in [(1, 3), (2, 0), (3, 1), (4, 10)] {
        assert_eq!(
            prop(&features, objectid, "addr_count").as_i64().unwrap(),
            expected,
            "addr_count of segment {objectid}"
        );
    }

    // Segment lengths survive the projection within a few meters.
    for (objectid, expected) in [(1, 100.0), (2, 50.0), (3, 200.0), (4, 10.0)] {
        let len = prop(&features, objectid, "segment_length_m")
            .as_f64()
            .unwrap();
        assert!((len - expected).abs() < 5.0, "segment {objectid}: {len}");
    }

    // All normalized features and scores stay in range.
    for f in &features {
        let p = &f["properties"];
        for key in ["addr_norm", "speed_norm", "len_norm", "class_norm", "traffic_proxy"] {
            let v = p[key].as_f64().unwrap();
            assert!((0.0..=1.0).contains(&v), "{key} = {v}");
        }
        let score = p["priority_score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score), "priority_score = {score}");
    }

    // The address weight dominates the traffic proxy: segment 4 ("Unknown",
    // 10 addresses, speed 0) ranks highest despite its class and length.
    let proxies: Vec<f64> = [1, 2, 3, 4]
        .iter()
        .map(|id| prop(&features, *id, "traffic_proxy").as_f64().unwrap())
        .collect();
    assert!((proxies[3] - 0.7).abs() < 1e-9, "segment 4 proxy {}", proxies[3]);
    for (i, p) in proxies[..3].iter().enumerate() {
        assert!(p < &proxies[3], "segment {} proxy {p} >= segment 4", i + 1);
    }

    // Extract: header plus all four rows, sorted by descending score.
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("objectid,streets_id,label,road_class,speed"));
    let scores: Vec<f64> = lines[1..]
        .iter()
        .map(|l| l.split(',').nth(7).unwrap().parse().unwrap())
        .collect();
    for pair in scores.windows(2) {
        assert!(pair[0] >= pair[1], "extract not sorted: {scores:?}");
    }
}

#[test]
fn reruns_are_byte_identical() {
    let fixtures = tempfile::tempdir().unwrap();
    write_fixtures(fixtures.path());

    let out1 = tempfile::tempdir().unwrap();
    let out2 = tempfile::tempdir().unwrap();
    run_once(fixtures.path(), out1.path());
    run_once(fixtures.path(), out2.path());

    for name in ["streets_priority.geojson", "top_50_priority_segments.csv"] {
        let a = fs::read(out1.path().join(name)).unwrap();
        let b = fs::read(out2.path().join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between identical runs");
    }
}

#[test]
fn structural_failure_writes_nothing() {
    let fixtures = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_fixtures(fixtures.path());

    let output = out.path().join("streets_priority.geojson");
    let top_output = out.path().join("top.csv");
    let err = score_network(
        &PipelineConfig::default(),
        &fixtures.path().join("Street_Network.geojson"),
        &fixtures.path().join("Does_Not_Exist.geojson"),
        &output,
        &top_output,
    )
    .unwrap_err();

    assert!(err.to_string().contains("Does_Not_Exist.geojson"));
    assert!(!output.exists());
    assert!(!top_output.exists());
}
