//! KPI summary over the scored street layer, written as markdown.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{bail, Result};
use geojson::Feature;
use serde_json::Value;
use tracing::info;

use crate::cli::{Cli, ReportArgs};
use crate::io::geojson::read_feature_collection;
use crate::io::write::persist_atomic;

struct Row {
    label: String,
    road_class: String,
    speed: String,
    addr_count: i64,
    segment_length_m: f64,
    priority_score: f64,
    priority_band: String,
}

pub fn run(_cli: &Cli, args: &ReportArgs) -> Result<()> {
    let fc = read_feature_collection(&args.input)?;
    if fc.features.is_empty() {
        bail!("[report] {} contains no features", args.input.display());
    }

    let rows: Vec<Row> = fc.features.iter().map(row_from_feature).collect();
    let markdown = render_markdown(&rows);
    persist_atomic(markdown.as_bytes(), &args.output)?;
    info!(output = %args.output.display(), segments = rows.len(), "KPI summary written");
    println!("Wrote: {}", args.output.display());
    Ok(())
}

fn text(feature: &Feature, key: &str) -> String {
    match feature.property(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn number(feature: &Feature, key: &str) -> f64 {
    match feature.property(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn row_from_feature(feature: &Feature) -> Row {
    Row {
        label: text(feature, "label"),
        road_class: text(feature, "road_class"),
        speed: text(feature, "speed"),
        addr_count: number(feature, "addr_count") as i64,
        segment_length_m: number(feature, "segment_length_m"),
        priority_score: number(feature, "priority_score"),
        priority_band: text(feature, "priority_band"),
    }
}

fn render_markdown(rows: &[Row]) -> String {
    let total = rows.len();
    let high = rows
        .iter()
        .filter(|r| r.priority_band == "High" || r.priority_band == "Very High")
        .count();
    let vhigh = rows
        .iter()
        .filter(|r| r.priority_band == "Very High")
        .count();
    let mean = rows.iter().map(|r| r.priority_score).sum::<f64>() / total as f64;
    let max = rows
        .iter()
        .map(|r| r.priority_score)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut md = String::new();
    md.push_str("# KPI Summary\n\n");
    let _ = writeln!(md, "- Total road segments analyzed: **{total}**");
    let _ = writeln!(
        md,
        "- High + Very High priority segments: **{high}** ({:.1}%)",
        100.0 * high as f64 / total as f64
    );
    let _ = writeln!(
        md,
        "- Very High priority segments: **{vhigh}** ({:.1}%)",
        100.0 * vhigh as f64 / total as f64
    );
    let _ = writeln!(md, "- Average priority score: **{mean:.2}**");
    let _ = writeln!(md, "- Max priority score: **{max:.2}**");

    md.push_str("\n## Top 5 Priority Segments\n\n");
    md.push_str("| label | road_class | speed | addr_count | segment_length_m | priority_score | priority_band |\n");
    md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        rows[b]
            .priority_score
            .total_cmp(&rows[a].priority_score)
            .then(a.cmp(&b))
    });
    for &idx in order.iter().take(5) {
        let r = &rows[idx];
        let _ = writeln!(
            md,
            "| {} | {} | {} | {} | {:.1} | {:.2} | {} |",
            r.label,
            r.road_class,
            r.speed,
            r.addr_count,
            r.segment_length_m,
            r.priority_score,
            r.priority_band
        );
    }

    md.push_str("\n## Top Road Classes by Average Priority Score (Top 10)\n\n");
    md.push_str("| road_class | count | mean | max |\n");
    md.push_str("| --- | --- | --- | --- |\n");
    let mut by_class: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for r in rows {
        let entry = by_class
            .entry(r.road_class.as_str())
            .or_insert((0, 0.0, f64::NEG_INFINITY));
        entry.0 += 1;
        entry.1 += r.priority_score;
        entry.2 = entry.2.max(r.priority_score);
    }
    let mut classes: Vec<(&str, usize, f64, f64)> = by_class
        .into_iter()
        .map(|(class, (count, sum, max))| (class, count, sum / count as f64, max))
        .collect();
    classes.sort_by(|a, b| b.2.total_cmp(&a.2));
    for (class, count, mean, max) in classes.into_iter().take(10) {
        let _ = writeln!(md, "| {class} | {count} | {mean:.2} | {max:.2} |");
    }

    md
}
