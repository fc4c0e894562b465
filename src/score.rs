//! Feature normalization, road-class weighting, the composite score, and
//! quantile banding.

use crate::config::PipelineConfig;
use crate::layer::PriorityBand;

/// Ordered road-class rules. Later rules override earlier ones for the same
/// value (last-match-wins); the order is part of the contract, so this is a
/// slice and not a map.
const ROAD_CLASS_RULES: &[(&[&str], f64)] = &[
    (&["HIGHWAY", "FREEWAY"], 1.00),
    (&["ARTERIAL"], 0.85),
    (&["COLLECTOR"], 0.70),
    (&["LOCAL", "RESIDENT"], 0.45),
    (&["RAMP"], 0.60),
];

/// Maintenance importance weight for a road classification.
/// Unmatched or unfamiliar values keep the default 1.0.
pub(crate) fn road_class_weight(road_class: &str) -> f64 {
    let upper = road_class.to_uppercase();
    let mut weight = 1.0;
    for (patterns, rule_weight) in ROAD_CLASS_RULES {
        if patterns.iter().any(|p| upper.contains(p)) {
            weight = *rule_weight;
        }
    }
    weight
}

/// Min-max normalization of a column into [0,1].
///
/// Non-finite inputs are excluded from the range and normalize to 0.0. A
/// degenerate range (constant column, or nothing finite) maps everything to
/// 0.0 rather than dividing by zero or inventing a ranking.
pub(crate) fn minmax(values: &[f64]) -> Vec<f64> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() || hi == lo {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                (v - lo) / (hi - lo)
            } else {
                0.0
            }
        })
        .collect()
}

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Traffic proxy: blend of address density and posted speed.
pub(crate) fn traffic_proxy(cfg: &PipelineConfig, addr_norm: f64, speed_norm: f64) -> f64 {
    let (w_addr, w_speed) = cfg.traffic_weights;
    w_addr * finite_or_zero(addr_norm) + w_speed * finite_or_zero(speed_norm)
}

/// Composite priority score on a 0-100 scale, rounded to 2 decimals.
pub(crate) fn priority_score(
    cfg: &PipelineConfig,
    traffic_proxy: f64,
    class_norm: f64,
    len_norm: f64,
) -> f64 {
    let (w_traffic, w_class, w_len) = cfg.score_weights;
    let raw = w_traffic * finite_or_zero(traffic_proxy)
        + w_class * finite_or_zero(class_norm)
        + w_len * finite_or_zero(len_norm);
    (100.0 * raw * 100.0).round() / 100.0
}

/// Equal-frequency (quantile) banding over the full score distribution.
///
/// Rank-based: stable sort by (score, input order), provisional band
/// `rank * band_count / n`, then every run of equal scores collapses to the
/// band of its lowest-ranked member. Equal scores therefore always share a
/// band, and degenerate distributions (fewer distinct values than bands)
/// collapse to fewer effective bands instead of failing.
pub(crate) fn assign_bands(scores: &[f64], band_count: usize) -> Vec<PriorityBand> {
    let n = scores.len();
    if n == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));

    let mut assigned = vec![0usize; n];
    let mut pos = 0;
    while pos < n {
        let run_score = scores[order[pos]];
        let mut end = pos + 1;
        while end < n && scores[order[end]] == run_score {
            end += 1;
        }
        let band = pos * band_count / n;
        for &idx in &order[pos..end] {
            assigned[idx] = band;
        }
        pos = end;
    }

    assigned.into_iter().map(PriorityBand::from_index).collect()
}
