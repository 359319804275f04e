// =============================================================================
// Level Clusterer — greedy 1-D clustering on price
// =============================================================================
//
// Stage A (within one window):
//   tolerance = max(ATR * tolerance_factor, (maxHigh - minLow) * 0.005)
//   Candidates are sorted by price and walked once.  A candidate within
//   `tolerance` of the running cluster price is merged into it (touch-weighted
//   price, summed touches, widened seen interval); otherwise it opens a new
//   cluster.
//
// Stage B (across windows):
//   tolerance = max(median(ATR) * 0.5, 0.005 * (max level price - min level price))
//   Same walk over the stage-A outputs of every window, tagged with the window
//   size, so `sources` accumulates the contributing windows.
//
// Supports and resistances are clustered independently and never merge.
//
// The walk is a single left-to-right pass with no back-merging.  Cluster
// boundaries therefore depend on sorted-price order (ties keep input order);
// no attempt is made at a globally optimal partition.
// =============================================================================

use crate::market_data::bar::price_extent;
use crate::market_data::Bar;
use crate::types::Side;

use super::level::SrLevel;

/// Floor on a window's price range so a flat window still gets a tolerance.
const MIN_PRICE_RANGE: f64 = 1e-9;

/// Fraction of the price range used as the minimum clustering tolerance.
const RANGE_TOLERANCE_FRACTION: f64 = 0.005;

/// Fraction of the median ATR used as the cross-window tolerance.
const CROSS_WINDOW_ATR_FACTOR: f64 = 0.5;

/// Stage-A tolerance for one window's bars.
pub fn window_tolerance(bars: &[Bar], atr: f64, tolerance_factor: f64) -> f64 {
    let range = price_extent(bars).map_or(0.0, |(lo, hi)| hi - lo);
    (atr * tolerance_factor).max(range.max(MIN_PRICE_RANGE) * RANGE_TOLERANCE_FRACTION)
}

/// Stage-B tolerance from the per-window ATRs and the pooled level prices.
pub fn cross_window_tolerance(atrs: &[f64], levels: &[SrLevel]) -> f64 {
    let (lo, hi) = levels.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), l| {
        (lo.min(l.price), hi.max(l.price))
    });
    let range = if levels.is_empty() { 0.0 } else { hi - lo };
    (median(atrs) * CROSS_WINDOW_ATR_FACTOR).max(RANGE_TOLERANCE_FRACTION * range)
}

/// Median of `values`; 0.0 when empty, mean of the middle pair when even.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        0.5 * (sorted[mid - 1] + sorted[mid])
    }
}

/// Greedy same-side clustering of `levels` within `tolerance`.
///
/// Output holds supports (ascending price) followed by resistances (ascending
/// price).  Source sets are unioned on merge, so this one routine serves both
/// stage A (candidates carry no sources) and stage B.
pub fn cluster_levels(levels: &[SrLevel], tolerance: f64) -> Vec<SrLevel> {
    let mut out = cluster_side(levels, Side::Support, tolerance);
    out.extend(cluster_side(levels, Side::Resistance, tolerance));
    out
}

fn cluster_side(levels: &[SrLevel], side: Side, tolerance: f64) -> Vec<SrLevel> {
    let mut side_levels: Vec<&SrLevel> = levels.iter().filter(|l| l.side == side).collect();
    side_levels.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut iter = side_levels.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut clusters = Vec::new();
    let mut current = first.clone();
    for level in iter {
        if (level.price - current.price).abs() <= tolerance {
            current = current.merged_with(level);
        } else {
            clusters.push(std::mem::replace(&mut current, level.clone()));
        }
    }
    clusters.push(current);
    clusters
}

/// Stage B: pool every window's stage-A levels (tagged with the window size)
/// and cluster them again within `tolerance`.
pub fn merge_across_windows(window_levels: &[(u32, Vec<SrLevel>)], tolerance: f64) -> Vec<SrLevel> {
    let tagged: Vec<SrLevel> = window_levels
        .iter()
        .flat_map(|(window, levels)| levels.iter().map(move |l| l.with_source(*window)))
        .collect();
    cluster_levels(&tagged, tolerance)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn sup(price: f64, day: i64) -> SrLevel {
        SrLevel::candidate(price, Side::Support, at(day))
    }

    fn res(price: f64, day: i64) -> SrLevel {
        SrLevel::candidate(price, Side::Resistance, at(day))
    }

    #[test]
    fn empty_input_yields_no_levels() {
        assert!(cluster_levels(&[], 1.0).is_empty());
    }

    #[test]
    fn merges_within_tolerance() {
        let out = cluster_levels(&[sup(100.0, 1), sup(100.4, 5), sup(103.0, 3)], 0.5);
        assert_eq!(out.len(), 2);
        assert!((out[0].price - 100.2).abs() < 1e-12);
        assert_eq!(out[0].touches, 2);
        assert_eq!(out[0].first_seen, at(1));
        assert_eq!(out[0].last_seen, at(5));
        assert_eq!(out[1].price, 103.0);
    }

    #[test]
    fn sides_never_merge() {
        let out = cluster_levels(&[sup(100.0, 1), res(100.0, 2)], 10.0);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].side, Side::Support);
        assert_eq!(out[1].side, Side::Resistance);
    }

    #[test]
    fn greedy_pass_drifts_with_running_price() {
        // 100 and 100.9 merge (gap 0.9 <= 1.0) into 100.45; 101.5 is 1.05 from
        // that running price, so it starts a new cluster even though it is
        // only 0.6 from its neighbour.
        let out = cluster_levels(&[sup(100.9, 1), sup(100.0, 1), sup(101.5, 1)], 1.0);
        assert_eq!(out.len(), 2);
        assert!((out[0].price - 100.45).abs() < 1e-12);
        assert_eq!(out[1].price, 101.5);
    }

    #[test]
    fn clustered_price_within_tolerance_of_members() {
        let tol = 0.75;
        let raw = vec![sup(10.0, 0), sup(10.5, 1), sup(10.6, 2), sup(12.0, 3), sup(12.7, 4)];
        let out = cluster_levels(&raw, tol);
        assert_eq!(out.len(), 2);
        // Days rise with price here, so each member is found by its day.
        for member in &raw {
            let cluster = out
                .iter()
                .find(|c| c.first_seen <= member.first_seen && member.first_seen <= c.last_seen)
                .unwrap();
            assert!((member.price - cluster.price).abs() <= tol);
        }
        let total: u32 = out.iter().map(|l| l.touches).sum();
        assert_eq!(total, raw.len() as u32);
    }

    #[test]
    fn clustering_is_idempotent() {
        let raw: Vec<SrLevel> = [50.0, 50.2, 50.9, 52.0, 52.1, 55.0, 55.05, 55.6]
            .iter()
            .enumerate()
            .flat_map(|(i, &p)| [sup(p, i as i64), res(p + 3.0, i as i64)])
            .collect();
        let once = cluster_levels(&raw, 0.5);
        let twice = cluster_levels(&once, 0.5);
        assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(&twice) {
            assert_eq!(a.side, b.side);
            assert_eq!(a.touches, b.touches);
            assert!((a.price - b.price).abs() < 1e-12);
        }
    }

    #[test]
    fn cross_window_merge_tracks_sources_and_touches() {
        let w7 = vec![SrLevel { touches: 2, ..sup(99.9, 10) }, res(120.0, 11)];
        let w30 = vec![SrLevel { touches: 3, ..sup(100.1, 4) }, res(130.0, 2)];
        let merged = merge_across_windows(&[(7, w7), (30, w30)], 0.5);

        assert_eq!(merged.len(), 3);
        let support = &merged[0];
        assert_eq!(support.touches, 5);
        assert_eq!(support.sources.iter().copied().collect::<Vec<_>>(), vec![7, 30]);
        assert_eq!(support.first_seen, at(4));
        assert_eq!(support.last_seen, at(10));
        assert!(merged.iter().all(|l| !l.sources.is_empty()));
        let total: u32 = merged.iter().map(|l| l.touches).sum();
        assert_eq!(total, 2 + 1 + 3 + 1);
    }

    #[test]
    fn median_odd_even_empty() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn window_tolerance_uses_range_floor() {
        let start = at(0);
        let bars: Vec<Bar> = (0..20)
            .map(|i| Bar::new(start + Duration::days(i), 100.0, 110.0, 90.0, 100.0, 1.0))
            .collect();
        // ATR * factor dominates: 20 * 0.5 = 10 vs 20 * 0.005 = 0.1
        assert!((window_tolerance(&bars, 20.0, 0.5) - 10.0).abs() < 1e-12);
        // Tiny ATR: range floor wins.
        assert!((window_tolerance(&bars, 0.0, 0.5) - 0.1).abs() < 1e-12);
        // Flat window: 1e-9 range floor.
        assert!(window_tolerance(&bars[..0], 0.0, 0.5) > 0.0);
    }

    #[test]
    fn cross_window_tolerance_takes_max() {
        let levels = vec![sup(100.0, 0), res(300.0, 0)];
        // median ATR 4 => 2.0; range 200 => 1.0
        assert!((cross_window_tolerance(&[2.0, 4.0, 9.0], &levels) - 2.0).abs() < 1e-12);
        // median ATR 1 => 0.5; range wins.
        assert!((cross_window_tolerance(&[1.0], &levels) - 1.0).abs() < 1e-12);
    }
}
