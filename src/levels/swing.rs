// =============================================================================
// Swing Detector — fractal local extrema
// =============================================================================
//
// For each bar i with k <= i < n - k, compare against the closed window
// [i - k, i + k]:
//   high_i >= max(high) over the window  => resistance candidate at high_i
//   low_i  <= min(low)  over the window  => support candidate at low_i
//
// A single bar may emit both.  Equal highs inside one window all qualify.

use crate::market_data::Bar;
use crate::types::Side;

use super::level::SrLevel;

/// Find raw swing candidates with fractal half-width `swing_window`.
///
/// Returns an empty list when the slice is shorter than `2k + 1`.  A window of
/// zero makes every bar a swing on both sides.
pub fn find_swings(bars: &[Bar], swing_window: usize) -> Vec<SrLevel> {
    let k = swing_window;
    if bars.len() < 2 * k + 1 {
        return Vec::new();
    }

    let mut out = Vec::new();
    for i in k..bars.len() - k {
        let window = &bars[i - k..=i + k];
        let hi = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lo = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        let bar = &bars[i];
        if bar.high >= hi {
            out.push(SrLevel::candidate(bar.high, Side::Resistance, bar.timestamp));
        }
        if bar.low <= lo {
            out.push(SrLevel::candidate(bar.low, Side::Support, bar.timestamp));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn hl(highs_lows: &[(f64, f64)]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        highs_lows
            .iter()
            .enumerate()
            .map(|(i, &(h, l))| {
                let mid = (h + l) / 2.0;
                Bar::new(start + Duration::days(i as i64), mid, h, l, mid, 10.0)
            })
            .collect()
    }

    #[test]
    fn too_short_yields_nothing() {
        let bars = hl(&[(10.0, 9.0), (11.0, 10.0), (10.0, 9.0), (9.0, 8.0)]);
        assert!(find_swings(&bars, 2).is_empty());
    }

    #[test]
    fn detects_peak_and_trough() {
        let bars = hl(&[
            (10.0, 9.0),
            (11.0, 10.0),
            (14.0, 12.0), // swing high at i=2
            (11.0, 10.0),
            (10.0, 9.0),
            (9.0, 7.0), // swing low at i=5
            (10.0, 9.0),
            (11.0, 10.0),
        ]);
        let swings = find_swings(&bars, 2);
        let res: Vec<_> = swings.iter().filter(|s| s.side == Side::Resistance).collect();
        let sup: Vec<_> = swings.iter().filter(|s| s.side == Side::Support).collect();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].price, 14.0);
        assert_eq!(res[0].first_seen, bars[2].timestamp);
        assert_eq!(sup.len(), 1);
        assert_eq!(sup[0].price, 7.0);
        assert!(swings.iter().all(|s| s.touches == 1));
    }

    #[test]
    fn edges_are_never_swings() {
        // Highest high on the first bar, lowest low on the last bar.
        let bars = hl(&[(20.0, 9.0), (11.0, 10.0), (12.0, 10.5), (11.0, 10.0), (10.0, 1.0)]);
        let swings = find_swings(&bars, 1);
        assert!(swings.iter().all(|s| s.price != 20.0 && s.price != 1.0));
    }

    #[test]
    fn one_bar_can_emit_both_sides() {
        // An outside bar: highest high and lowest low of its window.
        let bars = hl(&[(10.0, 9.0), (12.0, 7.0), (10.0, 9.0)]);
        let swings = find_swings(&bars, 1);
        assert_eq!(swings.len(), 2);
        assert!(swings.iter().any(|s| s.side == Side::Resistance && s.price == 12.0));
        assert!(swings.iter().any(|s| s.side == Side::Support && s.price == 7.0));
    }

    #[test]
    fn equal_highs_both_qualify() {
        let bars = hl(&[(10.0, 9.0), (12.0, 10.0), (12.0, 10.0), (10.0, 9.0)]);
        let swings = find_swings(&bars, 1);
        let highs = swings.iter().filter(|s| s.side == Side::Resistance).count();
        assert_eq!(highs, 2);
    }
}
