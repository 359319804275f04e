// =============================================================================
// Aggregated Support / Resistance
// =============================================================================
//
// Pipeline per lookback window (stage A):
//   1. ATR(14) of the window's bars (reported whenever computable),
//   2. swing detection with fractal half-width `swing_window`,
//   3. greedy clustering within the window tolerance.
// Then across windows (stage B):
//   4. pooled clustering with the cross-window tolerance,
//   5. touches + recency scoring,
//   6. ranking and truncation to `max_levels`.
//
// Windows with fewer than max(15, 2 * swing_window + 1) bars are skipped for
// levels but keep their ATR entry.  `analyze_window` and `combine_windows`
// are public so callers may run windows concurrently; they share no state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::indicators::atr::atr14;
use crate::market_data::{trailing, Bar};

use super::cluster::{cluster_levels, cross_window_tolerance, merge_across_windows, window_tolerance};
use super::level::SrLevel;
use super::scoring::{rank_levels, score_levels};
use super::swing::find_swings;

/// Absolute minimum number of bars for a window to contribute levels.
const MIN_WINDOW_BARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrParams {
    pub max_levels: usize,
    pub swing_window: usize,
    pub tolerance_factor: f64,
}

impl Default for SrParams {
    fn default() -> Self {
        Self {
            max_levels: 10,
            swing_window: 2,
            tolerance_factor: 0.5,
        }
    }
}

/// Aggregated support/resistance for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrResult {
    pub symbol: String,
    /// Requested windows, sorted and distinct.
    pub windows: Vec<u32>,
    /// ATR(14) per window that had at least two bars.
    pub atr14: BTreeMap<u32, f64>,
    /// Ranked by strength, at most `max_levels`.
    pub levels: Vec<SrLevel>,
}

/// Stage-A output for one lookback window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOutcome {
    pub window: u32,
    /// `None` with fewer than two bars.
    pub atr: Option<f64>,
    /// `None` when the window was skipped for insufficient bars.
    pub levels: Option<Vec<SrLevel>>,
}

/// Minimum bars a window needs to contribute levels.
pub fn min_window_bars(swing_window: usize) -> usize {
    MIN_WINDOW_BARS.max(swing_window * 2 + 1)
}

/// Run stage A for a single window's bars.
pub fn analyze_window(window: u32, bars: &[Bar], params: &SrParams) -> WindowOutcome {
    let atr = (bars.len() >= 2).then(|| atr14(bars));

    let required = min_window_bars(params.swing_window);
    if bars.len() < required {
        debug!(window, bars = bars.len(), required, "window skipped: insufficient bars");
        return WindowOutcome {
            window,
            atr,
            levels: None,
        };
    }

    let atr_value = atr.unwrap_or(0.0);
    let swings = find_swings(bars, params.swing_window);
    let tolerance = window_tolerance(bars, atr_value, params.tolerance_factor);
    let levels = cluster_levels(&swings, tolerance);

    trace!(
        window,
        swings = swings.len(),
        clusters = levels.len(),
        tolerance,
        "window clustered"
    );

    WindowOutcome {
        window,
        atr,
        levels: Some(levels),
    }
}

/// Run stage B, scoring and ranking over per-window outcomes.
pub fn combine_windows(
    symbol: &str,
    outcomes: &[WindowOutcome],
    max_levels: usize,
    now: DateTime<Utc>,
) -> SrResult {
    let mut windows: Vec<u32> = outcomes.iter().map(|o| o.window).collect();
    windows.sort_unstable();
    windows.dedup();

    let atr_map: BTreeMap<u32, f64> = outcomes
        .iter()
        .filter_map(|o| o.atr.map(|atr| (o.window, atr)))
        .collect();

    let contributing: Vec<(u32, Vec<SrLevel>)> = outcomes
        .iter()
        .filter_map(|o| o.levels.as_ref().map(|l| (o.window, l.clone())))
        .collect();
    let pooled: Vec<SrLevel> = contributing.iter().flat_map(|(_, l)| l.iter().cloned()).collect();

    let levels = if pooled.is_empty() {
        Vec::new()
    } else {
        let contributing_atrs: Vec<f64> = outcomes
            .iter()
            .filter(|o| o.levels.is_some())
            .filter_map(|o| o.atr)
            .collect();
        let tolerance = cross_window_tolerance(&contributing_atrs, &pooled);
        let merged = merge_across_windows(&contributing, tolerance);
        debug!(
            symbol,
            pooled = pooled.len(),
            merged = merged.len(),
            tolerance,
            "levels merged across windows"
        );
        rank_levels(score_levels(merged, now), max_levels)
    };

    SrResult {
        symbol: symbol.to_uppercase(),
        windows,
        atr14: atr_map,
        levels,
    }
}

/// Aggregate levels from one bar slice per window.
///
/// A window listed more than once is analysed only for its first slice.
pub fn aggregate_levels(
    symbol: &str,
    window_bars: &[(u32, &[Bar])],
    params: &SrParams,
    now: DateTime<Utc>,
) -> SrResult {
    let mut seen = Vec::with_capacity(window_bars.len());
    let outcomes: Vec<WindowOutcome> = window_bars
        .iter()
        .filter(|(window, _)| {
            if seen.contains(window) {
                false
            } else {
                seen.push(*window);
                true
            }
        })
        .map(|(window, bars)| analyze_window(*window, bars, params))
        .collect();
    combine_windows(symbol, &outcomes, params.max_levels, now)
}

/// Aggregate levels where each window is the trailing `window` bars of one
/// daily series.
pub fn aggregate_levels_from_series(
    symbol: &str,
    bars: &[Bar],
    windows: &[u32],
    params: &SrParams,
    now: DateTime<Utc>,
) -> SrResult {
    let window_bars: Vec<(u32, &[Bar])> = windows
        .iter()
        .map(|&w| (w, trailing(bars, w as usize)))
        .collect();
    aggregate_levels(symbol, &window_bars, params, now)
}
