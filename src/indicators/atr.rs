// =============================================================================
// Average True Range (ATR) — trailing simple mean
// =============================================================================
//
// True Range (TR) for each bar i >= 1:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR here is the plain mean of the last min(period, n - 1) TR values, not
// Wilder's recursive smoothing.  Level clustering tolerances depend on it.
//
// Default period: 14
// =============================================================================

use crate::market_data::Bar;

/// True range for every consecutive pair of bars (length `n - 1`).
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let (prev, cur) = (&w[0], &w[1]);
            let hl = cur.high - cur.low;
            let hc = (cur.high - prev.close).abs();
            let lc = (cur.low - prev.close).abs();
            hl.max(hc).max(lc)
        })
        .collect()
}

/// ATR as the mean of the trailing `min(period, n - 1)` true ranges.
///
/// Returns 0.0 when there are fewer than two bars or `period` is zero.
pub fn calculate_atr(bars: &[Bar], period: usize) -> f64 {
    if period == 0 || bars.len() < 2 {
        return 0.0;
    }
    let trs = true_ranges(bars);
    let n = period.min(trs.len());
    trs[trs.len() - n..].iter().sum::<f64>() / n as f64
}

/// ATR with the standard 14-period default.
pub fn atr14(bars: &[Bar]) -> f64 {
    calculate_atr(bars, 14)
}
