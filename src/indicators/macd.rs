// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow)
//   Signal    = EMA(signal) of the MACD line
//   Histogram = MACD line - Signal
//
// The fast EMA starts `slow - fast` prices earlier than the slow EMA, so its
// leading values are dropped to index-align the two.  The histogram is aligned
// to the tail of the MACD line, matching the signal line's length.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

/// MACD line, signal line and histogram.
///
/// All three series end at the last input price.  `macd` has
/// `n - slow + 1` values; `signal` and `histogram` have
/// `macd.len() - signal_period + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }
}

/// Compute MACD for `prices`.
///
/// Returns an empty series when any period is zero, `fast >= slow`, or there
/// are fewer than `slow` prices.  The signal line (and histogram) is empty when
/// the MACD line is shorter than `signal`.
pub fn calculate_macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    if fast == 0 || signal == 0 || fast >= slow || prices.len() < slow {
        return MacdSeries::default();
    }

    let fast_ema = calculate_ema(prices, fast);
    let slow_ema = calculate_ema(prices, slow);

    let offset = slow - fast;
    let macd: Vec<f64> = slow_ema
        .iter()
        .zip(fast_ema.iter().skip(offset))
        .map(|(s, f)| f - s)
        .collect();

    let signal_line = calculate_ema(&macd, signal);
    let tail = macd.len() - signal_line.len();
    let histogram = signal_line
        .iter()
        .zip(&macd[tail..])
        .map(|(s, m)| m - s)
        .collect();

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1).collect()
    }

    #[test]
    fn macd_insufficient_data() {
        assert!(calculate_macd(&wave(25), 12, 26, 9).is_empty());
    }

    #[test]
    fn macd_rejects_inverted_periods() {
        assert!(calculate_macd(&wave(60), 26, 12, 9).is_empty());
        assert!(calculate_macd(&wave(60), 0, 26, 9).is_empty());
    }

    #[test]
    fn macd_lengths() {
        let out = calculate_macd(&wave(60), 12, 26, 9);
        assert_eq!(out.macd.len(), 60 - 26 + 1);
        assert_eq!(out.signal.len(), out.macd.len() - 9 + 1);
        assert_eq!(out.histogram.len(), out.signal.len());
    }

    #[test]
    fn macd_line_matches_ema_difference() {
        let prices = wave(60);
        let out = calculate_macd(&prices, 12, 26, 9);
        let fast = calculate_ema(&prices, 12);
        let slow = calculate_ema(&prices, 26);
        // Last values are aligned on the final price.
        let expected = fast.last().unwrap() - slow.last().unwrap();
        assert!((out.macd.last().unwrap() - expected).abs() < 1e-10);
        // First MACD value uses fast EMA index slow - fast.
        let expected_first = fast[14] - slow[0];
        assert!((out.macd[0] - expected_first).abs() < 1e-10);
    }

    #[test]
    fn macd_histogram_is_tail_aligned() {
        let out = calculate_macd(&wave(60), 12, 26, 9);
        let tail = out.macd.len() - out.signal.len();
        for (i, h) in out.histogram.iter().enumerate() {
            let expected = out.macd[tail + i] - out.signal[i];
            assert!((h - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let out = calculate_macd(&[50.0; 40], 12, 26, 9);
        assert!(out.macd.iter().all(|v| v.abs() < 1e-10));
        assert!(out.histogram.iter().all(|v| v.abs() < 1e-10));
    }
}
