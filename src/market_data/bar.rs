use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
///
/// Sequences of bars are expected in ascending `timestamp` order with no
/// duplicate timestamps.  That ordering is a precondition of every engine
/// function and is not re-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Open time (UTC).
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Volume-weighted average price, when the feed supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vwap: Option<f64>,
    /// 100 * (close - prevClose) / prevClose, rounded to 2 decimals.
    #[serde(default, alias = "changePercent")]
    pub change_percent: f64,
}

impl Bar {
    /// Build a bar with no vwap and a zero change percent.  Use
    /// [`with_change_percent`] to derive the latter over a whole sequence.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            vwap: None,
            change_percent: 0.0,
        }
    }

    /// |close - open|
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn is_red(&self) -> bool {
        self.close < self.open
    }
}

// ---------------------------------------------------------------------------
// Sequence helpers
// ---------------------------------------------------------------------------

/// Percent change from `prev_close` to `close`, rounded to 2 decimals.
/// Returns 0.0 when `prev_close` is not positive.
pub fn change_percent(prev_close: f64, close: f64) -> f64 {
    if prev_close <= 0.0 {
        return 0.0;
    }
    round_to(((close - prev_close) / prev_close) * 100.0, 2)
}

/// Return the sequence with `change_percent` derived for every bar.
///
/// The first bar always gets 0.0.
pub fn with_change_percent(bars: Vec<Bar>) -> Vec<Bar> {
    let mut prev_close: Option<f64> = None;
    bars.into_iter()
        .map(|bar| {
            let pct = prev_close.map_or(0.0, |prev| change_percent(prev, bar.close));
            prev_close = Some(bar.close);
            Bar {
                change_percent: pct,
                ..bar
            }
        })
        .collect()
}

/// Percent change of the most recent close versus the one before it.
///
/// `None` with fewer than two bars or a non-positive previous close.
pub fn latest_change_percent(bars: &[Bar]) -> Option<f64> {
    let [.., prev, last] = bars else {
        return None;
    };
    if prev.close <= 0.0 {
        return None;
    }
    Some(change_percent(prev.close, last.close))
}

/// Closing prices, oldest first.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// The most recent `count` bars (or all of them when fewer exist).
pub fn trailing(bars: &[Bar], count: usize) -> &[Bar] {
    &bars[bars.len().saturating_sub(count)..]
}

/// Highest high and lowest low across the slice, `None` when empty.
pub fn price_extent(bars: &[Bar]) -> Option<(f64, f64)> {
    let first = bars.first()?;
    Some(bars.iter().fold((first.low, first.high), |(lo, hi), b| {
        (lo.min(b.low), hi.max(b.high))
    }))
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        Bar::new(ts, open, high, low, close, 1_000.0)
    }

    #[test]
    fn change_percent_first_bar_is_zero() {
        let bars = with_change_percent(vec![
            bar(1, 100.0, 101.0, 99.0, 100.0),
            bar(2, 100.0, 111.0, 99.0, 110.0),
            bar(3, 110.0, 111.0, 98.0, 99.0),
        ]);
        assert_eq!(bars[0].change_percent, 0.0);
        assert!((bars[1].change_percent - 10.0).abs() < 1e-10);
        assert!((bars[2].change_percent - -10.0).abs() < 1e-10);
    }

    #[test]
    fn change_percent_guards_non_positive_prev_close() {
        assert_eq!(change_percent(0.0, 10.0), 0.0);
        assert_eq!(change_percent(-1.0, 10.0), 0.0);
    }

    #[test]
    fn change_percent_rounds_to_two_decimals() {
        // 100 -> 100.333 = 0.333%
        assert!((change_percent(100.0, 100.333) - 0.33).abs() < 1e-10);
    }

    #[test]
    fn latest_change_needs_two_bars() {
        assert!(latest_change_percent(&[]).is_none());
        assert!(latest_change_percent(&[bar(1, 1.0, 2.0, 0.5, 1.5)]).is_none());
        let bars = vec![bar(1, 1.0, 2.0, 0.5, 2.0), bar(2, 2.0, 3.0, 1.5, 3.0)];
        assert!((latest_change_percent(&bars).unwrap() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn trailing_clamps_to_len() {
        let bars = vec![bar(1, 1.0, 2.0, 0.5, 1.5), bar(2, 1.0, 2.0, 0.5, 1.5)];
        assert_eq!(trailing(&bars, 5).len(), 2);
        assert_eq!(trailing(&bars, 1)[0].timestamp, bars[1].timestamp);
    }

    #[test]
    fn price_extent_spans_all_bars() {
        let bars = vec![bar(1, 10.0, 12.0, 9.0, 11.0), bar(2, 11.0, 15.0, 10.0, 14.0)];
        assert_eq!(price_extent(&bars), Some((9.0, 15.0)));
        assert_eq!(price_extent(&[]), None);
    }

    #[test]
    fn deserialises_camel_case_change_percent() {
        let json = r#"{
            "timestamp": "2024-01-02T00:00:00Z",
            "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5,
            "volume": 10.0, "changePercent": 1.25
        }"#;
        let b: Bar = serde_json::from_str(json).unwrap();
        assert!((b.change_percent - 1.25).abs() < 1e-12);
        assert!(b.vwap.is_none());
    }
}
