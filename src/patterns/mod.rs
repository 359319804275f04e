// =============================================================================
// Candlestick Pattern Detector
// =============================================================================
//
// Doji      : |close - open| / (high - low) < 0.1        (never when high == low)
// Hammer    : lower shadow > 2 * body, upper shadow < body, body > 0
// Engulfing : needs the previous bar; the current body must be strictly larger
//             - bullish: green engulfs red (open < prev close, close > prev open)
//             - bearish: red engulfs green (open > prev close, close < prev open)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::market_data::Bar;
use crate::types::{Confidence, EngulfingDirection, PatternKind};

/// Body-to-range ratio below which a bar is a doji.
const DOJI_THRESHOLD: f64 = 0.1;

/// Minimum bars for a detection request.
const MIN_PATTERN_BARS: usize = 2;

/// A detected pattern occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternHit {
    pub timestamp: DateTime<Utc>,
    /// Index into the bar slice.
    pub position: usize,
    pub confidence: Confidence,
    /// Set for engulfing hits only.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub direction: Option<EngulfingDirection>,
}

/// Hits per pattern type; empty lists are left out of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doji: Vec<PatternHit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hammer: Vec<PatternHit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub engulfing: Vec<PatternHit>,
}

impl PatternReport {
    pub fn total(&self) -> usize {
        self.doji.len() + self.hammer.len() + self.engulfing.len()
    }
}

pub fn is_doji(bar: &Bar) -> bool {
    let range = bar.range();
    if range == 0.0 {
        return false;
    }
    bar.body() / range < DOJI_THRESHOLD
}

pub fn is_hammer(bar: &Bar) -> bool {
    let body = bar.body();
    let lower_shadow = bar.open.min(bar.close) - bar.low;
    let upper_shadow = bar.high - bar.open.max(bar.close);
    lower_shadow > 2.0 * body && upper_shadow < body && body > 0.0
}

pub fn engulfing(prev: &Bar, cur: &Bar) -> Option<EngulfingDirection> {
    if cur.body() <= prev.body() {
        return None;
    }
    if cur.is_green() && prev.is_red() && cur.open < prev.close && cur.close > prev.open {
        return Some(EngulfingDirection::Bullish);
    }
    if cur.is_red() && prev.is_green() && cur.open > prev.close && cur.close < prev.open {
        return Some(EngulfingDirection::Bearish);
    }
    None
}

/// Scan `bars` for the requested pattern kinds.
///
/// Rejects fewer than two bars with [`EngineError::InsufficientData`].
pub fn detect_patterns(bars: &[Bar], kinds: &[PatternKind]) -> Result<PatternReport> {
    if bars.len() < MIN_PATTERN_BARS {
        return Err(EngineError::InsufficientData {
            operation: "pattern detection",
            required: MIN_PATTERN_BARS,
            actual: bars.len(),
        });
    }

    let hit = |position: usize, direction: Option<EngulfingDirection>| PatternHit {
        timestamp: bars[position].timestamp,
        position,
        confidence: Confidence::High,
        direction,
    };

    let mut report = PatternReport::default();
    for (i, bar) in bars.iter().enumerate() {
        if kinds.contains(&PatternKind::Doji) && is_doji(bar) {
            report.doji.push(hit(i, None));
        }
        if kinds.contains(&PatternKind::Hammer) && is_hammer(bar) {
            report.hammer.push(hit(i, None));
        }
        if kinds.contains(&PatternKind::Engulfing) && i > 0 {
            if let Some(direction) = engulfing(&bars[i - 1], bar) {
                report.engulfing.push(hit(i, Some(direction)));
            }
        }
    }

    debug!(bars = bars.len(), hits = report.total(), "patterns detected");
    Ok(report)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ohlc(i: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap() + Duration::days(i);
        Bar::new(ts, open, high, low, close, 1.0)
    }

    #[test]
    fn doji_small_body() {
        // body/range = 0.02 / 2 = 0.01
        assert!(is_doji(&ohlc(0, 100.00, 101.0, 99.0, 100.02)));
    }

    #[test]
    fn doji_flat_bar_is_not_doji() {
        assert!(!is_doji(&ohlc(0, 50.0, 50.0, 50.0, 50.0)));
    }

    #[test]
    fn doji_threshold_is_strict() {
        // body/range = 0.2 / 2 = 0.1, not < 0.1
        assert!(!is_doji(&ohlc(0, 100.0, 101.0, 99.0, 100.2)));
    }

    #[test]
    fn hammer_long_lower_shadow() {
        // body 1, lower shadow 4, upper shadow 0.5
        assert!(is_hammer(&ohlc(0, 100.0, 101.5, 96.0, 101.0)));
    }

    #[test]
    fn hammer_requires_body() {
        assert!(!is_hammer(&ohlc(0, 100.0, 100.0, 95.0, 100.0)));
    }

    #[test]
    fn hammer_rejects_long_upper_shadow() {
        // upper shadow 3 >= body 1
        assert!(!is_hammer(&ohlc(0, 100.0, 104.0, 96.0, 101.0)));
    }

    #[test]
    fn bullish_engulfing() {
        let prev = ohlc(0, 10.0, 10.2, 8.8, 9.0);
        let cur = ohlc(1, 8.5, 10.6, 8.4, 10.5);
        assert_eq!(engulfing(&prev, &cur), Some(EngulfingDirection::Bullish));
    }

    #[test]
    fn bearish_engulfing() {
        let prev = ohlc(0, 9.0, 10.2, 8.8, 10.0);
        let cur = ohlc(1, 10.5, 10.6, 8.4, 8.5);
        assert_eq!(engulfing(&prev, &cur), Some(EngulfingDirection::Bearish));
    }

    #[test]
    fn engulfing_needs_larger_body() {
        let prev = ohlc(0, 10.0, 10.2, 7.8, 8.0);
        let cur = ohlc(1, 7.9, 10.6, 7.8, 9.9);
        // bodies equal (2.0) => none
        assert_eq!(engulfing(&prev, &cur), None);
    }

    #[test]
    fn engulfing_needs_opposite_colours() {
        let prev = ohlc(0, 9.0, 9.6, 8.9, 9.5);
        let cur = ohlc(1, 8.5, 10.6, 8.4, 10.5);
        assert_eq!(engulfing(&prev, &cur), None);
    }

    #[test]
    fn detect_rejects_single_bar() {
        let err = detect_patterns(&[ohlc(0, 1.0, 2.0, 0.5, 1.5)], PatternKind::all()).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientData {
                operation: "pattern detection",
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn detect_reports_positions_and_filters_kinds() {
        let bars = vec![
            ohlc(0, 10.0, 10.2, 8.8, 9.0),
            ohlc(1, 8.5, 10.6, 8.4, 10.5),       // bullish engulfing
            ohlc(2, 100.0, 101.0, 99.0, 100.02), // doji
        ];
        let all = detect_patterns(&bars, PatternKind::all()).unwrap();
        assert_eq!(all.engulfing.len(), 1);
        assert_eq!(all.engulfing[0].position, 1);
        assert_eq!(all.engulfing[0].timestamp, bars[1].timestamp);
        assert_eq!(all.engulfing[0].direction, Some(EngulfingDirection::Bullish));
        assert_eq!(all.doji.len(), 1);
        assert_eq!(all.doji[0].position, 2);
        assert!(all.doji[0].direction.is_none());

        let only_doji = detect_patterns(&bars, &[PatternKind::Doji]).unwrap();
        assert!(only_doji.engulfing.is_empty());
        assert_eq!(only_doji.total(), 1);
    }

    #[test]
    fn empty_lists_are_omitted_on_the_wire() {
        let bars = vec![ohlc(0, 10.0, 10.2, 8.8, 9.0), ohlc(1, 8.5, 10.6, 8.4, 10.5)];
        let report = detect_patterns(&bars, PatternKind::all()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("doji").is_none());
        assert_eq!(json["engulfing"][0]["type"], "bullish");
        assert_eq!(json["engulfing"][0]["confidence"], "high");
    }
}
