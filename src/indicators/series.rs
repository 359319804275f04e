// =============================================================================
// Indicator bundle — timestamp-tagged series for a single bar slice
// =============================================================================
//
// Every indicator series ends at the last bar, so a series of length m is
// aligned to the last m bars of the slice.  Each point carries the timestamp
// of the bar it was computed on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::atr::calculate_atr;
use super::bollinger::calculate_bollinger;
use super::ema::calculate_ema;
use super::macd::calculate_macd;
use super::rsi::calculate_rsi;
use super::sma::calculate_sma;
use crate::market_data::{closes, Bar};
use crate::types::IndicatorKind;

/// Parameters for the bundle calculator.
///
/// `period` drives SMA, EMA, RSI and Bollinger; MACD and ATR carry their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_std_dev: f64,
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            period: 20,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_std_dev: 2.0,
            atr_period: 14,
        }
    }
}

/// One indicator value tagged with its originating bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// A single aligned indicator array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub period: usize,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Tag `values` with the timestamps of the last `values.len()` bars.
    fn tail_aligned(bars: &[Bar], values: &[f64], period: usize) -> Self {
        let start = bars.len().saturating_sub(values.len());
        let points = bars[start..]
            .iter()
            .zip(values)
            .map(|(bar, &value)| IndicatorPoint {
                timestamp: bar.timestamp,
                value,
            })
            .collect();
        Self { period, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.points.last().map(|p| p.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdReport {
    pub fast: usize,
    pub slow: usize,
    pub signal_period: usize,
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerReport {
    pub std_dev: f64,
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Requested indicators only; anything not requested stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbands: Option<BollingerReport>,
    /// Single point on the last bar; empty for an empty slice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr: Option<IndicatorSeries>,
}

/// Compute the requested indicators over the closing prices of `bars`.
///
/// Short input never fails: the affected series are simply empty (ATR is 0.0
/// with fewer than two bars).
pub fn compute_indicators(
    bars: &[Bar],
    kinds: &[IndicatorKind],
    params: &IndicatorParams,
) -> IndicatorReport {
    let prices = closes(bars);
    let mut report = IndicatorReport::default();

    for kind in kinds {
        match kind {
            IndicatorKind::Sma => {
                let values = calculate_sma(&prices, params.period);
                report.sma = Some(IndicatorSeries::tail_aligned(bars, &values, params.period));
            }
            IndicatorKind::Ema => {
                let values = calculate_ema(&prices, params.period);
                report.ema = Some(IndicatorSeries::tail_aligned(bars, &values, params.period));
            }
            IndicatorKind::Rsi => {
                let values = calculate_rsi(&prices, params.period);
                report.rsi = Some(IndicatorSeries::tail_aligned(bars, &values, params.period));
            }
            IndicatorKind::Macd => {
                let out = calculate_macd(
                    &prices,
                    params.macd_fast,
                    params.macd_slow,
                    params.macd_signal,
                );
                report.macd = Some(MacdReport {
                    fast: params.macd_fast,
                    slow: params.macd_slow,
                    signal_period: params.macd_signal,
                    macd: IndicatorSeries::tail_aligned(bars, &out.macd, params.macd_slow),
                    signal: IndicatorSeries::tail_aligned(bars, &out.signal, params.macd_signal),
                    histogram: IndicatorSeries::tail_aligned(
                        bars,
                        &out.histogram,
                        params.macd_signal,
                    ),
                });
            }
            IndicatorKind::Bbands => {
                let out = calculate_bollinger(&prices, params.period, params.bollinger_std_dev);
                report.bbands = Some(BollingerReport {
                    std_dev: params.bollinger_std_dev,
                    upper: IndicatorSeries::tail_aligned(bars, &out.upper, params.period),
                    middle: IndicatorSeries::tail_aligned(bars, &out.middle, params.period),
                    lower: IndicatorSeries::tail_aligned(bars, &out.lower, params.period),
                });
            }
            IndicatorKind::Atr => {
                let values: Vec<f64> = bars
                    .last()
                    .map(|_| calculate_atr(bars, params.atr_period))
                    .into_iter()
                    .collect();
                report.atr = Some(IndicatorSeries::tail_aligned(bars, &values, params.atr_period));
            }
        }
    }

    debug!(
        bars = bars.len(),
        requested = kinds.len(),
        period = params.period,
        "indicators computed"
    );

    report
}
