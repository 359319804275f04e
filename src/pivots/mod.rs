// =============================================================================
// Pivot Point Calculator
// =============================================================================
//
// From one completed period's (H, L, C):
//
//   standard  : P = (H + L + C) / 3
//               R1 = 2P - L        S1 = 2P - H
//               R2 = P + (H - L)   S2 = P - (H - L)
//               R3 = H + 2(P - L)  S3 = L - 2(H - P)
//   fibonacci : P as standard; Rn/Sn = P +/- {0.382, 0.618, 1.000} * (H - L)
//   camarilla : P as standard; Rn/Sn = C +/- (H - L) * {1.1/12, 1.1/6, 1.1/4}
//   woodie    : P = (H + L + 2C) / 4; R/S as standard with this P
//
// Every level is rounded to 4 decimals.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::market_data::bar::round_to;
use crate::market_data::{resample, Bar};
use crate::types::{PivotMethod, PivotTimeframe};

const PIVOT_DECIMALS: i32 = 4;

/// Camarilla multipliers for levels 1..=3.
const CAMARILLA: [f64; 3] = [1.1 / 12.0, 1.1 / 6.0, 1.1 / 4.0];

/// Fibonacci ratios for levels 1..=3.
const FIBONACCI: [f64; 3] = [0.382, 0.618, 1.0];

/// The seven price levels of one pivot computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotLevels {
    fn rounded(self) -> Self {
        let r = |v: f64| round_to(v, PIVOT_DECIMALS);
        Self {
            pivot: r(self.pivot),
            r1: r(self.r1),
            r2: r(self.r2),
            r3: r(self.r3),
            s1: r(self.s1),
            s2: r(self.s2),
            s3: r(self.s3),
        }
    }
}

fn floor_levels(pivot: f64, high: f64, low: f64) -> PivotLevels {
    PivotLevels {
        pivot,
        r1: 2.0 * pivot - low,
        s1: 2.0 * pivot - high,
        r2: pivot + (high - low),
        s2: pivot - (high - low),
        r3: high + 2.0 * (pivot - low),
        s3: low - 2.0 * (high - pivot),
    }
}

fn offset_levels(pivot: f64, anchor: f64, range: f64, factors: [f64; 3]) -> PivotLevels {
    PivotLevels {
        pivot,
        r1: anchor + range * factors[0],
        s1: anchor - range * factors[0],
        r2: anchor + range * factors[1],
        s2: anchor - range * factors[1],
        r3: anchor + range * factors[2],
        s3: anchor - range * factors[2],
    }
}

/// Pivot levels for one period's high, low and close.
pub fn calculate_pivots(high: f64, low: f64, close: f64, method: PivotMethod) -> PivotLevels {
    let typical = (high + low + close) / 3.0;
    let range = high - low;
    let levels = match method {
        PivotMethod::Standard => floor_levels(typical, high, low),
        PivotMethod::Fibonacci => offset_levels(typical, typical, range, FIBONACCI),
        PivotMethod::Camarilla => offset_levels(typical, close, range, CAMARILLA),
        PivotMethod::Woodie => floor_levels((high + low + 2.0 * close) / 4.0, high, low),
    };
    levels.rounded()
}

/// Pivot levels derived from one bar, tagged with its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotSet {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub levels: PivotLevels,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub method: PivotMethod,
    pub timeframe: PivotTimeframe,
}

impl PivotSet {
    pub fn from_bar(bar: &Bar, method: PivotMethod, timeframe: PivotTimeframe) -> Self {
        Self {
            timestamp: bar.timestamp,
            levels: calculate_pivots(bar.high, bar.low, bar.close, method),
            high: bar.high,
            low: bar.low,
            close: bar.close,
            method,
            timeframe,
        }
    }
}

/// One pivot set per trailing bar, most recent first, for
/// `min(periods, bars.len())` periods.
///
/// `bars` must already be at `timeframe` granularity.
pub fn pivot_series(
    bars: &[Bar],
    method: PivotMethod,
    timeframe: PivotTimeframe,
    periods: usize,
) -> Result<Vec<PivotSet>> {
    if periods == 0 {
        return Err(EngineError::InvalidParameter {
            name: "periods",
            reason: "must be at least 1".to_string(),
        });
    }
    if bars.is_empty() {
        return Err(EngineError::InsufficientData {
            operation: "pivot points",
            required: 1,
            actual: 0,
        });
    }

    Ok(bars
        .iter()
        .rev()
        .take(periods)
        .map(|bar| PivotSet::from_bar(bar, method, timeframe))
        .collect())
}

/// Outcome of one (timeframe, method) pivot computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PivotOutcome {
    Levels(PivotSet),
    Error { error: String },
}

impl PivotOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Latest pivot set for every timeframe and requested method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiTimeframePivots {
    pub timeframes: Vec<PivotTimeframe>,
    pub methods: Vec<PivotMethod>,
    pub pivots: BTreeMap<PivotTimeframe, BTreeMap<PivotMethod, PivotOutcome>>,
}

/// Resample `daily_bars` to daily, weekly and monthly bars and compute the
/// latest pivot set for each method.  A failing combination is recorded as an
/// error entry; the others still complete.
pub fn multi_timeframe_pivots(daily_bars: &[Bar], methods: &[PivotMethod]) -> MultiTimeframePivots {
    let mut pivots = BTreeMap::new();

    for &timeframe in PivotTimeframe::all() {
        let bars = resample(daily_bars, timeframe);
        let per_method: BTreeMap<PivotMethod, PivotOutcome> = methods
            .iter()
            .map(|&method| {
                let outcome = match pivot_series(&bars, method, timeframe, 1) {
                    Ok(mut sets) => match sets.pop() {
                        Some(set) => PivotOutcome::Levels(set),
                        None => PivotOutcome::Error {
                            error: format!("no {timeframe} pivot computed"),
                        },
                    },
                    Err(e) => {
                        warn!(%timeframe, %method, error = %e, "pivot computation failed");
                        PivotOutcome::Error { error: e.to_string() }
                    }
                };
                (method, outcome)
            })
            .collect();
        pivots.insert(timeframe, per_method);
    }

    debug!(daily_bars = daily_bars.len(), methods = methods.len(), "multi-timeframe pivots computed");

    MultiTimeframePivots {
        timeframes: PivotTimeframe::all().to_vec(),
        methods: methods.to_vec(),
        pivots,
    }
}
