// =============================================================================
// Symbol Analysis — one full engine pass over a symbol's daily bars
// =============================================================================
//
// Runs every engine component over one ascending daily series:
//   - support/resistance across the configured lookback windows,
//   - the indicator bundle and pattern scan over the trailing `lookback_days`,
//   - daily pivot series per method plus the multi-timeframe pivot table,
//   - the latest close-to-close change.
//
// "now" is supplied by the caller so the result depends only on the inputs.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::engine_config::EngineConfig;
use crate::indicators::{compute_indicators, IndicatorReport};
use crate::levels::{aggregate_levels_from_series, SrResult};
use crate::market_data::{latest_change_percent, trailing, Bar};
use crate::patterns::{detect_patterns, PatternReport};
use crate::pivots::{multi_timeframe_pivots, pivot_series, MultiTimeframePivots, PivotSet};
use crate::types::PivotTimeframe;

/// Full analytics snapshot for a single symbol.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub bar_count: usize,
    pub last_close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    pub support_resistance: SrResult,
    pub indicators: IndicatorReport,
    pub patterns: PatternReport,
    /// Daily pivot sets, most recent first within each method.
    pub pivots: Vec<PivotSet>,
    pub multi_timeframe_pivots: MultiTimeframePivots,
}

/// Analyse `bars` (ascending, daily) for `symbol`.
///
/// Fails when fewer than two bars are supplied.
pub fn analyze_symbol(
    symbol: &str,
    bars: &[Bar],
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<SymbolReport> {
    let symbol = symbol.to_uppercase();
    let Some(last) = bars.last() else {
        bail!("no bars supplied for {symbol}");
    };

    let support_resistance = aggregate_levels_from_series(
        &symbol,
        bars,
        &config.sr.windows,
        &config.sr.params(),
        now,
    );

    let recent = trailing(bars, config.lookback_days);
    let indicators = compute_indicators(recent, &config.indicators.kinds, &config.indicators.params());
    let patterns = detect_patterns(recent, &config.patterns)
        .with_context(|| format!("pattern detection failed for {symbol}"))?;

    let mut pivots = Vec::new();
    for &method in &config.pivots.methods {
        let sets = pivot_series(bars, method, PivotTimeframe::Daily, config.pivots.periods)
            .with_context(|| format!("{method} pivots failed for {symbol}"))?;
        pivots.extend(sets);
    }
    let multi = multi_timeframe_pivots(bars, &config.pivots.methods);

    debug!(
        symbol = %symbol,
        bars = bars.len(),
        levels = support_resistance.levels.len(),
        patterns = patterns.total(),
        pivots = pivots.len(),
        "symbol analysed"
    );

    Ok(SymbolReport {
        as_of: now,
        bar_count: bars.len(),
        last_close: last.close,
        change_percent: latest_change_percent(bars),
        support_resistance,
        indicators,
        patterns,
        pivots,
        multi_timeframe_pivots: multi,
        symbol,
    })
}
