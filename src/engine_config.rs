// =============================================================================
// Engine Configuration — analysis settings with atomic save
// =============================================================================
//
// Every tunable of a run lives here: which symbols to analyse, the S/R
// lookback windows and clustering knobs, the indicator bundle, the pattern
// filter and the pivot methods.
//
// All fields carry `#[serde(default = "...")]` so a partial JSON file loads
// with the remaining values at their defaults.  Persistence writes a `.tmp`
// sibling and renames it over the target.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EngineError;
use crate::indicators::IndicatorParams;
use crate::levels::SrParams;
use crate::types::{IndicatorKind, PatternKind, PivotMethod};

/// Environment variable holding a comma-separated symbol list.
pub const SYMBOLS_ENV: &str = "TA_SYMBOLS";
/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "TA_CONFIG_PATH";
/// Environment variable holding the bar data file path.
pub const BARS_PATH_ENV: &str = "TA_BARS_PATH";

pub const DEFAULT_CONFIG_PATH: &str = "engine_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec!["AAPL".to_string(), "MSFT".to_string(), "SPY".to_string()]
}

fn default_windows() -> Vec<u32> {
    vec![7, 30, 90]
}

fn default_max_levels() -> usize {
    10
}

fn default_swing_window() -> usize {
    2
}

fn default_tolerance_factor() -> f64 {
    0.5
}

fn default_indicator_kinds() -> Vec<IndicatorKind> {
    IndicatorKind::all().to_vec()
}

fn default_period() -> usize {
    20
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_std_dev() -> f64 {
    2.0
}

fn default_atr_period() -> usize {
    14
}

fn default_lookback_days() -> usize {
    100
}

fn default_pattern_kinds() -> Vec<PatternKind> {
    PatternKind::all().to_vec()
}

fn default_pivot_methods() -> Vec<PivotMethod> {
    vec![PivotMethod::Standard, PivotMethod::Fibonacci]
}

fn default_pivot_periods() -> usize {
    1
}

// =============================================================================
// Sections
// =============================================================================

/// Support / resistance aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrConfig {
    /// Lookback windows in days.
    #[serde(default = "default_windows")]
    pub windows: Vec<u32>,

    #[serde(default = "default_max_levels")]
    pub max_levels: usize,

    /// Fractal half-width for swing detection.
    #[serde(default = "default_swing_window")]
    pub swing_window: usize,

    /// Multiplier on ATR for the per-window clustering tolerance.
    #[serde(default = "default_tolerance_factor")]
    pub tolerance_factor: f64,
}

impl Default for SrConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            max_levels: default_max_levels(),
            swing_window: default_swing_window(),
            tolerance_factor: default_tolerance_factor(),
        }
    }
}

impl SrConfig {
    pub fn params(&self) -> SrParams {
        SrParams {
            max_levels: self.max_levels,
            swing_window: self.swing_window,
            tolerance_factor: self.tolerance_factor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_indicator_kinds")]
    pub kinds: Vec<IndicatorKind>,

    /// Shared period for SMA, EMA, RSI and Bollinger.
    #[serde(default = "default_period")]
    pub period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_std_dev")]
    pub bollinger_std_dev: f64,

    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            kinds: default_indicator_kinds(),
            period: default_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bollinger_std_dev: default_std_dev(),
            atr_period: default_atr_period(),
        }
    }
}

impl IndicatorConfig {
    pub fn params(&self) -> IndicatorParams {
        IndicatorParams {
            period: self.period,
            macd_fast: self.macd_fast,
            macd_slow: self.macd_slow,
            macd_signal: self.macd_signal,
            bollinger_std_dev: self.bollinger_std_dev,
            atr_period: self.atr_period,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotConfig {
    #[serde(default = "default_pivot_methods")]
    pub methods: Vec<PivotMethod>,

    /// Daily periods reported per method, most recent first.
    #[serde(default = "default_pivot_periods")]
    pub periods: usize,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            methods: default_pivot_methods(),
            periods: default_pivot_periods(),
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Trailing daily bars fed to indicators and pattern detection.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: usize,

    #[serde(default)]
    pub sr: SrConfig,

    #[serde(default)]
    pub indicators: IndicatorConfig,

    #[serde(default = "default_pattern_kinds")]
    pub patterns: Vec<PatternKind>,

    #[serde(default)]
    pub pivots: PivotConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            lookback_days: default_lookback_days(),
            sr: SrConfig::default(),
            indicators: IndicatorConfig::default(),
            patterns: default_pattern_kinds(),
            pivots: PivotConfig::default(),
        }
    }
}

fn check_range<T>(name: &'static str, value: T, min: T, max: T) -> Result<(), EngineError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(EngineError::InvalidParameter {
            name,
            reason: format!("{value} is outside {min}..={max}"),
        });
    }
    Ok(())
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            windows = ?config.sr.windows,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Persist to `path` via a `.tmp` sibling and rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise engine config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "engine config saved (atomic)");
        Ok(())
    }

    /// Replace the symbol list from a comma-separated string.  Symbols are
    /// trimmed, uppercased and blanks dropped; an all-blank list is ignored.
    pub fn override_symbols(&mut self, csv: &str) {
        let symbols: Vec<String> = csv
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            self.symbols = symbols;
        }
    }

    /// Apply `TA_SYMBOLS` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(csv) = std::env::var(SYMBOLS_ENV) {
            self.override_symbols(&csv);
        }
    }

    /// Check every setting against its accepted bounds.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_range("symbols", self.symbols.len(), 1, 1000)?;
        check_range("lookback_days", self.lookback_days, 10, 500)?;
        if self.sr.windows.is_empty() {
            return Err(EngineError::InvalidParameter {
                name: "windows",
                reason: "at least one lookback window is required".to_string(),
            });
        }
        if self.sr.windows.contains(&0) {
            return Err(EngineError::InvalidParameter {
                name: "window",
                reason: "lookback windows must be positive".to_string(),
            });
        }
        check_range("max_levels", self.sr.max_levels, 1, 30)?;
        check_range("swing_window", self.sr.swing_window, 1, 5)?;
        check_range("tolerance_factor", self.sr.tolerance_factor, 0.1, 2.0)?;
        check_range("period", self.indicators.period, 5, 200)?;
        if self.indicators.macd_fast == 0 || self.indicators.macd_fast >= self.indicators.macd_slow {
            return Err(EngineError::InvalidParameter {
                name: "macd",
                reason: format!(
                    "fast period {} must be positive and below slow period {}",
                    self.indicators.macd_fast, self.indicators.macd_slow
                ),
            });
        }
        check_range("macd_signal", self.indicators.macd_signal, 1, 200)?;
        check_range("atr_period", self.indicators.atr_period, 1, 200)?;
        if self.pivots.periods == 0 {
            return Err(EngineError::InvalidParameter {
                name: "periods",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
