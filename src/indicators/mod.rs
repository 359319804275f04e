// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the classical indicators.  Series
// functions return empty vectors instead of errors when the input is too short;
// callers decide whether that is a failure.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod sma;

pub use atr::{atr14, calculate_atr, true_ranges};
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use series::{compute_indicators, IndicatorParams, IndicatorReport, IndicatorSeries};
pub use sma::calculate_sma;
