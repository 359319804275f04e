// =============================================================================
// ta-engine — technical-analysis engine
// =============================================================================
//
// Pure functions from ordered OHLCV bars to derived analytics: aggregated
// support/resistance levels, classical indicators, candlestick patterns and
// pivot points.  No I/O happens below `engine_config` and `analysis`.
// =============================================================================

pub mod analysis;
pub mod engine_config;
pub mod error;
pub mod indicators;
pub mod levels;
pub mod market_data;
pub mod patterns;
pub mod pivots;
pub mod types;

pub use analysis::{analyze_symbol, SymbolReport};
pub use engine_config::EngineConfig;
pub use error::EngineError;
pub use market_data::Bar;
