// =============================================================================
// Support / Resistance Levels
// =============================================================================
//
// Swing detection, ATR-tolerant clustering within and across lookback
// windows, and touches + recency scoring.

pub mod aggregate;
pub mod cluster;
pub mod level;
pub mod scoring;
pub mod swing;

pub use aggregate::{
    aggregate_levels, aggregate_levels_from_series, analyze_window, combine_windows, SrParams,
    SrResult, WindowOutcome,
};
pub use cluster::{cluster_levels, merge_across_windows};
pub use level::SrLevel;
pub use scoring::{rank_levels, score_levels};
pub use swing::find_swings;
