pub mod bar;
pub mod timeframe;

// Re-export the Bar struct for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{closes, latest_change_percent, trailing, with_change_percent, Bar};
pub use timeframe::resample;
