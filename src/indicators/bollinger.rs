// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the same window.

use serde::{Deserialize, Serialize};

use super::sma::calculate_sma;

/// Band series, each of length `n - period + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl BollingerBands {
    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

/// Calculate Bollinger Bands over every `period`-wide window of `prices`.
///
/// Returns empty bands when `period` is zero or fewer than `period` prices
/// are supplied.  A negative `num_std` would invert the bands, so its absolute
/// value is used.
pub fn calculate_bollinger(prices: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let middle = calculate_sma(prices, period);
    if middle.is_empty() {
        return BollingerBands::default();
    }

    let k = num_std.abs();
    let (upper, lower): (Vec<f64>, Vec<f64>) = prices
        .windows(period)
        .zip(&middle)
        .map(|(window, &mean)| {
            let variance =
                window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
            let std_dev = variance.sqrt();
            (mean + k * std_dev, mean - k * std_dev)
        })
        .unzip();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
