// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_i = mean(prices[i - period + 1 ..= i])    for i in period-1 .. n-1
// =============================================================================

/// Compute the SMA series of `prices` over `period`.
///
/// Output length is `n - period + 1`; element `j` corresponds to the price at
/// index `period - 1 + j`.  Returns an empty vec when `period` is zero or
/// there are fewer than `period` prices.
pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }
    prices
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_insufficient_data() {
        assert!(calculate_sma(&[1.0, 2.0], 3).is_empty());
        assert!(calculate_sma(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn sma_five_bar_fixture() {
        let prices = [10.0, 11.0, 12.0, 13.0, 14.0];
        let sma = calculate_sma(&prices, 3);
        assert_eq!(sma.len(), prices.len() - 3 + 1);
        assert!((sma[0] - 11.0).abs() < 1e-12);
        assert!((sma[1] - 12.0).abs() < 1e-12);
        assert!((sma[2] - 13.0).abs() < 1e-12);
    }

    #[test]
    fn sma_period_equals_length() {
        let sma = calculate_sma(&[2.0, 4.0, 9.0], 3);
        assert_eq!(sma, vec![5.0]);
    }
}
