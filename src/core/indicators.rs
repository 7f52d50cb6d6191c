//! Technical indicator math over an ordered close-price series (oldest
//! first). Pure functions, no I/O.
//!
//! Degraded-input behavior is part of the contract: short series return
//! neutral or zeroed values instead of errors, and the EMA seeds its first
//! `period` points with a running prefix average rather than the textbook
//! first-value seed.

/// Wilder-smoothed RSI aligned to the input index.
///
/// Seed averages are simple means of the first `period` deltas; later values
/// use `avg = (prev * (period - 1) + x) / period`. Values are defined from
/// index `period + 1` onward; earlier entries stay `None`. A series shorter
/// than `period + 1` collapses to the single neutral value `[Some(50.0)]`.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || prices.len() < period + 1 {
        return vec![Some(50.0)];
    }

    let mut gains = vec![0.0; prices.len()];
    let mut losses = vec![0.0; prices.len()];
    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut avg_gain = gains[1..=period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[1..=period].iter().sum::<f64>() / period as f64;

    let mut out = vec![None; prices.len()];
    for i in period + 1..prices.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out[i] = Some(value);
    }
    out
}

/// Exponential moving average with `k = 2 / (period + 1)`.
///
/// Output length equals input length. The first `period` points carry the
/// simple average of the prefix `[0..=i]`; the recurrence starts at index
/// `period`. A series shorter than `period` is filled with the first price
/// (0.0 when empty).
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.len() < period {
        let seed = prices.first().copied().unwrap_or(0.0);
        return vec![seed; prices.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(prices.len());
    let mut prefix_sum = 0.0;
    for (i, price) in prices.iter().enumerate() {
        if i == 0 {
            prefix_sum = *price;
            out.push(*price);
        } else if i < period {
            prefix_sum += *price;
            out.push(prefix_sum / (i + 1) as f64);
        } else {
            let prev = out[i - 1];
            out.push(price * k + prev * (1.0 - k));
        }
    }
    out
}

/// Latest MACD, signal and histogram values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD over the close series: `macd = ema(fast) - ema(slow)` per index,
/// with the signal EMA computed on the slice where both EMAs are past their
/// seed window. Fewer than `slow + signal` points returns the zeroed triple.
pub fn macd(prices: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    if prices.len() < slow + signal {
        return MacdOutput {
            macd: 0.0,
            signal: 0.0,
            histogram: 0.0,
        };
    }

    let fast_ema = ema(prices, fast);
    let slow_ema = ema(prices, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let overlap = &macd_line[slow.saturating_sub(fast)..];
    let signal_line = ema(overlap, signal);
    let histogram: Vec<f64> = overlap
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdOutput {
        macd: macd_line.last().copied().unwrap_or(0.0),
        signal: signal_line.last().copied().unwrap_or(0.0),
        histogram: histogram.last().copied().unwrap_or(0.0),
    }
}

/// Simple moving average: one value per full window, `len - period + 1`
/// points. Empty when the series is shorter than `period`.
pub fn sma(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }
    prices
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Bollinger bands over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bands around the trailing `period`-point SMA, offset by `width`
/// population standard deviations. Short input returns the zeroed triple.
pub fn bollinger(prices: &[f64], period: usize, width: f64) -> BollingerBands {
    if period == 0 || prices.len() < period {
        return BollingerBands {
            upper: 0.0,
            middle: 0.0,
            lower: 0.0,
        };
    }

    let window = &prices[prices.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;
    let variance = window
        .iter()
        .map(|price| (price - middle).powi(2))
        .sum::<f64>()
        / period as f64;
    let offset = width * variance.sqrt();

    BollingerBands {
        upper: middle + offset,
        middle,
        lower: middle - offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rsi_degraded_input_returns_single_neutral_value() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&prices, 14), vec![Some(50.0)]);
        assert_eq!(rsi(&[], 14), vec![Some(50.0)]);
    }

    #[test]
    fn rsi_warmup_entries_are_unset() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let out = rsi(&prices, 14);

        assert_eq!(out.len(), prices.len());
        for (i, value) in out.iter().enumerate().take(15) {
            assert!(value.is_none(), "index {i} should be unset");
        }
        assert!(out[15].is_some());
    }

    #[test]
    fn rsi_all_gains_is_max() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&prices, 14);
        let last = out.last().copied().flatten().unwrap();
        assert!(close_to(last, 100.0), "expected 100, got {last}");
    }

    #[test]
    fn rsi_all_losses_is_min() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&prices, 14);
        let last = out.last().copied().flatten().unwrap();
        assert!(close_to(last, 0.0), "expected 0, got {last}");
    }

    #[test]
    fn rsi_stays_in_range() {
        let prices: Vec<f64> = (0..40)
            .map(|i| 100.0 + ((i % 7) as f64 - 3.0) * 2.5)
            .collect();
        for value in rsi(&prices, 14).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&value), "RSI {value} out of range");
        }
    }

    #[test]
    fn ema_output_length_matches_input() {
        let prices: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        assert_eq!(ema(&prices, 12).len(), prices.len());
    }

    #[test]
    fn ema_seed_is_prefix_average() {
        let out = ema(&[2.0, 4.0, 6.0, 8.0], 3);
        assert!(close_to(out[0], 2.0));
        assert!(close_to(out[1], 3.0));
        assert!(close_to(out[2], 4.0));
        // First recurrence point: k = 0.5, 8 * 0.5 + 4 * 0.5.
        assert!(close_to(out[3], 6.0));
    }

    #[test]
    fn ema_short_input_fills_first_price() {
        assert_eq!(ema(&[5.0, 6.0], 3), vec![5.0, 5.0]);
        assert!(ema(&[], 3).is_empty());
    }

    #[test]
    fn macd_insufficient_data_is_zeroed() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = macd(&prices, 12, 26, 9);
        assert_eq!(out.macd, 0.0);
        assert_eq!(out.signal, 0.0);
        assert_eq!(out.histogram, 0.0);
    }

    #[test]
    fn macd_constant_series_is_flat() {
        let prices = vec![100.0; 40];
        let out = macd(&prices, 12, 26, 9);
        assert!(close_to(out.macd, 0.0));
        assert!(close_to(out.signal, 0.0));
        assert!(close_to(out.histogram, 0.0));
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.3)
            .collect();
        let out = macd(&prices, 12, 26, 9);
        assert!(close_to(out.histogram, out.macd - out.signal));
        assert!(out.macd != 0.0);
    }

    #[test]
    fn sma_window_means() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn sma_short_input_is_empty() {
        assert!(sma(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn bollinger_constant_series_collapses() {
        let out = bollinger(&[50.0; 25], 20, 2.0);
        assert!(close_to(out.upper, 50.0));
        assert!(close_to(out.middle, 50.0));
        assert!(close_to(out.lower, 50.0));
    }

    #[test]
    fn bollinger_known_window() {
        let out = bollinger(&[1.0, 2.0, 3.0, 4.0], 4, 2.0);
        // middle 2.5, population variance 1.25
        let sd = 1.25f64.sqrt();
        assert!(close_to(out.middle, 2.5));
        assert!(close_to(out.upper, 2.5 + 2.0 * sd));
        assert!(close_to(out.lower, 2.5 - 2.0 * sd));
    }

    #[test]
    fn bollinger_short_input_is_zeroed() {
        let out = bollinger(&[1.0, 2.0], 20, 2.0);
        assert_eq!(out.upper, 0.0);
        assert_eq!(out.middle, 0.0);
        assert_eq!(out.lower, 0.0);
    }

    #[test]
    fn bollinger_uses_trailing_window() {
        // Leading outlier outside the window must not affect the bands.
        let mut prices = vec![1000.0];
        prices.extend(std::iter::repeat(10.0).take(20));
        let out = bollinger(&prices, 20, 2.0);
        assert!(close_to(out.middle, 10.0));
        assert!(close_to(out.upper, 10.0));
    }
}
