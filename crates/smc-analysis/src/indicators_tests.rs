#[cfg(test)]
mod tests {
    use super::super::indicators::*;
    use chrono::{TimeZone, Utc};
    use signal_core::{Bar, BarSeries, IndicatorConfig, Timeframe};

    // Helper to build a bar series with a linear close drift
    fn create_test_bars(count: usize, trend: f64) -> Vec<Bar> {
        (0..count)
            .map(|i| {
                let base_price = 100.0 + (i as f64 * trend);
                Bar {
                    timestamp: Utc.timestamp_opt(i as i64 * 86_400, 0).unwrap(),
                    open: base_price,
                    high: base_price + 1.0,
                    low: base_price - 1.0,
                    close: base_price,
                    volume: 1_000_000.0,
                }
            })
            .collect()
    }

    #[test]
    fn test_sma_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&data, 3);

        assert_eq!(result.len(), 3);
        assert!((result[0] - 2.0).abs() < 0.001); // (1+2+3)/3
        assert!((result[1] - 3.0).abs() < 0.001);
        assert!((result[2] - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let data = vec![1.0, 2.0];
        assert!(sma(&data, 3).is_empty());
        assert!(sma(&data, 0).is_empty());
    }

    #[test]
    fn test_rsi_all_gains_saturates_at_100() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let result = rsi(&closes, 14);
        assert!(!result.is_empty());
        assert_eq!(*result.last().unwrap(), 100.0);
    }

    #[test]
    fn test_rsi_flat_series_is_indeterminate() {
        let closes = vec![50.0; 20];
        let result = rsi(&closes, 14);
        assert!(!result.is_empty());
        assert!(result.last().unwrap().is_nan());
    }

    #[test]
    fn test_rsi_mixed_moves() {
        // gains [1, 0, 1], losses [0, 0.5, 0], period 2:
        // both windows give avg_gain 0.5 / avg_loss 0.25, rs = 2, rsi = 66.67
        let closes = vec![10.0, 11.0, 10.5, 11.5];
        let result = rsi(&closes, 2);
        assert_eq!(result.len(), 2);
        assert!((result[0] - 200.0 / 3.0).abs() < 0.001);
        assert!((result[1] - 200.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let closes = vec![10.0; 14];
        assert!(rsi(&closes, 14).is_empty());
    }

    #[test]
    fn test_rvol_flat_volume_is_one() {
        let volumes = vec![1_000_000.0; 10];
        assert_eq!(rvol(&volumes, 10), 1.0);
    }

    #[test]
    fn test_rvol_surge() {
        let mut volumes = vec![1_000_000.0; 10];
        volumes[9] = 2_000_000.0;
        // mean = 1.1M, last/mean = 1.818..
        assert!((rvol(&volumes, 10) - 1.8181).abs() < 0.001);
    }

    #[test]
    fn test_rvol_short_history_is_nan() {
        let volumes = vec![1_000_000.0; 5];
        assert!(rvol(&volumes, 10).is_nan());
    }

    #[test]
    fn test_rvol_dead_volume_guard() {
        let volumes = vec![0.0; 10];
        assert_eq!(rvol(&volumes, 10), 0.0);
    }

    #[test]
    fn test_golden_cross_detects_recent_flip() {
        let fast = vec![9.0, 9.5, 10.0, 10.5, 11.0];
        let slow = vec![10.0, 10.0, 10.0, 10.0, 10.0];
        assert!(golden_cross(&fast, &slow, 5));
    }

    #[test]
    fn test_golden_cross_ignores_old_cross() {
        // fast has been above slow the whole lookback
        let fast = vec![11.0; 10];
        let slow = vec![10.0; 10];
        assert!(!golden_cross(&fast, &slow, 5));
    }

    #[test]
    fn test_golden_cross_short_series() {
        let fast = vec![11.0; 4];
        let slow = vec![10.0; 4];
        assert!(!golden_cross(&fast, &slow, 5));
    }

    #[test]
    fn test_percent_change_reference_is_thirtieth_from_end() {
        // 31 closes: the reference is index 1, not the oldest bar
        let mut closes = vec![100.0; 31];
        closes[0] = 50.0;
        closes[30] = 110.0;
        assert!((percent_change(&closes, 30) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_change_defined_at_exactly_thirty_closes() {
        let mut closes = vec![100.0; 30];
        closes[29] = 110.0;
        assert!((percent_change(&closes, 30) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_percent_change_short_history_is_zero() {
        let closes = vec![100.0; 29];
        assert_eq!(percent_change(&closes, 30), 0.0);
    }

    #[test]
    fn test_beta_of_self_is_one() {
        let rets: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 0.01 } else { -0.005 }).collect();
        let b = beta(&rets, &rets, 30).unwrap();
        assert!((b - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_beta_flat_benchmark_is_undefined() {
        let stock: Vec<f64> = (0..40).map(|i| (i as f64) * 0.001).collect();
        let bench = vec![0.0; 40];
        assert!(beta(&stock, &bench, 30).is_none());
    }

    #[test]
    fn test_beta_needs_enough_pairs() {
        let rets = vec![0.01; 20];
        assert!(beta(&rets, &rets, 30).is_none());
    }

    #[test]
    fn test_dollar_volume_monthly() {
        let bars = create_test_bars(30, 0.0);
        // close 100 x volume 1M x 21 bars
        let dv = dollar_volume(&bars, 21).unwrap();
        assert!((dv - 2_100_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_dollar_volume_short_history() {
        let bars = create_test_bars(10, 0.0);
        assert!(dollar_volume(&bars, 21).is_none());
    }

    #[test]
    fn test_compute_indicators_long_uptrend() {
        let bars = create_test_bars(250, 0.5);
        let series = BarSeries::new("TEST", Timeframe::Day1, bars).unwrap();
        let ind = compute_indicators(&series, &IndicatorConfig::default());

        assert!(ind.trend_bullish);
        assert_eq!(ind.rsi, 100.0); // every bar closed higher
        assert_eq!(ind.rvol, 1.0);
        assert!(ind.perf_30d > 0.0);
        assert!(ind.sma50 > ind.sma200);
        // steadily above the whole lookback, so no fresh cross
        assert!(!ind.golden_cross);
    }

    #[test]
    fn test_compute_indicators_short_history_degrades() {
        let bars = create_test_bars(20, 0.5);
        let series = BarSeries::new("TEST", Timeframe::Day1, bars).unwrap();
        let ind = compute_indicators(&series, &IndicatorConfig::default());

        assert!(ind.sma50.is_nan());
        assert!(ind.sma200.is_nan());
        assert!(!ind.trend_bullish);
        assert!(!ind.golden_cross);
        assert_eq!(ind.perf_30d, 0.0);
        // rsi still defined once 15 closes exist
        assert_eq!(ind.rsi, 100.0);
    }
}
