use signal_core::{Bar, BarSeries, IndicatorConfig, IndicatorSet};

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// RSI on a flat rolling mean of gains and losses (no recursive smoothing).
///
/// The ratio is taken with plain division so the degenerate windows keep
/// their meaning: all-gain windows drive rs to infinity and rsi to 100,
/// dead-flat windows give NaN, which downstream reads as indeterminate.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut result = Vec::with_capacity(gains.len() - period + 1);
    for i in period - 1..gains.len() {
        let avg_gain: f64 = gains[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        let rs = avg_gain / avg_loss;
        result.push(100.0 - 100.0 / (1.0 + rs));
    }
    result
}

/// Relative volume of the latest bar against its own trailing window
/// (current bar included in the average). NaN until the window fills.
pub fn rvol(volumes: &[f64], period: usize) -> f64 {
    if period == 0 || volumes.len() < period {
        return f64::NAN;
    }
    let tail = &volumes[volumes.len() - period..];
    let mean = tail.iter().sum::<f64>() / period as f64;
    let last = volumes[volumes.len() - 1];
    if mean > 0.0 {
        last / mean
    } else {
        0.0
    }
}

/// Fresh golden cross: fast SMA above slow now, at or below it `lookback`
/// bars earlier. Both series are aligned at the last bar.
pub fn golden_cross(fast: &[f64], slow: &[f64], lookback: usize) -> bool {
    if lookback == 0 || fast.len() < lookback || slow.len() < lookback {
        return false;
    }
    fast[fast.len() - 1] > slow[slow.len() - 1]
        && fast[fast.len() - lookback] <= slow[slow.len() - lookback]
}

/// Percent change of the last close versus the `lookback`-th close from the
/// end (pandas negative indexing); 0 when fewer than `lookback` closes
/// exist.
pub fn percent_change(closes: &[f64], lookback: usize) -> f64 {
    if lookback == 0 || closes.len() < lookback {
        return 0.0;
    }
    let past = closes[closes.len() - lookback];
    if past == 0.0 {
        return 0.0;
    }
    (closes[closes.len() - 1] - past) / past * 100.0
}

/// Bar-to-bar fractional returns
pub fn returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

/// Beta versus a benchmark, covariance over variance on tail-aligned
/// returns. None until more than `min_samples` pairs exist or when the
/// benchmark never moves.
pub fn beta(stock_returns: &[f64], bench_returns: &[f64], min_samples: usize) -> Option<f64> {
    let n = stock_returns.len().min(bench_returns.len());
    if n <= min_samples {
        return None;
    }
    let stock = &stock_returns[stock_returns.len() - n..];
    let bench = &bench_returns[bench_returns.len() - n..];

    let mean_s = stock.iter().sum::<f64>() / n as f64;
    let mean_b = bench.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for i in 0..n {
        covariance += (stock[i] - mean_s) * (bench[i] - mean_b);
        variance += (bench[i] - mean_b) * (bench[i] - mean_b);
    }
    if variance == 0.0 {
        return None;
    }
    Some(covariance / variance)
}

/// Rolling dollar volume over `period` bars (average close×volume scaled
/// back to the full period). None when the history is shorter.
pub fn dollar_volume(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let tail = &bars[bars.len() - period..];
    let mean = tail.iter().map(|b| b.close * b.volume).sum::<f64>() / period as f64;
    Some(mean * period as f64)
}

/// Latest-value indicator snapshot for one series.
pub fn compute_indicators(series: &BarSeries, config: &IndicatorConfig) -> IndicatorSet {
    let closes = series.closes();
    let volumes = series.volumes();

    let rsi_values = rsi(&closes, config.rsi_period);
    let fast = sma(&closes, config.fast_sma);
    let slow = sma(&closes, config.slow_sma);

    let trend_bullish = match (fast.last(), slow.last()) {
        (Some(f), Some(s)) => f > s,
        _ => false,
    };

    IndicatorSet {
        rsi: rsi_values.last().copied().unwrap_or(f64::NAN),
        rvol: rvol(&volumes, config.rvol_period),
        sma50: fast.last().copied().unwrap_or(f64::NAN),
        sma200: slow.last().copied().unwrap_or(f64::NAN),
        golden_cross: golden_cross(&fast, &slow, config.golden_cross_lookback),
        trend_bullish,
        perf_30d: percent_change(&closes, config.perf_lookback),
    }
}
