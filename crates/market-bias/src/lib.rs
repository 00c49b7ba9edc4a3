use serde::{Deserialize, Serialize};
use signal_core::BarSeries;

/// Bars a benchmark needs before it can vote on the bias
const TREND_PERIOD: usize = 50;

/// Overall market condition read from benchmark ETFs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketBias {
    /// Every benchmark closed above its trailing 50-bar average
    Bullish,

    /// Benchmarks disagree, or there is not enough history to tell
    Neutral,

    /// Every benchmark closed below its trailing 50-bar average
    Bearish,
}

impl MarketBias {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            MarketBias::Bullish => "Bullish",
            MarketBias::Neutral => "Neutral",
            MarketBias::Bearish => "Bearish",
        }
    }

    /// Score adjustment folded into every ticker's base score this run
    pub fn score_bonus(&self) -> i32 {
        match self {
            MarketBias::Bullish => 5,
            MarketBias::Neutral => 0,
            MarketBias::Bearish => -10,
        }
    }
}

/// Bias verdict with its reasoning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasAssessment {
    pub bias: MarketBias,
    pub description: String,
    pub bonus: i32,
}

impl BiasAssessment {
    fn of(bias: MarketBias, description: impl Into<String>) -> Self {
        Self {
            bias,
            description: description.into(),
            bonus: bias.score_bonus(),
        }
    }
}

/// Classify the tape from benchmark histories.
///
/// Bullish only when every benchmark closed above its own trailing 50-bar
/// average, bearish only when every one closed below. A benchmark with too
/// little history fails both checks, so thin data can never produce a
/// directional call.
pub fn assess_market(benchmarks: &[BarSeries]) -> BiasAssessment {
    if benchmarks.is_empty() {
        return BiasAssessment::of(MarketBias::Neutral, "Benchmark data unavailable");
    }

    let mut all_above = true;
    let mut all_below = true;
    let mut readable = 0usize;

    for series in benchmarks {
        match trend_mean(series) {
            Some(mean) => {
                readable += 1;
                if series.last_close() <= mean {
                    all_above = false;
                }
                if series.last_close() >= mean {
                    all_below = false;
                }
            }
            None => {
                all_above = false;
                all_below = false;
            }
        }
    }

    if readable == 0 {
        return BiasAssessment::of(MarketBias::Neutral, "Benchmark history too short to read");
    }

    if all_above {
        BiasAssessment::of(
            MarketBias::Bullish,
            "🟢 Market tailwind (benchmarks above 50MA)",
        )
    } else if all_below {
        BiasAssessment::of(
            MarketBias::Bearish,
            "🔴 Market headwind (benchmarks below 50MA)",
        )
    } else {
        BiasAssessment::of(MarketBias::Neutral, "🟡 Choppy market, benchmarks mixed")
    }
}

fn trend_mean(series: &BarSeries) -> Option<f64> {
    let closes = series.closes();
    if closes.len() < TREND_PERIOD {
        return None;
    }
    let window = &closes[closes.len() - TREND_PERIOD..];
    Some(window.iter().sum::<f64>() / TREND_PERIOD as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use signal_core::{Bar, Timeframe};

    fn create_test_series(symbol: &str, count: usize, trend: f64) -> BarSeries {
        let bars = (0..count)
            .map(|i| {
                let price = 100.0 + i as f64 * trend;
                Bar {
                    timestamp: Utc.timestamp_opt(i as i64 * 86_400, 0).unwrap(),
                    open: price,
                    high: price + 1.0,
                    low: price - 1.0,
                    close: price,
                    volume: 1000.0,
                }
            })
            .collect();
        BarSeries::new(symbol, Timeframe::Day1, bars).unwrap()
    }

    #[test]
    fn test_all_benchmarks_above_trend_is_bullish() {
        let benchmarks = vec![
            create_test_series("SPY", 100, 0.5),
            create_test_series("QQQ", 100, 0.5),
        ];
        let assessment = assess_market(&benchmarks);
        assert_eq!(assessment.bias, MarketBias::Bullish);
        assert_eq!(assessment.bonus, 5);
    }

    #[test]
    fn test_all_benchmarks_below_trend_is_bearish() {
        let benchmarks = vec![
            create_test_series("SPY", 100, -0.5),
            create_test_series("QQQ", 100, -0.5),
        ];
        let assessment = assess_market(&benchmarks);
        assert_eq!(assessment.bias, MarketBias::Bearish);
        assert_eq!(assessment.bonus, -10);
    }

    #[test]
    fn test_split_benchmarks_are_neutral() {
        let benchmarks = vec![
            create_test_series("SPY", 100, 0.5),
            create_test_series("QQQ", 100, -0.5),
        ];
        let assessment = assess_market(&benchmarks);
        assert_eq!(assessment.bias, MarketBias::Neutral);
        assert_eq!(assessment.bonus, 0);
    }

    #[test]
    fn test_short_history_vetoes_directional_call() {
        // one strong benchmark cannot carry a thin one
        let benchmarks = vec![
            create_test_series("SPY", 100, 0.5),
            create_test_series("QQQ", 10, 0.5),
        ];
        let assessment = assess_market(&benchmarks);
        assert_eq!(assessment.bias, MarketBias::Neutral);
    }

    #[test]
    fn test_no_benchmarks_is_neutral() {
        let assessment = assess_market(&[]);
        assert_eq!(assessment.bias, MarketBias::Neutral);
        assert_eq!(assessment.bonus, 0);
    }

    #[test]
    fn test_flat_benchmark_is_not_directional() {
        // closing exactly on the average is neither above nor below
        let benchmarks = vec![create_test_series("SPY", 100, 0.0)];
        let assessment = assess_market(&benchmarks);
        assert_eq!(assessment.bias, MarketBias::Neutral);
    }
}
