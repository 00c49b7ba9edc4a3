use serde::{Deserialize, Serialize};

use crate::Timeframe;

/// Knobs for the price-structure pass (swing range, gaps, sweeps).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Trailing bars defining the swing range
    pub swing_window: usize,
    /// Bars at the window end checked for a breach-and-reclaim
    pub sweep_recent_bars: usize,
    /// Bars before the recent set whose minimum low is the sweep reference
    pub sweep_reference_depth: usize,
    /// Lookback for the average candle body
    pub displacement_period: usize,
    /// Body must exceed this multiple of the average to count as displacement
    pub displacement_factor: f64,
    /// Bars on each side of a pivot high/low
    pub pivot_window: usize,
    /// Relative tolerance for calling two pivots "equal"
    pub equal_level_tolerance: f64,
    /// Stop sits at range low times this factor
    pub stop_loss_buffer: f64,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            swing_window: 50,
            sweep_recent_bars: 3,
            sweep_reference_depth: 10,
            displacement_period: 20,
            displacement_factor: 2.5,
            pivot_window: 5,
            equal_level_tolerance: 0.002,
            stop_loss_buffer: 0.99,
        }
    }
}

/// Periods for the indicator pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub rvol_period: usize,
    pub fast_sma: usize,
    pub slow_sma: usize,
    /// Bars back to compare against when detecting a fresh golden cross
    pub golden_cross_lookback: usize,
    /// Bars back for the momentum percent change
    pub perf_lookback: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rvol_period: 10,
            fast_sma: 50,
            slow_sma: 200,
            golden_cross_lookback: 5,
            perf_lookback: 30,
        }
    }
}

/// Every weight and threshold of the quality score. One struct instead of a
/// forest of scoring forks: variant strategies are data, not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Starting score before the market bonus and rules
    pub base: i32,
    pub rr_excellent_threshold: f64, // rr >= this
    pub rr_excellent_bonus: i32,
    pub rr_good_threshold: f64, // rr >= this
    pub rr_good_bonus: i32,
    pub rr_poor_threshold: f64, // rr < this
    pub rr_poor_penalty: i32,
    /// Inclusive RSI band treated as a healthy pullback
    pub rsi_pullback_low: f64,
    pub rsi_pullback_high: f64,
    pub rsi_pullback_bonus: i32,
    pub rsi_overheated_threshold: f64, // rsi > this
    pub rsi_overheated_penalty: i32,
    pub rvol_surge_threshold: f64, // rvol > this
    pub rvol_surge_bonus: i32,
    pub rvol_elevated_threshold: f64, // rvol > this
    pub rvol_elevated_bonus: i32,
    pub sweep_bonus: i32,
    pub golden_cross_bonus: i32,
    /// Close-to-entry distance (fraction of entry) for the sniper bonus
    pub sniper_distance_pct: f64,
    pub sniper_bonus: i32,
    /// Wider distance band worth a smaller bonus
    pub near_distance_pct: f64,
    pub near_bonus: i32,
    pub trend_bonus: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: 60,
            rr_excellent_threshold: 3.0,
            rr_excellent_bonus: 15,
            rr_good_threshold: 2.0,
            rr_good_bonus: 10,
            rr_poor_threshold: 1.0,
            rr_poor_penalty: -20,
            rsi_pullback_low: 40.0,
            rsi_pullback_high: 55.0,
            rsi_pullback_bonus: 10,
            rsi_overheated_threshold: 70.0,
            rsi_overheated_penalty: -15,
            rvol_surge_threshold: 1.5,
            rvol_surge_bonus: 10,
            rvol_elevated_threshold: 1.1,
            rvol_elevated_bonus: 5,
            sweep_bonus: 20,
            golden_cross_bonus: 10,
            sniper_distance_pct: 0.01,
            sniper_bonus: 15,
            near_distance_pct: 0.03,
            near_bonus: 10,
            trend_bonus: 5,
        }
    }
}

/// Run-level settings for a watchlist scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub timeframe: Timeframe,
    /// Bars requested from the provider per symbol
    pub history_limit: usize,
    /// Symbols with fewer bars than this are skipped
    pub min_bars: usize,
    /// Symbols whose trend sets the market bias
    pub benchmark_symbols: Vec<String>,
    pub cache_ttl_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeframe: Timeframe::Day1,
            history_limit: 365,
            min_bars: 50,
            benchmark_symbols: vec!["SPY".to_string(), "QQQ".to_string()],
            cache_ttl_secs: 300,
        }
    }
}

/// Named bucket of symbols scanned and reported together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistGroup {
    pub name: String,
    pub symbols: Vec<String>,
}

impl WatchlistGroup {
    pub fn new(name: impl Into<String>, symbols: &[&str]) -> Self {
        Self {
            name: name.into(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The full scan universe, passed into the pipeline entry point.
///
/// `triage` symbols are candidates under evaluation: they only make the
/// report while they hold a LONG setup, and drop out on WAIT.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Watchlist {
    pub groups: Vec<WatchlistGroup>,
    pub triage: Vec<String>,
}

impl Watchlist {
    /// Curated default universe: core sector buckets plus a rotating triage
    /// list of small caps under evaluation.
    pub fn default_sectors() -> Self {
        Self {
            groups: vec![
                WatchlistGroup::new(
                    "🔥 Momentum Movers",
                    &[
                        "NVDA", "TSLA", "AAPL", "AMD", "PLTR", "SOFI", "MARA", "MSTR", "SMCI",
                        "COIN",
                    ],
                ),
                WatchlistGroup::new(
                    "💎 Mega-Cap Tech",
                    &["MSFT", "AMZN", "GOOGL", "META", "NFLX", "CRM", "ADBE"],
                ),
                WatchlistGroup::new(
                    "⚡ Semiconductors",
                    &["TSM", "AVGO", "MU", "INTC", "ARM", "QCOM", "TXN", "AMAT"],
                ),
                WatchlistGroup::new(
                    "🚀 High Growth",
                    &["HOOD", "DKNG", "RBLX", "U", "CVNA", "OPEN", "SHOP", "NET"],
                ),
                WatchlistGroup::new(
                    "🏦 Finance & Consumer",
                    &["JPM", "V", "COST", "MCD", "NKE", "LLY", "WMT", "DIS", "SBUX"],
                ),
                WatchlistGroup::new("📉 Index ETFs", &["SPY", "QQQ", "IWM", "TQQQ", "SQQQ"]),
            ],
            triage: [
                "IRWD", "SKYT", "SLS", "PEPG", "TROO", "CTRN", "BCAR", "ARDX", "RCAT", "MLAC",
                "SNDK", "ONDS", "VELO", "APLD", "TIGR", "FLNC", "SERV", "ACMR", "FTAI", "ZURA",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Distinct symbols across all groups, first appearance order
    pub fn unique_symbols(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for group in &self.groups {
            for symbol in &group.symbols {
                if seen.insert(symbol.clone()) {
                    out.push(symbol.clone());
                }
            }
        }
        out
    }
}

/// Institutional-grade screen applied on top of the signal scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrictFilter {
    /// Require the last close above the slow SMA
    pub require_above_slow_sma: bool,
    /// Rolling one-month dollar volume floor
    pub min_monthly_dollar_volume: f64,
    pub dollar_volume_period: usize,
    /// Beta floor versus the primary benchmark
    pub min_beta: f64,
    /// Return pairs required before beta is considered defined
    pub min_beta_samples: usize,
}

impl Default for StrictFilter {
    fn default() -> Self {
        Self {
            require_above_slow_sma: true,
            min_monthly_dollar_volume: 900_000_000.0,
            dollar_volume_period: 21,
            min_beta: 1.0,
            min_beta_samples: 30,
        }
    }
}
