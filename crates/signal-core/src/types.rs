use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Absolute candle body size
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Checks OHLCV consistency: finite positive prices, high/low enclosing
    /// the body, non-negative volume.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(AnalysisError::InvalidSeries(format!(
                "non-finite or non-positive price at {}",
                self.timestamp
            )));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(AnalysisError::InvalidSeries(format!(
                "invalid volume at {}",
                self.timestamp
            )));
        }
        if self.high < self.open.max(self.close) || self.low > self.open.min(self.close) {
            return Err(AnalysisError::InvalidSeries(format!(
                "high/low do not enclose open/close at {}",
                self.timestamp
            )));
        }
        Ok(())
    }
}

/// Timeframe for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    Hour1,
    Day1,
}

impl Timeframe {
    pub fn to_minutes(&self) -> i64 {
        match self {
            Timeframe::Hour1 => 60,
            Timeframe::Day1 => 1440,
        }
    }

    /// Provider-facing interval code
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1h",
            Timeframe::Day1 => "1d",
        }
    }
}

/// A validated, time-ordered bar history for one instrument.
///
/// Construction is the data boundary: bars must be non-empty, strictly
/// ascending by timestamp, and individually consistent. Anything downstream
/// can rely on those invariants instead of re-checking tabular shape.
#[derive(Debug, Clone, Serialize)]
pub struct BarSeries {
    symbol: String,
    timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<Self, AnalysisError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(AnalysisError::InvalidSeries(format!(
                "{symbol}: empty bar history"
            )));
        }
        for bar in &bars {
            bar.validate()?;
        }
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(AnalysisError::InvalidSeries(format!(
                    "{symbol}: bars not strictly ascending at {}",
                    pair[1].timestamp
                )));
            }
        }
        Ok(Self {
            symbol,
            timeframe,
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        false // non-empty by construction
    }

    pub fn last_bar(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn last_close(&self) -> f64 {
        self.last_bar().close
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// Buy-side/sell-side liquidity range over the trailing swing window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwingRange {
    pub high: f64,
    pub low: f64,
    pub equilibrium: f64,
}

impl SwingRange {
    pub fn new(high: f64, low: f64) -> Self {
        Self {
            high,
            low,
            equilibrium: (high + low) / 2.0,
        }
    }

    /// Fallback band of ±5% around the last close, used when the window
    /// cannot produce a usable range.
    pub fn degenerate(last_close: f64) -> Self {
        Self {
            high: last_close * 1.05,
            low: last_close * 0.95,
            equilibrium: last_close,
        }
    }

    pub fn in_discount(&self, price: f64) -> bool {
        price < self.equilibrium
    }

    pub fn in_premium(&self, price: f64) -> bool {
        price > self.equilibrium
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Direction of a fair value gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapKind {
    Bullish,
    Bearish,
}

/// Three-bar price imbalance. `anchor` is the window index of the youngest
/// bar of the pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FairValueGap {
    pub kind: GapKind,
    pub top: f64,
    pub bottom: f64,
    pub anchor: usize,
}

/// Breach-and-reclaim of a prior low. `bar_offset` counts back from the
/// window end (0 = latest bar).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LiquiditySweep {
    pub level: f64,
    pub bar_offset: usize,
}

/// Latest-value indicator snapshot. Float fields may be NaN when the history
/// is too short to define them; NaN means "indeterminate" and is skipped by
/// the scoring rules (and serializes to JSON null).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub rvol: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub golden_cross: bool,
    pub trend_bullish: bool,
    pub perf_30d: f64,
}

impl IndicatorSet {
    /// All-indeterminate snapshot for histories too short to compute anything
    pub fn unavailable() -> Self {
        Self {
            rsi: f64::NAN,
            rvol: f64::NAN,
            sma50: f64::NAN,
            sma200: f64::NAN,
            golden_cross: false,
            trend_bullish: false,
            perf_30d: 0.0,
        }
    }
}

/// Bounded setup-quality score with its audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityScore {
    /// 0..=99
    pub value: u8,
    /// One entry per triggered rule, in rule order
    pub reasons: Vec<String>,
    pub risk_reward: f64,
    /// How many of {sweep, golden cross, RSI pullback} lined up
    pub confluence: u8,
}

/// Terminal classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Long,
    Wait,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Long => "LONG",
            Signal::Wait => "WAIT",
        }
    }
}

/// Why a ticker stayed on WAIT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitReason {
    NoSetup,
    CounterTrend,
    PremiumZone,
}

impl WaitReason {
    pub fn describe(&self) -> &'static str {
        match self {
            WaitReason::NoSetup => "No FVG or liquidity sweep to lean on",
            WaitReason::CounterTrend => "Trend filter bearish (50 SMA below 200 SMA)",
            WaitReason::PremiumZone => "Price in premium zone, no discount entry",
        }
    }
}

/// Entry/stop/target levels derived from the swing structure
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TradePlan {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl TradePlan {
    /// Reward-to-risk ratio; 0 when the stop sits at or above the entry
    pub fn risk_reward(&self) -> f64 {
        let risk = self.entry - self.stop_loss;
        if risk <= 0.0 {
            return 0.0;
        }
        (self.take_profit - self.entry) / risk
    }
}

/// Everything the structure pass found in the swing window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureSnapshot {
    pub range: SwingRange,
    /// True when the range came from the ±5% fallback band
    pub fallback_range: bool,
    pub gaps: Vec<FairValueGap>,
    /// Bullish gap selected as the discount entry candidate
    pub entry_gap: Option<FairValueGap>,
    pub sweep: Option<LiquiditySweep>,
    /// Window indices of displacement candles
    pub displacement_bars: Vec<usize>,
    pub equal_highs: Vec<f64>,
    pub equal_lows: Vec<f64>,
}

/// Per-ticker scan result. Rebuilt from scratch on every run; nothing here
/// is updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub generated_at: DateTime<Utc>,
    /// Last close at analysis time
    pub price: f64,
    pub signal: Signal,
    pub wait_reason: Option<WaitReason>,
    pub plan: TradePlan,
    pub score: u8,
    pub reasons: Vec<String>,
    pub risk_reward: f64,
    pub confluence: u8,
    pub indicators: IndicatorSet,
    pub structure: StructureSnapshot,
    /// Market-bias bonus that was folded into the base score
    pub market_bonus: i32,
    pub bar_count: usize,
}

impl SignalRecord {
    pub fn is_long(&self) -> bool {
        self.signal == Signal::Long
    }
}
