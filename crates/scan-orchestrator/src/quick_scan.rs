use serde::{Deserialize, Serialize};
use signal_core::BarSeries;
use smc_analysis::indicators;

/// Bars needed before a quick stat is worth reporting
pub const QUICK_MIN_BARS: usize = 20;

const QUICK_RVOL_PERIOD: usize = 10;
const QUICK_TREND_SMA: usize = 50;

/// Lightweight per-symbol reading for broad-universe triage. No structure
/// pass and no trade plan; just volume, trend, and a rough score, cheap
/// enough to run over thousands of symbols.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickStat {
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
    pub rvol: f64,
    pub trend_bullish: bool,
    pub score: u8,
}

impl QuickStat {
    /// Worth highlighting: a big daily move or heavy relative volume
    pub fn hot(&self) -> bool {
        self.change_pct > 5.0 || self.rvol > 2.0
    }
}

/// Compute the quick reading for one series.
pub fn quick_stat(series: &BarSeries) -> QuickStat {
    let closes = series.closes();
    let volumes = series.volumes();
    let last_close = series.last_close();

    let raw_rvol = indicators::rvol(&volumes, QUICK_RVOL_PERIOD);
    let rvol = if raw_rvol.is_nan() { 0.0 } else { raw_rvol };

    let sma = indicators::sma(&closes, QUICK_TREND_SMA);
    let trend_bullish = sma.last().map(|m| last_close > *m).unwrap_or(false);

    let change_pct = if closes.len() >= 2 {
        let prev = closes[closes.len() - 2];
        (last_close - prev) / prev * 100.0
    } else {
        0.0
    };

    let mut score = 60u8;
    if rvol > 1.5 {
        score += 10;
    }
    if trend_bullish {
        score += 10;
    }

    QuickStat {
        symbol: series.symbol().to_string(),
        price: last_close,
        change_pct,
        rvol,
        trend_bullish,
        score,
    }
}
