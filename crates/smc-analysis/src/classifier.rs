use signal_core::{FairValueGap, LiquiditySweep, Signal, SwingRange, TradePlan, WaitReason};

/// Entry, stop and target from the structure pass. Entry preference: sweep
/// level first, then the discount gap top, then equilibrium as a reference
/// price. Stop sits under sell-side liquidity, target at buy-side.
pub fn trade_plan(
    range: &SwingRange,
    entry_gap: Option<&FairValueGap>,
    sweep: Option<&LiquiditySweep>,
    stop_loss_buffer: f64,
) -> TradePlan {
    let entry = if let Some(sweep) = sweep {
        sweep.level
    } else if let Some(gap) = entry_gap {
        gap.top
    } else {
        range.equilibrium
    };
    TradePlan {
        entry,
        stop_loss: range.low * stop_loss_buffer,
        take_profit: range.high,
    }
}

/// LONG needs all three: bullish trend, a close in the discount half, and a
/// structural signal (gap or sweep). Everything else is WAIT, with the
/// first blocker in a fixed checking order as the reason. The function is
/// memoryless; every run classifies from scratch.
pub fn classify(
    trend_bullish: bool,
    last_close: f64,
    range: &SwingRange,
    found_gap: bool,
    found_sweep: bool,
) -> (Signal, Option<WaitReason>) {
    if trend_bullish && range.in_discount(last_close) && (found_gap || found_sweep) {
        return (Signal::Long, None);
    }
    let reason = if !found_gap && !found_sweep {
        WaitReason::NoSetup
    } else if !trend_bullish {
        WaitReason::CounterTrend
    } else {
        WaitReason::PremiumZone
    };
    (Signal::Wait, Some(reason))
}
