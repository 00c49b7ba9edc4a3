use anyhow::{bail, Result};
use signal_core::{IndicatorSet, QualityScore, ScoreWeights, TradePlan};

/// Everything one scoring pass looks at, assembled by the analyzer.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs<'a> {
    pub plan: &'a TradePlan,
    pub last_close: f64,
    pub sweep_found: bool,
    /// True when the entry came from structure (sweep or discount gap).
    /// With the equilibrium fallback there is no proposed trade, so the
    /// geometry rules (risk/reward, entry distance) stay silent.
    pub has_entry_candidate: bool,
    pub indicators: &'a IndicatorSet,
    /// Caller-supplied market bias bonus, folded into the base
    pub market_bonus: i32,
}

/// Additive quality score over a fixed rule order. Weights and thresholds
/// are data, so strategy variants are configs instead of code forks.
pub struct ScoringEngine {
    weights: ScoreWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoreWeights) -> Result<Self> {
        if !(0..=99).contains(&weights.base) {
            bail!("base score must be within 0..=99");
        }
        if weights.rr_good_threshold > weights.rr_excellent_threshold {
            bail!("good risk/reward threshold above the excellent threshold");
        }
        if weights.rsi_pullback_low > weights.rsi_pullback_high {
            bail!("RSI pullback band is inverted");
        }
        if weights.rvol_elevated_threshold > weights.rvol_surge_threshold {
            bail!("elevated RVOL threshold above the surge threshold");
        }
        if weights.sniper_distance_pct > weights.near_distance_pct {
            bail!("sniper distance wider than the near-entry distance");
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Pure scoring pass. Rules run in a fixed order and each appends a
    /// reason when it fires; NaN indicators simply fail every comparison
    /// and trigger nothing. The result is clamped to 0..=99.
    pub fn score(&self, inputs: &ScoreInputs) -> QualityScore {
        let w = &self.weights;
        let ind = inputs.indicators;
        let mut score = w.base + inputs.market_bonus;
        let mut reasons = Vec::new();
        let mut confluence = 0u8;

        let rr = inputs.plan.risk_reward();

        if inputs.has_entry_candidate {
            if rr >= w.rr_excellent_threshold {
                score += w.rr_excellent_bonus;
                reasons.push(format!("Excellent risk/reward ({rr:.1}R)"));
            } else if rr >= w.rr_good_threshold {
                score += w.rr_good_bonus;
                reasons.push(format!("Good risk/reward ({rr:.1}R)"));
            }
            if rr < w.rr_poor_threshold {
                score += w.rr_poor_penalty;
                reasons.push(format!("Poor risk/reward ({rr:.1}R)"));
            }
        }

        if ind.rsi >= w.rsi_pullback_low && ind.rsi <= w.rsi_pullback_high {
            score += w.rsi_pullback_bonus;
            reasons.push(format!("RSI in pullback zone ({:.1})", ind.rsi));
            confluence += 1;
        } else if ind.rsi > w.rsi_overheated_threshold {
            score += w.rsi_overheated_penalty;
            reasons.push(format!("RSI overheated ({:.1})", ind.rsi));
        }

        if ind.rvol > w.rvol_surge_threshold {
            score += w.rvol_surge_bonus;
            reasons.push(format!("Volume surge ({:.1}x average)", ind.rvol));
        } else if ind.rvol > w.rvol_elevated_threshold {
            score += w.rvol_elevated_bonus;
            reasons.push(format!("Elevated volume ({:.1}x average)", ind.rvol));
        }

        if inputs.sweep_found {
            score += w.sweep_bonus;
            reasons.push("Liquidity sweep reclaimed".to_string());
            confluence += 1;
        }

        if ind.golden_cross {
            score += w.golden_cross_bonus;
            reasons.push("Fresh golden cross".to_string());
            confluence += 1;
        }

        if inputs.has_entry_candidate && inputs.plan.entry > 0.0 {
            let distance = (inputs.last_close - inputs.plan.entry).abs() / inputs.plan.entry;
            if distance < w.sniper_distance_pct {
                score += w.sniper_bonus;
                reasons.push(format!("Sniper entry ({:.1}% away)", distance * 100.0));
            } else if distance < w.near_distance_pct {
                score += w.near_bonus;
                reasons.push(format!("Near entry zone ({:.1}% away)", distance * 100.0));
            }
        }

        if ind.trend_bullish {
            score += w.trend_bonus;
            reasons.push("Long-term uptrend".to_string());
        }

        // the bonus itself is already in the base; this is the audit note
        if inputs.market_bonus > 0 {
            reasons.push(format!("Market tailwind (+{})", inputs.market_bonus));
        } else if inputs.market_bonus < 0 {
            reasons.push(format!("Market headwind ({})", inputs.market_bonus));
        }

        QualityScore {
            value: score.clamp(0, 99) as u8,
            reasons,
            risk_reward: rr,
            confluence,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
        }
    }
}
