use anyhow::Result;
use chrono::Utc;
use rayon::prelude::*;

use signal_core::{BarSeries, IndicatorConfig, ScoreWeights, SignalRecord, StructureConfig};

use crate::classifier;
use crate::indicators;
use crate::scoring::{ScoreInputs, ScoringEngine};
use crate::structure;

/// The per-series pipeline: structure, indicators, plan, classification,
/// score, assembled into one SignalRecord. Holds only configuration, so a
/// single instance can serve any number of series from any thread.
pub struct SmcAnalyzer {
    structure: StructureConfig,
    indicators: IndicatorConfig,
    scoring: ScoringEngine,
}

impl SmcAnalyzer {
    pub fn new() -> Self {
        Self {
            structure: StructureConfig::default(),
            indicators: IndicatorConfig::default(),
            scoring: ScoringEngine::default(),
        }
    }

    pub fn with_configs(
        structure: StructureConfig,
        indicators: IndicatorConfig,
        scoring: ScoringEngine,
    ) -> Self {
        Self {
            structure,
            indicators,
            scoring,
        }
    }

    /// Default pipeline with a custom scoring strategy. Fails when the
    /// weights are internally inconsistent.
    pub fn with_weights(weights: ScoreWeights) -> Result<Self> {
        Ok(Self {
            structure: StructureConfig::default(),
            indicators: IndicatorConfig::default(),
            scoring: ScoringEngine::new(weights)?,
        })
    }

    /// Analyze one series. Pure: no I/O, no shared state, same inputs give
    /// the same record (modulo the generation timestamp).
    pub fn analyze(&self, series: &BarSeries, market_bonus: i32) -> SignalRecord {
        let snapshot = structure::analyze_structure(series, &self.structure);
        let ind = indicators::compute_indicators(series, &self.indicators);
        let last_close = series.last_close();

        let plan = classifier::trade_plan(
            &snapshot.range,
            snapshot.entry_gap.as_ref(),
            snapshot.sweep.as_ref(),
            self.structure.stop_loss_buffer,
        );
        let (signal, wait_reason) = classifier::classify(
            ind.trend_bullish,
            last_close,
            &snapshot.range,
            snapshot.entry_gap.is_some(),
            snapshot.sweep.is_some(),
        );
        let score = self.scoring.score(&ScoreInputs {
            plan: &plan,
            last_close,
            sweep_found: snapshot.sweep.is_some(),
            has_entry_candidate: snapshot.sweep.is_some() || snapshot.entry_gap.is_some(),
            indicators: &ind,
            market_bonus,
        });

        SignalRecord {
            symbol: series.symbol().to_string(),
            timeframe: series.timeframe(),
            generated_at: Utc::now(),
            price: last_close,
            signal,
            wait_reason,
            plan,
            score: score.value,
            reasons: score.reasons,
            risk_reward: score.risk_reward,
            confluence: score.confluence,
            indicators: ind,
            structure: snapshot,
            market_bonus,
            bar_count: series.len(),
        }
    }

    /// Analyze many pre-fetched series on the rayon pool. Each item is
    /// independent, so this is a straight parallel map.
    pub fn analyze_batch(&self, series: &[BarSeries], market_bonus: i32) -> Vec<SignalRecord> {
        series
            .par_iter()
            .map(|s| self.analyze(s, market_bonus))
            .collect()
    }
}

impl Default for SmcAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
