use anyhow::Result;
use chrono::{DateTime, Utc};
use market_bias::BiasAssessment;
use serde::{Deserialize, Serialize};
use signal_core::{Signal, SignalRecord};

/// One watchlist group's results, best score first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupReport {
    pub name: String,
    pub records: Vec<SignalRecord>,
}

impl GroupReport {
    pub fn new(name: impl Into<String>, mut records: Vec<SignalRecord>) -> Self {
        records.sort_by(|a, b| b.score.cmp(&a.score));
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn long_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_long()).count()
    }
}

/// Flat row for the cross-group screener table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerRow {
    pub symbol: String,
    pub price: f64,
    pub signal: Signal,
    pub score: u8,
    pub rvol: f64,
    pub perf_30d: f64,
    /// Strict-screen verdict; None when the screen could not be evaluated
    pub strict_pass: Option<bool>,
    /// Beta versus the primary benchmark, when defined
    pub beta: Option<f64>,
}

impl ScreenerRow {
    pub fn from_record(record: &SignalRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            price: record.price,
            signal: record.signal,
            score: record.score,
            rvol: record.indicators.rvol,
            perf_30d: record.indicators.perf_30d,
            strict_pass: None,
            beta: None,
        }
    }
}

/// Full output of one watchlist scan. Rebuilt from scratch every run and
/// handed to the rendering layer as one serializable value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub market: BiasAssessment,
    pub groups: Vec<GroupReport>,
    /// LONG-only cut of the triage list
    pub triage: GroupReport,
    /// Deduplicated LONG setups across all groups, best first
    pub screener: Vec<ScreenerRow>,
    /// Distinct symbols attempted
    pub scanned: usize,
    /// Symbols dropped for missing, malformed, or too-short data
    pub skipped: usize,
}

impl ScanReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
