use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use market_bias::assess_market;
use signal_core::{
    AnalysisError, Bar, BarProvider, BarSeries, ScanConfig, ScoreWeights, SignalRecord,
    StrictFilter, Watchlist,
};
use smc_analysis::{indicators, SmcAnalyzer};
use tokio::task::JoinSet;

pub mod quick_scan;
pub mod report;

pub use quick_scan::{quick_stat, QuickStat};
pub use report::{GroupReport, ScanReport, ScreenerRow};

/// Internal cache entry with timestamp
struct CacheEntry {
    bars: Vec<Bar>,
    cached_at: DateTime<Utc>,
}

/// Watchlist scan pipeline: fetch, validate at the boundary, analyze,
/// assemble the report. Holds no per-run state; the bar cache only spares
/// refetches inside the TTL window, so a symbol shared by several groups
/// (or doubling as a benchmark) hits the provider once.
pub struct ScanOrchestrator {
    provider: Arc<dyn BarProvider>,
    analyzer: SmcAnalyzer,
    config: ScanConfig,
    strict_filter: Option<StrictFilter>,
    bars_cache: DashMap<String, CacheEntry>,
}

impl ScanOrchestrator {
    pub fn new(provider: Arc<dyn BarProvider>) -> Self {
        Self {
            provider,
            analyzer: SmcAnalyzer::new(),
            config: ScanConfig::default(),
            strict_filter: None,
            bars_cache: DashMap::new(),
        }
    }

    /// Replace the run-level settings
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Swap in a custom scoring strategy
    pub fn with_weights(mut self, weights: ScoreWeights) -> Result<Self> {
        self.analyzer = SmcAnalyzer::with_weights(weights)?;
        Ok(self)
    }

    /// Enable the institutional screen on the screener rows
    pub fn with_strict_filter(mut self, filter: StrictFilter) -> Self {
        self.strict_filter = Some(filter);
        self
    }

    /// Run the full watchlist scan and assemble the report.
    ///
    /// Per-ticker failures (missing data, malformed bars, short history)
    /// are logged and counted, never fatal to the run.
    pub async fn scan(&self, watchlist: &Watchlist) -> Result<ScanReport> {
        let benchmarks = self.fetch_benchmarks().await;
        let market = assess_market(&benchmarks);
        tracing::info!("🌍 Market: {} ({})", market.bias.name(), market.description);

        let mut symbols = watchlist.unique_symbols();
        for symbol in &watchlist.triage {
            if !symbols.contains(symbol) {
                symbols.push(symbol.clone());
            }
        }
        let scanned = symbols.len();
        tracing::info!("📊 Scanning {} symbols", scanned);

        let (fetched, mut skipped) = self.fetch_all(symbols).await;

        let mut series_list = Vec::with_capacity(fetched.len());
        for (symbol, bars) in fetched {
            if bars.len() < self.config.min_bars {
                tracing::warn!(
                    "Skipping {}: {} bars (need {})",
                    symbol,
                    bars.len(),
                    self.config.min_bars
                );
                skipped += 1;
                continue;
            }
            match BarSeries::new(symbol.as_str(), self.config.timeframe, bars) {
                Ok(series) => series_list.push(series),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", symbol, e);
                    skipped += 1;
                }
            }
        }

        let records = self.analyzer.analyze_batch(&series_list, market.bonus);
        let by_symbol: HashMap<String, SignalRecord> = records
            .into_iter()
            .map(|r| (r.symbol.clone(), r))
            .collect();
        let series_by_symbol: HashMap<String, BarSeries> = series_list
            .into_iter()
            .map(|s| (s.symbol().to_string(), s))
            .collect();

        let groups: Vec<GroupReport> = watchlist
            .groups
            .iter()
            .map(|group| {
                let records = group
                    .symbols
                    .iter()
                    .filter_map(|s| by_symbol.get(s).cloned())
                    .collect();
                GroupReport::new(group.name.clone(), records)
            })
            .collect();

        let triage_records: Vec<SignalRecord> = watchlist
            .triage
            .iter()
            .filter_map(|s| by_symbol.get(s).cloned())
            .filter(|r| r.is_long())
            .collect();
        let triage = GroupReport::new("🎯 Daily Focus", triage_records);

        let screener =
            self.build_screener(watchlist, &by_symbol, &series_by_symbol, benchmarks.first());

        tracing::info!(
            "✅ Scan complete: {} symbols, {} skipped, {} LONG setups",
            scanned,
            skipped,
            screener.len()
        );

        Ok(ScanReport {
            generated_at: Utc::now(),
            market,
            groups,
            triage,
            screener,
            scanned,
            skipped,
        })
    }

    /// Broad-universe pre-screen: cheap per-symbol reading, keeping only
    /// heavy-volume symbols in an uptrend. Results sorted by relative
    /// volume, busiest first.
    pub async fn quick_scan_symbols(&self, symbols: &[String], min_rvol: f64) -> Vec<QuickStat> {
        let (fetched, _) = self.fetch_all(symbols.to_vec()).await;

        let mut stats = Vec::new();
        for (symbol, bars) in fetched {
            if bars.len() < quick_scan::QUICK_MIN_BARS {
                continue;
            }
            match BarSeries::new(symbol.as_str(), self.config.timeframe, bars) {
                Ok(series) => stats.push(quick_stat(&series)),
                Err(e) => tracing::debug!("Quick scan skipping {}: {}", symbol, e),
            }
        }

        stats.retain(|s| s.rvol >= min_rvol && s.trend_bullish);
        stats.sort_by(|a, b| {
            b.rvol
                .partial_cmp(&a.rvol)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stats
    }

    /// Benchmark histories for the bias read. No minimum-length gate here:
    /// a thin benchmark must reach the assessment so it can veto a
    /// directional call instead of silently dropping out.
    async fn fetch_benchmarks(&self) -> Vec<BarSeries> {
        let mut benchmarks = Vec::new();
        for symbol in &self.config.benchmark_symbols {
            match self.get_bars(symbol).await {
                Ok(bars) => match BarSeries::new(symbol.as_str(), self.config.timeframe, bars) {
                    Ok(series) => benchmarks.push(series),
                    Err(e) => tracing::warn!("Benchmark {} unusable: {}", symbol, e),
                },
                Err(e) => tracing::warn!("Benchmark {} unavailable: {}", symbol, e),
            }
        }
        benchmarks
    }

    /// Fan the fetches out through a JoinSet; cache hits skip the spawn
    /// entirely. Returns raw bars per symbol plus the fetch-failure count.
    async fn fetch_all(&self, symbols: Vec<String>) -> (Vec<(String, Vec<Bar>)>, usize) {
        let mut pending = JoinSet::new();
        let mut fetched = Vec::new();
        let mut failures = 0usize;

        for symbol in symbols {
            if let Some(bars) = self.cached_bars(&symbol) {
                fetched.push((symbol, bars));
                continue;
            }
            let provider = Arc::clone(&self.provider);
            let timeframe = self.config.timeframe;
            let limit = self.config.history_limit;
            pending.spawn(async move {
                let result = provider.fetch_bars(&symbol, timeframe, limit).await;
                (symbol, result)
            });
        }

        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((symbol, Ok(bars))) => {
                    self.store_bars(&symbol, bars.clone());
                    fetched.push((symbol, bars));
                }
                Ok((symbol, Err(e))) => {
                    tracing::warn!("Skipping {}: {}", symbol, e);
                    failures += 1;
                }
                Err(e) => {
                    tracing::error!("Fetch task failed: {}", e);
                    failures += 1;
                }
            }
        }

        (fetched, failures)
    }

    /// Bars for one symbol, served from the cache inside the TTL
    async fn get_bars(&self, symbol: &str) -> Result<Vec<Bar>, AnalysisError> {
        if let Some(bars) = self.cached_bars(symbol) {
            return Ok(bars);
        }
        let bars = self
            .provider
            .fetch_bars(symbol, self.config.timeframe, self.config.history_limit)
            .await?;
        self.store_bars(symbol, bars.clone());
        Ok(bars)
    }

    fn cached_bars(&self, symbol: &str) -> Option<Vec<Bar>> {
        let entry = self.bars_cache.get(&self.cache_key(symbol))?;
        let age = (Utc::now() - entry.cached_at).num_seconds();
        if age < self.config.cache_ttl_secs as i64 {
            Some(entry.bars.clone())
        } else {
            None
        }
    }

    fn store_bars(&self, symbol: &str, bars: Vec<Bar>) {
        self.bars_cache.insert(
            self.cache_key(symbol),
            CacheEntry {
                bars,
                cached_at: Utc::now(),
            },
        );
    }

    fn cache_key(&self, symbol: &str) -> String {
        format!("{}:{}", symbol, self.config.timeframe.as_str())
    }

    /// Deduplicated LONG rows across the sector groups and the triage list,
    /// strict screen applied when it is configured and a benchmark is
    /// available.
    fn build_screener(
        &self,
        watchlist: &Watchlist,
        by_symbol: &HashMap<String, SignalRecord>,
        series_by_symbol: &HashMap<String, BarSeries>,
        benchmark: Option<&BarSeries>,
    ) -> Vec<ScreenerRow> {
        let mut rows = Vec::new();
        let mut seen = HashSet::new();

        let candidates = watchlist
            .groups
            .iter()
            .flat_map(|group| group.symbols.iter())
            .chain(watchlist.triage.iter());

        for symbol in candidates {
            if !seen.insert(symbol.clone()) {
                continue;
            }
            let record = match by_symbol.get(symbol) {
                Some(r) if r.is_long() => r,
                _ => continue,
            };
            let mut row = ScreenerRow::from_record(record);
            if let Some(series) = series_by_symbol.get(symbol) {
                let (strict_pass, beta) = self.evaluate_strict(series, record, benchmark);
                row.strict_pass = strict_pass;
                row.beta = beta;
            }
            rows.push(row);
        }

        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows
    }

    /// Price above the slow SMA, monthly dollar volume over the floor, and
    /// beta at or above the floor. Undefined beta counts as zero, so thin
    /// return histories fail the screen instead of sneaking past it.
    fn evaluate_strict(
        &self,
        series: &BarSeries,
        record: &SignalRecord,
        benchmark: Option<&BarSeries>,
    ) -> (Option<bool>, Option<f64>) {
        let filter = match &self.strict_filter {
            Some(f) => f,
            None => return (None, None),
        };
        let benchmark = match benchmark {
            Some(b) => b,
            None => return (None, None),
        };

        let stock_returns = indicators::returns(&series.closes());
        let bench_returns = indicators::returns(&benchmark.closes());
        let beta = indicators::beta(&stock_returns, &bench_returns, filter.min_beta_samples);

        let above_sma = if filter.require_above_slow_sma {
            !record.indicators.sma200.is_nan() && record.price > record.indicators.sma200
        } else {
            true
        };
        let volume_ok = indicators::dollar_volume(series.bars(), filter.dollar_volume_period)
            .map(|v| v > filter.min_monthly_dollar_volume)
            .unwrap_or(false);
        let beta_ok = beta.unwrap_or(0.0) >= filter.min_beta;

        (Some(above_sma && volume_ok && beta_ok), beta)
    }
}
