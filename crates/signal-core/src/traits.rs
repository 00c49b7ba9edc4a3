use async_trait::async_trait;

use crate::{AnalysisError, Bar, Timeframe};

/// Seam to whatever supplies market data (HTTP client, replay file, test
/// fixture). Rate limiting, retries, and backoff all live behind this trait;
/// the analysis side stays free of I/O concerns.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Fetch up to `limit` most recent bars, sorted ascending by timestamp.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, AnalysisError>;
}
