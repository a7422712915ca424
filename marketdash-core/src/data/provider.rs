//! Data provider trait and structured error types.
//!
//! The QuoteProvider trait abstracts over data sources so the fetcher can be
//! driven by Yahoo Finance in production and by in-memory series in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily close from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("provider returned no closes for {symbol}")]
    NoData { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for market data providers.
pub trait QuoteProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Daily closes for `symbol` between `start` and `end` inclusive.
    ///
    /// Implementations may return the series in any order; non-trading days
    /// are simply absent.
    fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, DataError>;
}

/// Progress callback for the per-ticker fetch loop.
pub trait FetchProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    fn on_complete(&self, symbol: &str, result: &Result<(), DataError>);

    fn on_batch_complete(&self, ok: usize, degraded: usize, total: usize);
}

/// Progress reporter that writes through the `log` facade.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        log::info!("[{}/{}] Fetching {symbol}", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, result: &Result<(), DataError>) {
        match result {
            Ok(()) => log::debug!("  ok: {symbol}"),
            Err(e) => log::warn!("  degraded: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, ok: usize, degraded: usize, total: usize) {
        log::info!("Fetch complete: {ok}/{total} ok, {degraded} degraded");
    }
}
