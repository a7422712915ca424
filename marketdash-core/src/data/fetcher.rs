//! Snapshot fetcher: one provider call per ticker, resolved into a QuoteSnapshot.
//!
//! Nothing here returns an error. Provider failures degrade the affected row
//! to explicit missing markers and the loop moves on to the next ticker.

use super::provider::{DailyClose, DataError, FetchProgress, QuoteProvider};
use crate::catalog::Catalog;
use crate::domain::{Horizon, Missing, QuoteSnapshot, Reading, TickerSpec};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// Extra calendar days requested beyond the longest horizon so the
/// on-or-before lookup has a close to land on.
const WINDOW_BUFFER_DAYS: u64 = 14;

/// A reference close older than this many days before its target date is a gap.
pub const MAX_STALENESS_DAYS: i64 = 10;

/// The latest close may trail the run date by at most this many days and
/// still be reported as the current value. The request window is widened by
/// the same amount, so every horizon of an accepted anchor stays in range.
pub const MAX_QUOTE_AGE_DAYS: i64 = 14;

pub struct SnapshotFetcher<'a> {
    provider: &'a dyn QuoteProvider,
}

impl<'a> SnapshotFetcher<'a> {
    pub fn new(provider: &'a dyn QuoteProvider) -> Self {
        Self { provider }
    }

    /// Fetch every ticker in catalog order.
    pub fn fetch_all(
        &self,
        catalog: &Catalog,
        today: NaiveDate,
        progress: &dyn FetchProgress,
    ) -> Vec<QuoteSnapshot> {
        let total = catalog.len();
        let mut degraded = 0;
        let mut snapshots = Vec::with_capacity(total);

        for (i, spec) in catalog.tickers.iter().enumerate() {
            progress.on_start(&spec.symbol, i, total);
            let (snapshot, result) = self.fetch_one(spec, today);
            progress.on_complete(&spec.symbol, &result);
            if result.is_err() || !snapshot.current.is_present() {
                degraded += 1;
            }
            snapshots.push(snapshot);
        }

        progress.on_batch_complete(total - degraded, degraded, total);
        snapshots
    }

    /// Fetch a single ticker. Failures are folded into the snapshot.
    pub fn fetch(&self, spec: &TickerSpec, today: NaiveDate) -> QuoteSnapshot {
        self.fetch_one(spec, today).0
    }

    /// Returns the snapshot plus the provider outcome for progress reporting.
    fn fetch_one(&self, spec: &TickerSpec, today: NaiveDate) -> (QuoteSnapshot, Result<(), DataError>) {
        let horizons = spec.category.horizons();

        if !spec.has_source() {
            log::debug!("{}: no data source, skipping provider", spec.symbol);
            let snap = QuoteSnapshot::unavailable(&spec.symbol, horizons, Missing::NoDataSource);
            return (snap, Ok(()));
        }

        let start = window_start(horizons, today);
        let outcome = self
            .provider
            .daily_closes(&spec.symbol, start, today)
            .and_then(|closes| {
                let snap = resolve_snapshot(&spec.symbol, horizons, today, closes);
                if snap.current == Reading::Missing(Missing::FetchFailed) {
                    Err(DataError::NoData {
                        symbol: spec.symbol.clone(),
                    })
                } else {
                    Ok(snap)
                }
            });

        match outcome {
            Ok(snap) => {
                if snap.current == Reading::Missing(Missing::StaleQuote) {
                    log::warn!(
                        "  stale: {} last closed on {}",
                        spec.symbol,
                        snap.as_of.map(|d| d.to_string()).unwrap_or_default()
                    );
                }
                (snap, Ok(()))
            }
            Err(e) => {
                let snap = QuoteSnapshot::unavailable(&spec.symbol, horizons, Missing::FetchFailed);
                (snap, Err(e))
            }
        }
    }
}

/// First date to request: the deepest horizon target from the oldest
/// acceptable anchor, minus the lookup buffer.
fn window_start(horizons: &[Horizon], today: NaiveDate) -> NaiveDate {
    let oldest_anchor = today
        .checked_sub_days(Days::new(MAX_QUOTE_AGE_DAYS as u64))
        .unwrap_or(today);
    let deepest = horizons
        .iter()
        .filter_map(|h| h.target_date(oldest_anchor))
        .min()
        .unwrap_or(oldest_anchor);
    deepest
        .checked_sub_days(Days::new(WINDOW_BUFFER_DAYS))
        .unwrap_or(deepest)
}

/// Turn a raw close series into a snapshot.
///
/// The latest close is the current value and its date anchors every horizon.
/// Each horizon takes the latest close dated on or before its target date.
/// When a date appears more than once, the entry that came last wins (Yahoo
/// may append a live bar after the regular one).
///
/// An empty series yields `FetchFailed` for the whole row. A latest close more
/// than [`MAX_QUOTE_AGE_DAYS`] before `today` yields `StaleQuote` as the
/// current value; `as_of` still records its date.
pub fn resolve_snapshot(
    symbol: &str,
    horizons: &[Horizon],
    today: NaiveDate,
    closes: Vec<DailyClose>,
) -> QuoteSnapshot {
    let by_date: BTreeMap<NaiveDate, f64> = closes
        .into_iter()
        .filter(|c| c.close.is_finite())
        .map(|c| (c.date, c.close))
        .collect();
    let closes: Vec<DailyClose> = by_date
        .into_iter()
        .map(|(date, close)| DailyClose::new(date, close))
        .collect();

    let Some(latest) = closes.last().copied() else {
        return QuoteSnapshot::unavailable(symbol, horizons, Missing::FetchFailed);
    };

    let current = if (today - latest.date).num_days() > MAX_QUOTE_AGE_DAYS {
        Reading::Missing(Missing::StaleQuote)
    } else {
        Reading::Present(latest.close)
    };

    let history: BTreeMap<Horizon, Reading> = horizons
        .iter()
        .map(|&h| {
            let reading: Reading = h
                .target_date(latest.date)
                .and_then(|target| close_on_or_before(&closes, target))
                .into();
            (h, reading)
        })
        .collect();

    QuoteSnapshot {
        symbol: symbol.to_string(),
        current,
        as_of: Some(latest.date),
        history,
    }
}

/// Latest close dated on or before `target`, if one exists within the staleness limit.
fn close_on_or_before(closes: &[DailyClose], target: NaiveDate) -> Option<f64> {
    let idx = closes.partition_point(|c| c.date <= target);
    let found = closes.get(idx.checked_sub(1)?)?;
    if (target - found.date).num_days() > MAX_STALENESS_DAYS {
        return None;
    }
    Some(found.close)
}
