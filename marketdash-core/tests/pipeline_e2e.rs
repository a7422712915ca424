//! End-to-end runs against an in-memory provider and a recording mailer.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use marketdash_core::data::{DailyClose, DataError, LogProgress, QuoteProvider};
use marketdash_core::delivery::{DeliveryError, Envelope, Mailer};
use marketdash_core::domain::{Category, Horizon, Missing, Reading, TickerSpec};
use marketdash_core::report::format::{section_table, DASH, NO_SOURCE};
use marketdash_core::report::{RenderedDocument, Tone};
use marketdash_core::{
    build_document, run_pipeline, Catalog, Delivery, DisplayConfig, PipelineError, RunOptions,
};
use std::cell::{Cell as StdCell, RefCell};
use std::collections::HashMap;

// ── Fixtures ─────────────────────────────────────────────────────────

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 23, 0, 0).unwrap()
}

fn utc_display() -> DisplayConfig {
    DisplayConfig::from_lookup(|k| (k == "REPORT_UTC_OFFSET_HOURS").then(|| "0".to_string())).unwrap()
}

/// Weekday closes from `start` to `end` at a flat `level`.
fn weekdays(start: NaiveDate, end: NaiveDate, level: f64) -> Vec<DailyClose> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|day| DailyClose::new(day, level))
        .collect()
}

fn set(closes: &mut [DailyClose], date: NaiveDate, value: f64) {
    let c = closes.iter_mut().find(|c| c.date == date).unwrap();
    c.close = value;
}

struct MemoryProvider {
    series: HashMap<String, Vec<DailyClose>>,
    calls: StdCell<usize>,
}

impl MemoryProvider {
    fn new() -> Self {
        Self {
            series: HashMap::new(),
            calls: StdCell::new(0),
        }
    }

    fn with(mut self, symbol: &str, closes: Vec<DailyClose>) -> Self {
        self.series.insert(symbol.to_string(), closes);
        self
    }
}

impl QuoteProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>, DataError> {
        self.calls.set(self.calls.get() + 1);
        let series = self.series.get(symbol).ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        let closes: Vec<DailyClose> = series
            .iter()
            .filter(|c| c.date >= start && c.date <= end)
            .copied()
            .collect();
        if closes.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(closes)
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: RefCell<Vec<(String, Vec<u8>, Envelope)>>,
}

impl Mailer for RecordingMailer {
    fn name(&self) -> &str {
        "recording"
    }

    fn send(&self, document: &RenderedDocument, envelope: &Envelope) -> Result<(), DeliveryError> {
        self.sent.borrow_mut().push((
            document.filename().to_string(),
            document.bytes().to_vec(),
            envelope.clone(),
        ));
        Ok(())
    }
}

struct RejectingMailer;

impl Mailer for RejectingMailer {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn send(&self, _: &RenderedDocument, _: &Envelope) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected {
            transport: "rejecting".into(),
            reason: "bad credential".into(),
        })
    }
}

fn catalog() -> Catalog {
    Catalog {
        tickers: vec![
            TickerSpec::new("SPY", "S&P 500 ETF", Category::Equity),
            TickerSpec::new("NEWCO", "Recent Listing", Category::Equity),
            TickerSpec::new("GONE", "Delisted Fund", Category::Equity),
            TickerSpec::new("^TNX", "US 10-Year Yield", Category::BondYield),
            TickerSpec::new("JP10Y", "Japan 10-Year Yield", Category::BondYield)
                .without_source("Yahoo Finance does not provide a reliable JGB ticker"),
            TickerSpec::new("GC=F", "Gold Futures", Category::Metal),
        ],
    }
}

fn provider() -> MemoryProvider {
    let mut spy = weekdays(d(2023, 6, 1), d(2026, 10, 16), 600.0);
    set(&mut spy, d(2026, 10, 9), 570.0);
    set(&mut spy, d(2026, 10, 16), 580.0);

    let newco = weekdays(d(2025, 1, 6), d(2026, 10, 16), 20.0);

    let mut tnx = weekdays(d(2026, 8, 1), d(2026, 10, 16), 4.10);
    set(&mut tnx, d(2026, 10, 15), 4.20);
    set(&mut tnx, d(2026, 10, 16), 4.25);

    let mut gold = weekdays(d(2023, 6, 1), d(2026, 10, 16), 2000.0);
    set(&mut gold, d(2026, 10, 16), 2000.0);

    MemoryProvider::new()
        .with("SPY", spy)
        .with("NEWCO", newco)
        .with("^TNX", tnx)
        .with("GC=F", gold)
}

fn send_to(mailer: &dyn Mailer) -> Delivery<'_> {
    Delivery {
        mailer,
        sender: "bot@example.com".into(),
        recipients: vec!["a@example.com".into(), "b@example.com".into()],
    }
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn spy_weekly_change_is_green_one_decimal() {
    let (report, _) =
        build_document(&catalog(), &provider(), &LogProgress, now(), &utc_display()).unwrap();
    let equity = &report.sections[0];
    assert_eq!(equity.category, Category::Equity);

    let table = section_table(equity);
    let week_col = table.headers.iter().position(|h| h == "1W").unwrap();
    let spy = &table.rows[0];
    assert_eq!(spy[0].text, "SPY");
    assert_eq!(spy[2].text, "$580.00");
    assert_eq!(spy[week_col].text, "+1.8%");
    assert_eq!(spy[week_col].tone, Tone::Gain);

    // 1D: 600 -> 580
    assert_eq!(spy[3].text, "-3.3%");
    assert_eq!(spy[3].tone, Tone::Loss);
}

#[test]
fn treasury_daily_change_is_five_bps() {
    let (report, _) =
        build_document(&catalog(), &provider(), &LogProgress, now(), &utc_display()).unwrap();
    let yields = report
        .sections
        .iter()
        .find(|s| s.category == Category::BondYield)
        .unwrap();
    let table = section_table(yields);
    assert_eq!(table.headers[3], "1D (bps)");
    assert_eq!(table.headers.len(), 6);

    let tnx = &table.rows[0];
    assert_eq!(tnx[2].text, "4.25%");
    assert_eq!(tnx[3].text, "+5 bps");
    assert_eq!(tnx[3].tone, Tone::Gain);
}

#[test]
fn recent_listing_shows_gray_dash_for_three_years() {
    let (report, _) =
        build_document(&catalog(), &provider(), &LogProgress, now(), &utc_display()).unwrap();
    let newco = report.rows().find(|r| r.symbol == "NEWCO").unwrap();
    assert_eq!(
        newco.change(Horizon::ThreeYears),
        Reading::Missing(Missing::NoHistory)
    );
    assert_eq!(newco.change(Horizon::OneYear), Reading::Present(0.0));

    let table = section_table(&report.sections[0]);
    let three_y = table.headers.iter().position(|h| h == "3Y").unwrap();
    let cell = &table.rows[1][three_y];
    assert_eq!(cell.text, DASH);
    assert_eq!(cell.tone, Tone::Unavailable);
}

#[test]
fn no_source_and_failed_rows_stay_in_place_with_notes() {
    let (report, _) =
        build_document(&catalog(), &provider(), &LogProgress, now(), &utc_display()).unwrap();

    let symbols: Vec<_> = report.rows().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, ["SPY", "NEWCO", "GONE", "^TNX", "JP10Y", "GC=F"]);

    let gone = report.rows().find(|r| r.symbol == "GONE").unwrap();
    assert_eq!(gone.current, Reading::Missing(Missing::FetchFailed));

    let jp = report.rows().find(|r| r.symbol == "JP10Y").unwrap();
    assert_eq!(jp.current, Reading::Missing(Missing::NoDataSource));

    let notes = report.footnotes();
    let noted: Vec<_> = notes.iter().map(|n| n.symbol.as_str()).collect();
    assert_eq!(noted, ["GONE", "JP10Y"]);
    assert!(notes[1].text.contains("JGB"));

    let yields = report
        .sections
        .iter()
        .find(|s| s.category == Category::BondYield)
        .unwrap();
    let jp_row = &section_table(yields).rows[1];
    assert_eq!(jp_row[1].text, "Japan 10-Year Yield *");
    assert_eq!(jp_row[2].text, NO_SOURCE);
    assert!(jp_row[3..].iter().all(|c| c.text == DASH && c.tone == Tone::Unavailable));

    assert_eq!(report.degraded_count(), 2);
}

#[test]
fn full_run_sends_one_complete_pdf() {
    let mailer = RecordingMailer::default();
    let dir = tempfile::tempdir().unwrap();
    let options = RunOptions {
        display: utc_display(),
        artifact_path: Some(dir.path().join("market_report.pdf")),
    };

    let summary = run_pipeline(
        &catalog(),
        &provider(),
        &LogProgress,
        Some(&send_to(&mailer)),
        now(),
        &options,
    )
    .unwrap();

    assert!(summary.delivered);
    assert_eq!(summary.rows, 6);
    assert_eq!(summary.degraded_rows, 2);

    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    let (filename, bytes, envelope) = &sent[0];
    assert_eq!(filename, "Market_Dashboard_20261016.pdf");
    assert!(bytes.starts_with(b"%PDF-"));
    assert_eq!(bytes.len(), summary.document_bytes);
    assert_eq!(envelope.to, ["a@example.com", "b@example.com"]);
    assert!(envelope.subject.ends_with("Oct 16, 2026"));

    let artifact = summary.artifact.unwrap();
    assert_eq!(&std::fs::read(artifact).unwrap(), bytes);
}

#[test]
fn delivery_failure_fails_the_run() {
    let err = run_pipeline(
        &catalog(),
        &provider(),
        &LogProgress,
        Some(&send_to(&RejectingMailer)),
        now(),
        &RunOptions {
            display: utc_display(),
            artifact_path: None,
        },
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Delivery { ref transport, .. } if transport == "rejecting"));
}

#[test]
fn dry_run_skips_delivery() {
    let summary = run_pipeline(
        &catalog(),
        &provider(),
        &LogProgress,
        None,
        now(),
        &RunOptions {
            display: utc_display(),
            artifact_path: None,
        },
    )
    .unwrap();
    assert!(!summary.delivered);
    assert!(summary.artifact.is_none());
}

#[test]
fn reruns_produce_identical_documents() {
    let p = provider();
    let (_, first) = build_document(&catalog(), &p, &LogProgress, now(), &utc_display()).unwrap();
    let (_, second) = build_document(&catalog(), &p, &LogProgress, now(), &utc_display()).unwrap();
    assert_eq!(first.bytes(), second.bytes());
}

#[test]
fn unsupported_ticker_is_not_requested() {
    let p = provider();
    build_document(&catalog(), &p, &LogProgress, now(), &utc_display()).unwrap();
    // six tickers, JP10Y skipped
    assert_eq!(p.calls.get(), 5);
}

#[test]
fn empty_series_row_is_footnoted_not_blank() {
    let catalog = Catalog {
        tickers: vec![
            TickerSpec::new("SPY", "S&P 500 ETF", Category::Equity),
            TickerSpec::new("HALTED", "Suspended Fund", Category::Equity),
        ],
    };
    let p = provider().with("HALTED", Vec::new());
    let (report, _) = build_document(&catalog, &p, &LogProgress, now(), &utc_display()).unwrap();

    let halted = report.rows().find(|r| r.symbol == "HALTED").unwrap();
    assert_eq!(halted.current, Reading::Missing(Missing::FetchFailed));
    assert_eq!(report.degraded_count(), 1);

    let notes = report.footnotes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].symbol, "HALTED");
    assert_eq!(notes[0].text, "data unavailable for this run");
}
