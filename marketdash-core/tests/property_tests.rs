//! Property tests for calculation and formatting invariants.
//!
//! 1. Sign of a change determines its tone
//! 2. Unavailable inputs never render as a number
//! 3. Percent changes follow the documented formula
//! 4. Row order equals catalog order

use chrono::{FixedOffset, TimeZone};
use marketdash_core::domain::{Category, ChangeUnit, Missing, QuoteSnapshot, Reading, TickerSpec};
use marketdash_core::report::format::{format_change, DASH};
use marketdash_core::report::{Report, Tone};
use marketdash_core::returns::compute_change;
use marketdash_core::Catalog;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = f64> {
    (0.01..100_000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_yield() -> impl Strategy<Value = f64> {
    (0.0..15.0_f64).prop_map(|y| (y * 1000.0).round() / 1000.0)
}

fn arb_missing() -> impl Strategy<Value = Missing> {
    prop_oneof![
        Just(Missing::NoHistory),
        Just(Missing::FetchFailed),
        Just(Missing::StaleQuote),
        Just(Missing::NoDataSource),
        Just(Missing::ZeroBase),
    ]
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Equity),
        Just(Category::Crypto),
        Just(Category::BondYield),
        Just(Category::Metal),
    ]
}

proptest! {
    #[test]
    fn price_change_tone_follows_sign(cur in arb_price(), base in arb_price()) {
        let change = compute_change(Reading::Present(cur), Reading::Present(base), ChangeUnit::Percent);
        let cell = format_change(change, ChangeUnit::Percent);
        let expected = if cur > base {
            Tone::Gain
        } else if cur < base {
            Tone::Loss
        } else {
            Tone::Flat
        };
        prop_assert_eq!(cell.tone, expected);
    }

    #[test]
    fn yield_change_tone_follows_sign(cur in arb_yield(), base in arb_yield()) {
        let change = compute_change(Reading::Present(cur), Reading::Present(base), ChangeUnit::BasisPoints);
        let cell = format_change(change, ChangeUnit::BasisPoints);
        prop_assert!(cell.text.ends_with(" bps"));
        if cur > base {
            prop_assert_eq!(cell.tone, Tone::Gain);
        } else if cur < base {
            prop_assert_eq!(cell.tone, Tone::Loss);
        }
    }

    #[test]
    fn percent_change_matches_formula(cur in arb_price(), base in arb_price()) {
        let change = compute_change(Reading::Present(cur), Reading::Present(base), ChangeUnit::Percent);
        let expected = (cur - base) / base * 100.0;
        prop_assert_eq!(change, Reading::Present(expected));
        let shown = format_change(change, ChangeUnit::Percent).text;
        if format!("{:.1}", expected.abs()) == "0.0" {
            prop_assert_eq!(shown, "0.0%");
        } else {
            prop_assert_eq!(shown, format!("{expected:+.1}%"));
        }
    }

    #[test]
    fn unavailable_never_renders_as_number(
        reason in arb_missing(),
        value in arb_price(),
        missing_current in any::<bool>(),
    ) {
        let (cur, base) = if missing_current {
            (Reading::Missing(reason), Reading::Present(value))
        } else {
            (Reading::Present(value), Reading::Missing(reason))
        };
        for unit in [ChangeUnit::Percent, ChangeUnit::BasisPoints] {
            let cell = format_change(compute_change(cur, base, unit), unit);
            prop_assert_eq!(cell.text.as_str(), DASH);
            prop_assert_eq!(cell.tone, Tone::Unavailable);
        }
    }

    #[test]
    fn row_order_matches_catalog_order(cats in prop::collection::vec(arb_category(), 1..30)) {
        let tickers: Vec<_> = cats
            .iter()
            .enumerate()
            .map(|(i, &c)| TickerSpec::new(&format!("T{i}"), "x", c))
            .collect();
        let catalog = Catalog { tickers };
        let snaps: Vec<_> = catalog
            .tickers
            .iter()
            .map(|t| QuoteSnapshot::unavailable(&t.symbol, t.category.horizons(), Missing::NoHistory))
            .collect();
        let at = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let report = Report::build(&catalog, &snaps, at, "UTC").unwrap();

        prop_assert_eq!(report.row_count(), catalog.len());
        for section in &report.sections {
            let got: Vec<_> = section.rows.iter().map(|r| r.symbol.clone()).collect();
            let want: Vec<_> = catalog
                .in_category(section.category)
                .map(|t| t.symbol.clone())
                .collect();
            prop_assert_eq!(got, want);
        }
    }
}
