//! Lookback horizons and their calendar offsets.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed lookback window over which change is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Horizon {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
}

impl Horizon {
    pub const ALL: [Horizon; 7] = [
        Horizon::OneDay,
        Horizon::OneWeek,
        Horizon::OneMonth,
        Horizon::ThreeMonths,
        Horizon::SixMonths,
        Horizon::OneYear,
        Horizon::ThreeYears,
    ];

    pub const SHORT: [Horizon; 3] = [Horizon::OneDay, Horizon::OneWeek, Horizon::OneMonth];

    pub fn label(self) -> &'static str {
        match self {
            Horizon::OneDay => "1D",
            Horizon::OneWeek => "1W",
            Horizon::OneMonth => "1M",
            Horizon::ThreeMonths => "3M",
            Horizon::SixMonths => "6M",
            Horizon::OneYear => "1Y",
            Horizon::ThreeYears => "3Y",
        }
    }

    /// Calendar date this horizon points back to from `anchor`.
    ///
    /// Month arithmetic clamps to the end of month (Mar 31 - 1M = Feb 28/29).
    /// Returns `None` only if the result falls outside chrono's date range.
    pub fn target_date(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Horizon::OneDay => anchor.checked_sub_days(Days::new(1)),
            Horizon::OneWeek => anchor.checked_sub_days(Days::new(7)),
            Horizon::OneMonth => anchor.checked_sub_months(Months::new(1)),
            Horizon::ThreeMonths => anchor.checked_sub_months(Months::new(3)),
            Horizon::SixMonths => anchor.checked_sub_months(Months::new(6)),
            Horizon::OneYear => anchor.checked_sub_months(Months::new(12)),
            Horizon::ThreeYears => anchor.checked_sub_months(Months::new(36)),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
