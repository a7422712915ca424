use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a value is absent.
///
/// Transient gaps and permanently unsupported instruments are kept apart so the
/// report can footnote them accurately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Missing {
    /// No close on or near the requested date (holiday run, listing too recent, feed gap).
    NoHistory,
    /// No usable quotes were obtained for the ticker this run: the request
    /// failed, or the provider returned an empty series.
    FetchFailed,
    /// The latest close is too old to stand in as the current value.
    StaleQuote,
    /// No data source exists for the instrument.
    NoDataSource,
    /// Reference value was zero, so a relative change is undefined.
    ZeroBase,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Missing::NoHistory => "no history",
            Missing::FetchFailed => "fetch failed",
            Missing::StaleQuote => "stale quote",
            Missing::NoDataSource => "no data source",
            Missing::ZeroBase => "zero base",
        };
        f.write_str(s)
    }
}

/// A value that is either present or explicitly unavailable. Never a silent zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reading {
    Present(f64),
    Missing(Missing),
}

impl Reading {
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Present(v) => Some(v),
            Reading::Missing(_) => None,
        }
    }

    pub fn missing_reason(self) -> Option<Missing> {
        match self {
            Reading::Present(_) => None,
            Reading::Missing(m) => Some(m),
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Reading::Present(_))
    }
}

impl From<Option<f64>> for Reading {
    /// `None` maps to `Missing::NoHistory`.
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(x) => Reading::Present(x),
            None => Reading::Missing(Missing::NoHistory),
        }
    }
}
