//! Return calculator: change per horizon between the current value and each reference.

use crate::domain::{Category, ChangeUnit, Horizon, Missing, QuoteSnapshot, Reading, TickerSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One report row: a ticker's current value and its change over each horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRow {
    pub symbol: String,
    pub label: String,
    pub category: Category,
    pub current: Reading,
    pub changes: BTreeMap<Horizon, Reading>,
    pub unit: ChangeUnit,
    /// Data-source caveat printed as a footnote.
    pub note: Option<String>,
}

impl ReturnRow {
    /// Change over `horizon`; horizons outside the category read as `NoHistory`.
    pub fn change(&self, horizon: Horizon) -> Reading {
        self.changes
            .get(&horizon)
            .copied()
            .unwrap_or(Reading::Missing(Missing::NoHistory))
    }

    /// Row-level missing reason, when the current value itself is unavailable.
    pub fn unavailable_reason(&self) -> Option<Missing> {
        self.current.missing_reason()
    }
}

/// Change from `reference` to `current` in `unit`.
///
/// - Percent: `(current - reference) / reference * 100`
/// - Basis points: `(current - reference) * 100`, inputs being percentage-point yields
///
/// A missing input propagates its reason; a zero reference for a percent
/// change yields `ZeroBase`.
pub fn compute_change(current: Reading, reference: Reading, unit: ChangeUnit) -> Reading {
    let cur = match current {
        Reading::Present(v) => v,
        missing => return missing,
    };
    let base = match reference {
        Reading::Present(v) => v,
        missing => return missing,
    };

    let change = match unit {
        ChangeUnit::Percent => {
            if base == 0.0 {
                return Reading::Missing(Missing::ZeroBase);
            }
            (cur - base) / base * 100.0
        }
        ChangeUnit::BasisPoints => (cur - base) * 100.0,
    };

    if change.is_finite() {
        Reading::Present(change)
    } else {
        Reading::Missing(Missing::ZeroBase)
    }
}

/// Footnote for a row whose current value is missing for a run-specific reason.
fn row_note(snapshot: &QuoteSnapshot) -> Option<String> {
    match snapshot.current {
        Reading::Missing(Missing::FetchFailed) => Some("data unavailable for this run".to_string()),
        Reading::Missing(Missing::StaleQuote) => Some(match snapshot.as_of {
            Some(date) => format!("no close since {}", date.format("%b %d, %Y")),
            None => "no recent close".to_string(),
        }),
        _ => None,
    }
}

/// Build the report row for one catalog entry from its snapshot.
pub fn build_row(spec: &TickerSpec, snapshot: &QuoteSnapshot) -> ReturnRow {
    let unit = spec.category.change_unit();
    let changes = spec
        .category
        .horizons()
        .iter()
        .map(|&h| (h, compute_change(snapshot.current, snapshot.reference(h), unit)))
        .collect();

    let note = spec.unsupported.clone().or_else(|| row_note(snapshot));

    ReturnRow {
        symbol: spec.symbol.clone(),
        label: spec.label.clone(),
        category: spec.category,
        current: snapshot.current,
        changes,
        unit,
        note,
    }
}
