use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Horizon, Missing, Reading};

/// Current and historical values fetched for one ticker in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub current: Reading,
    /// Date of the close used as the current value.
    pub as_of: Option<NaiveDate>,
    /// Reference close per horizon.
    pub history: BTreeMap<Horizon, Reading>,
}

impl QuoteSnapshot {
    /// Snapshot where every slot carries the same missing reason.
    pub fn unavailable(symbol: &str, horizons: &[Horizon], reason: Missing) -> Self {
        Self {
            symbol: symbol.to_string(),
            current: Reading::Missing(reason),
            as_of: None,
            history: horizons
                .iter()
                .map(|&h| (h, Reading::Missing(reason)))
                .collect(),
        }
    }

    /// Historical value for `horizon`; an unknown horizon reads as `NoHistory`.
    pub fn reference(&self, horizon: Horizon) -> Reading {
        self.history
            .get(&horizon)
            .copied()
            .unwrap_or(Reading::Missing(Missing::NoHistory))
    }
}
