use serde::{Deserialize, Serialize};

use super::Horizon;

/// Instrument category. Declaration order is the section order of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Equity,
    Crypto,
    BondYield,
    Metal,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Equity,
        Category::Crypto,
        Category::BondYield,
        Category::Metal,
    ];

    /// Lookback windows reported for this category.
    ///
    /// Yields only carry the short end; everything else gets the full ladder.
    pub fn horizons(self) -> &'static [Horizon] {
        match self {
            Category::BondYield => &Horizon::SHORT,
            _ => &Horizon::ALL,
        }
    }

    /// Unit in which changes for this category are expressed.
    pub fn change_unit(self) -> ChangeUnit {
        match self {
            Category::BondYield => ChangeUnit::BasisPoints,
            _ => ChangeUnit::Percent,
        }
    }
}

/// How a change between two values is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeUnit {
    /// Relative change, in percent.
    Percent,
    /// Absolute change of a percentage-point quantity, in basis points.
    BasisPoints,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSpec {
    pub symbol: String,
    pub label: String,
    pub category: Category,
    /// Set when the provider has no usable series for this instrument.
    /// The text is printed as the row's footnote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsupported: Option<String>,
}

impl TickerSpec {
    pub fn new(symbol: &str, label: &str, category: Category) -> Self {
        Self {
            symbol: symbol.to_string(),
            label: label.to_string(),
            category,
            unsupported: None,
        }
    }

    /// Mark this ticker as having no data source.
    pub fn without_source(mut self, note: &str) -> Self {
        self.unsupported = Some(note.to_string());
        self
    }

    pub fn has_source(&self) -> bool {
        self.unsupported.is_none()
    }
}
