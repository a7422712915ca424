//! Ticker catalog: the static, ordered list of instruments in the report.
//!
//! The built-in catalog covers US equity and sector ETFs, crypto, Treasury
//! yields and precious metals. A TOML file with the same shape can replace it:
//!
//! ```toml
//! [[tickers]]
//! symbol = "SPY"
//! label = "S&P 500 ETF"
//! category = "equity"
//!
//! [[tickers]]
//! symbol = "JP10Y"
//! label = "Japan 10-Year Yield"
//! category = "bond_yield"
//! unsupported = "Yahoo Finance does not provide a reliable JGB ticker"
//! ```

use crate::domain::{Category, TickerSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse catalog TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("catalog has no tickers")]
    Empty,

    #[error("duplicate ticker '{0}' in catalog")]
    Duplicate(String),
}

/// Ordered ticker catalog. Declaration order is preserved everywhere downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub tickers: Vec<TickerSpec>,
}

impl Catalog {
    /// Load a catalog from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a catalog from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.tickers.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for t in &self.tickers {
            if !seen.insert(t.symbol.as_str()) {
                return Err(CatalogError::Duplicate(t.symbol.clone()));
            }
        }
        Ok(())
    }

    /// Tickers of one category, in declaration order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &TickerSpec> {
        self.tickers.iter().filter(move |t| t.category == category)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// The built-in daily dashboard catalog.
    pub fn default_dashboard() -> Self {
        use Category::*;

        let equities = [
            ("SPY", "S&P 500 ETF"),
            ("QQQ", "Nasdaq 100 ETF"),
            ("IGV", "Software Sector ETF"),
            ("XLK", "Technology"),
            ("XLF", "Financials"),
            ("XLY", "Cons. Discretionary"),
            ("XLC", "Communication Svcs"),
            ("XLI", "Industrials"),
            ("XLB", "Materials"),
            ("XLE", "Energy"),
            ("XLP", "Consumer Staples"),
            ("XLV", "Health Care"),
            ("XLU", "Utilities"),
            ("XLRE", "Real Estate"),
        ];
        let crypto = [("BTC-USD", "Bitcoin"), ("ETH-USD", "Ethereum")];
        let yields = [
            ("^IRX", "US 3-Month T-Bill"),
            ("2YY=F", "US 2-Year Yield"),
            ("^TNX", "US 10-Year Yield"),
            ("^TYX", "US 30-Year Yield"),
        ];
        let metals = [
            ("GC=F", "Gold Futures"),
            ("SI=F", "Silver Futures"),
            ("GLD", "SPDR Gold ETF"),
            ("SLV", "iShares Silver ETF"),
        ];

        let mut tickers = Vec::new();
        tickers.extend(equities.iter().map(|(s, l)| TickerSpec::new(s, l, Equity)));
        tickers.extend(crypto.iter().map(|(s, l)| TickerSpec::new(s, l, Crypto)));
        tickers.extend(yields.iter().map(|(s, l)| TickerSpec::new(s, l, BondYield)));
        tickers.push(
            TickerSpec::new("JP10Y", "Japan 10-Year Yield", BondYield)
                .without_source("Yahoo Finance does not provide a reliable JGB ticker"),
        );
        tickers.extend(metals.iter().map(|(s, l)| TickerSpec::new(s, l, Metal)));

        Self { tickers }
    }

    /// Serialize the catalog to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::default_dashboard()
    }
}
