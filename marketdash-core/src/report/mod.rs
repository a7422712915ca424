//! Report model and rendering.
//!
//! A [`Report`] groups return rows by category in catalog order. The
//! [`format`] module turns rows into display cells, [`pdf`] lays those out
//! into a paginated A4 document.

pub mod fonts;
pub mod format;
pub mod pdf;

pub use format::{Cell, Table, Tone};
pub use pdf::{render_pdf, RenderedDocument};

use crate::catalog::Catalog;
use crate::domain::{Category, Horizon, QuoteSnapshot};
use crate::returns::{build_row, ReturnRow};
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Errors surfaced while building or rendering a report.
///
/// These indicate a broken contract between calculator and renderer and are fatal.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("report has no rows")]
    EmptyReport,

    #[error("snapshot count {snapshots} does not match catalog size {catalog}")]
    SnapshotCountMismatch { catalog: usize, snapshots: usize },

    #[error("malformed row {symbol}: {reason}")]
    MalformedRow { symbol: String, reason: String },
}

/// All rows of one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub category: Category,
    pub rows: Vec<ReturnRow>,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self.category {
            Category::Equity => "Equity & Sector ETF Returns",
            Category::Crypto => "Cryptocurrency Returns",
            Category::BondYield => "US Treasury & Japan Bond Yields",
            Category::Metal => "Precious Metals",
        }
    }
}

/// A data-source caveat attached to one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub symbol: String,
    pub label: String,
    pub text: String,
}

/// The complete report for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Generation time in the display zone.
    pub generated_at: DateTime<FixedOffset>,
    /// Short zone name printed after times, e.g. "SGT".
    pub zone_label: String,
    pub sections: Vec<Section>,
}

impl Report {
    /// Assemble the report from the catalog and the snapshots fetched for it.
    ///
    /// `snapshots` must be in catalog order, one per ticker. Every catalog
    /// entry produces a row; sections follow category order and empty
    /// categories are omitted.
    pub fn build(
        catalog: &Catalog,
        snapshots: &[QuoteSnapshot],
        generated_at: DateTime<FixedOffset>,
        zone_label: &str,
    ) -> Result<Self, RenderError> {
        if catalog.len() != snapshots.len() {
            return Err(RenderError::SnapshotCountMismatch {
                catalog: catalog.len(),
                snapshots: snapshots.len(),
            });
        }

        let mut sections: Vec<Section> = Category::ALL
            .iter()
            .map(|&category| Section {
                category,
                rows: Vec::new(),
            })
            .collect();

        for (spec, snapshot) in catalog.tickers.iter().zip(snapshots) {
            if spec.symbol != snapshot.symbol {
                return Err(RenderError::MalformedRow {
                    symbol: spec.symbol.clone(),
                    reason: format!("paired with snapshot for {}", snapshot.symbol),
                });
            }
            let row = build_row(spec, snapshot);
            if let Some(section) = sections.iter_mut().find(|s| s.category == spec.category) {
                section.rows.push(row);
            }
        }

        sections.retain(|s| !s.rows.is_empty());

        Ok(Self {
            generated_at,
            zone_label: zone_label.to_string(),
            sections,
        })
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &ReturnRow> {
        self.sections.iter().flat_map(|s| s.rows.iter())
    }

    /// Rows whose current value could not be obtained.
    pub fn degraded_count(&self) -> usize {
        self.rows().filter(|r| !r.current.is_present()).count()
    }

    /// Footnotes in row order.
    pub fn footnotes(&self) -> Vec<Footnote> {
        self.rows()
            .filter_map(|r| {
                r.note.as_ref().map(|text| Footnote {
                    symbol: r.symbol.clone(),
                    label: r.label.clone(),
                    text: text.clone(),
                })
            })
            .collect()
    }

    /// Check the calculator's output contract before anything is drawn.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.row_count() == 0 {
            return Err(RenderError::EmptyReport);
        }
        for row in self.rows() {
            let expected: &[Horizon] = row.category.horizons();
            let keys: Vec<Horizon> = row.changes.keys().copied().collect();
            if keys != expected {
                return Err(RenderError::MalformedRow {
                    symbol: row.symbol.clone(),
                    reason: format!("horizons {keys:?}, expected {expected:?}"),
                });
            }
            let non_finite = std::iter::once(row.current)
                .chain(row.changes.values().copied())
                .filter_map(|r| r.value())
                .any(|v| !v.is_finite());
            if non_finite {
                return Err(RenderError::MalformedRow {
                    symbol: row.symbol.clone(),
                    reason: "non-finite value".into(),
                });
            }
        }
        Ok(())
    }
}
