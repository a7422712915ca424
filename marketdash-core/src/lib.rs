//! Market Dashboard Core — fetch, calculate, render and deliver the daily report.
//!
//! The run is a one-way batch pipeline:
//! - Catalog: ordered tickers grouped by category
//! - Data: Yahoo Finance closes resolved into per-horizon snapshots
//! - Returns: percent or basis-point change per horizon
//! - Report: category sections rendered to a paginated PDF
//! - Delivery: SMTP or HTTP-API mailer behind one `Mailer` trait
//!
//! Missing data never aborts a run. It travels as an explicit [`domain::Missing`]
//! reason and renders as a gray dash.

pub mod catalog;
pub mod config;
pub mod data;
pub mod delivery;
pub mod domain;
pub mod pipeline;
pub mod report;
pub mod returns;

pub use catalog::{Catalog, CatalogError};
pub use config::{ConfigError, DeliveryConfig, DisplayConfig, TransportConfig};
pub use pipeline::{build_document, run_pipeline, Delivery, PipelineError, RunOptions, RunSummary};
