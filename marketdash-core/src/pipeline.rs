//! End-to-end run: fetch, calculate, render, then deliver.
//!
//! Delivery happens only after the document has been fully rendered, and
//! only a [`RenderedDocument`] can be handed to a mailer.

use crate::catalog::Catalog;
use crate::config::DisplayConfig;
use crate::data::{FetchProgress, QuoteProvider, SnapshotFetcher};
use crate::delivery::{DeliveryError, Envelope, Mailer};
use crate::report::{render_pdf, RenderError, RenderedDocument, Report};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("delivery via {transport} failed: {source}")]
    Delivery {
        transport: String,
        #[source]
        source: DeliveryError,
    },
}

/// Who receives the report and how.
pub struct Delivery<'a> {
    pub mailer: &'a dyn Mailer,
    pub sender: String,
    pub recipients: Vec<String>,
}

/// Per-run options.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub display: DisplayConfig,
    /// Where to keep a copy of the PDF. Write failures are logged, not fatal.
    pub artifact_path: Option<PathBuf>,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub degraded_rows: usize,
    pub document_bytes: usize,
    pub pages: usize,
    pub artifact: Option<PathBuf>,
    pub delivered: bool,
}

/// Fetch, calculate and render. No delivery.
pub fn build_document(
    catalog: &Catalog,
    provider: &dyn QuoteProvider,
    progress: &dyn FetchProgress,
    now: DateTime<Utc>,
    display: &DisplayConfig,
) -> Result<(Report, RenderedDocument), RenderError> {
    let local_now = now.with_timezone(&display.utc_offset);

    log::info!("Fetching {} tickers from {}", catalog.len(), provider.name());
    let snapshots = SnapshotFetcher::new(provider).fetch_all(catalog, local_now.date_naive(), progress);

    let report = Report::build(catalog, &snapshots, local_now, &display.zone_label)?;
    let document = render_pdf(&report)?;
    log::info!(
        "Rendered {} ({} page(s), {} bytes)",
        document.filename(),
        document.page_count(),
        document.len()
    );
    Ok((report, document))
}

/// Run the whole pipeline. Pass `delivery: None` to render without sending.
pub fn run_pipeline(
    catalog: &Catalog,
    provider: &dyn QuoteProvider,
    progress: &dyn FetchProgress,
    delivery: Option<&Delivery<'_>>,
    now: DateTime<Utc>,
    options: &RunOptions,
) -> Result<RunSummary, PipelineError> {
    let (report, document) = build_document(catalog, provider, progress, now, &options.display)?;

    let artifact = options.artifact_path.as_ref().and_then(|path| {
        match document.write_to(path) {
            Ok(()) => {
                log::info!("Saved report to {}", path.display());
                Some(path.clone())
            }
            Err(e) => {
                log::warn!("could not write artifact {}: {e}", path.display());
                None
            }
        }
    });

    let delivered = match delivery {
        Some(d) => {
            let envelope = Envelope::for_report(
                &d.sender,
                &d.recipients,
                report.generated_at,
                &report.zone_label,
            );
            d.mailer
                .send(&document, &envelope)
                .map_err(|source| PipelineError::Delivery {
                    transport: d.mailer.name().to_string(),
                    source,
                })?;
            log::info!("Email sent to {}", d.recipients.join(", "));
            true
        }
        None => {
            log::info!("Delivery skipped");
            false
        }
    };

    Ok(RunSummary {
        rows: report.row_count(),
        degraded_rows: report.degraded_count(),
        document_bytes: document.len(),
        pages: document.page_count(),
        artifact,
        delivered,
    })
}
