//! Report delivery: one `Mailer` capability, two interchangeable transports.
//!
//! - [`SmtpMailer`]: SMTP relay with implicit TLS and an app password (`lettre`)
//! - [`HttpApiMailer`]: transactional-email HTTP API with a bearer key (`reqwest`)

pub mod http_api;
pub mod smtp;

pub use http_api::HttpApiMailer;
pub use smtp::SmtpMailer;

use crate::config::TransportConfig;
use crate::report::pdf::TITLE;
use crate::report::RenderedDocument;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("send rejected by {transport}: {reason}")]
    Rejected { transport: String, reason: String },

    #[error("rate limited by {transport}")]
    RateLimited { transport: String },
}

/// Addressing and text of one outgoing report email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl Envelope {
    /// Standard subject and greeting for a report generated at `generated_at`.
    pub fn for_report(
        from: &str,
        to: &[String],
        generated_at: DateTime<FixedOffset>,
        zone_label: &str,
    ) -> Self {
        let subject = format!("{TITLE} \u{2014} {}", generated_at.format("%b %d, %Y"));
        let body = format!(
            "Good morning!\n\n\
             Attached is your daily market dashboard for {}.\n\n\
             Covers: US equity and sector ETFs, BTC, ETH, US Treasury yields, \
             Japan 10Y, gold and silver.\n\n\
             \u{2014} Auto-generated at {} {}",
            generated_at.format("%A, %B %d, %Y"),
            generated_at.format("%I:%M %p"),
            zone_label,
        );
        Self {
            from: from.to_string(),
            to: to.to_vec(),
            subject,
            body,
        }
    }
}

/// Anything that can deliver a rendered report.
pub trait Mailer {
    /// Short transport name for logs and errors.
    fn name(&self) -> &str;

    fn send(&self, document: &RenderedDocument, envelope: &Envelope) -> Result<(), DeliveryError>;
}

/// Build the mailer selected by configuration.
pub fn mailer_from_config(transport: &TransportConfig) -> Result<Box<dyn Mailer>, DeliveryError> {
    match transport {
        TransportConfig::Smtp {
            host,
            username,
            password,
        } => Ok(Box::new(SmtpMailer::new(host, username, password)?)),
        TransportConfig::HttpApi { endpoint, api_key } => {
            Ok(Box::new(HttpApiMailer::new(endpoint, api_key)?))
        }
    }
}
