//! Transactional-email HTTP API transport.
//!
//! Posts a Resend-style JSON payload with the PDF base64-encoded inline.

use super::{DeliveryError, Envelope, Mailer};
use crate::report::RenderedDocument;
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content: String,
    content_type: &'a str,
}

pub struct HttpApiMailer {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl HttpApiMailer {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, DeliveryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DeliveryError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

fn payload<'a>(document: &'a RenderedDocument, envelope: &'a Envelope) -> SendRequest<'a> {
    SendRequest {
        from: &envelope.from,
        to: &envelope.to,
        subject: &envelope.subject,
        text: &envelope.body,
        attachments: vec![AttachmentPayload {
            filename: document.filename(),
            content: general_purpose::STANDARD.encode(document.bytes()),
            content_type: document.content_type(),
        }],
    }
}

impl Mailer for HttpApiMailer {
    fn name(&self) -> &str {
        "http_api"
    }

    fn send(&self, document: &RenderedDocument, envelope: &Envelope) -> Result<(), DeliveryError> {
        log::info!("Sending via {} to {} recipient(s)", self.endpoint, envelope.to.len());

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload(document, envelope))
            .send()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DeliveryError::RateLimited {
                transport: self.name().into(),
            });
        }

        let detail = resp.text().unwrap_or_default();
        if status.is_client_error() {
            Err(DeliveryError::Rejected {
                transport: self.name().into(),
                reason: format!("HTTP {status}: {detail}"),
            })
        } else {
            Err(DeliveryError::Transport(format!("HTTP {status}: {detail}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::domain::{Missing, QuoteSnapshot};
    use crate::report::{render_pdf, Report};
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn payload_embeds_base64_pdf_and_recipient_list() {
        let catalog = Catalog::default_dashboard();
        let snaps: Vec<_> = catalog
            .tickers
            .iter()
            .map(|t| QuoteSnapshot::unavailable(&t.symbol, t.category.horizons(), Missing::NoHistory))
            .collect();
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, 23, 0, 0)
            .unwrap();
        let doc = render_pdf(&Report::build(&catalog, &snaps, at, "UTC").unwrap()).unwrap();
        let env = Envelope {
            from: "bot@example.com".into(),
            to: vec!["a@example.com".into(), "b@example.com".into()],
            subject: "s".into(),
            body: "b".into(),
        };

        let json = serde_json::to_value(payload(&doc, &env)).unwrap();
        assert_eq!(json["to"].as_array().unwrap().len(), 2);
        assert_eq!(json["attachments"][0]["filename"], "Market_Dashboard_20261018.pdf");
        let encoded = json["attachments"][0]["content"].as_str().unwrap();
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(decoded, doc.bytes());
    }
}
