//! SMTP transport via `lettre`.

use super::{DeliveryError, Envelope, Mailer};
use crate::report::RenderedDocument;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Sends through an SMTP relay over implicit TLS (port 465).
pub struct SmtpMailer {
    transport: SmtpTransport,
    host: String,
}

impl SmtpMailer {
    pub fn new(host: &str, username: &str, password: &str) -> Result<Self, DeliveryError> {
        let transport = SmtpTransport::relay(host)
            .map_err(|e| DeliveryError::Transport(format!("smtp relay {host}: {e}")))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self {
            transport,
            host: host.to_string(),
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// MIME message: plain-text body plus the PDF attachment.
pub fn build_message(document: &RenderedDocument, envelope: &Envelope) -> Result<Message, DeliveryError> {
    let mut builder = Message::builder()
        .from(mailbox(&envelope.from)?)
        .subject(envelope.subject.clone());
    for to in &envelope.to {
        builder = builder.to(mailbox(to)?);
    }

    let content_type = ContentType::parse(document.content_type())
        .map_err(|e| DeliveryError::Message(e.to_string()))?;
    let attachment = Attachment::new(document.filename().to_string())
        .body(document.bytes().to_vec(), content_type);

    builder
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(envelope.body.clone()))
                .singlepart(attachment),
        )
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

impl Mailer for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    fn send(&self, document: &RenderedDocument, envelope: &Envelope) -> Result<(), DeliveryError> {
        let message = build_message(document, envelope)?;
        log::info!("Sending via SMTP relay {} to {} recipient(s)", self.host, envelope.to.len());

        self.transport.send(&message).map_err(|e| {
            if e.is_permanent() {
                DeliveryError::Rejected {
                    transport: "smtp".into(),
                    reason: e.to_string(),
                }
            } else {
                DeliveryError::Transport(e.to_string())
            }
        })?;
        Ok(())
    }
}
