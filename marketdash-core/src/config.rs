//! Environment configuration.
//!
//! Everything is read through a lookup function so callers (and tests) decide
//! where values come from; [`DeliveryConfig::from_env`] and
//! [`DisplayConfig::from_env`] use the process environment.

use chrono::{FixedOffset, Offset, Utc};
use lettre::message::Mailbox;
use std::fmt;
use thiserror::Error;

pub const ENV_SENDER: &str = "EMAIL_SENDER";
pub const ENV_RECIPIENT: &str = "EMAIL_RECIPIENT";
pub const ENV_TRANSPORT: &str = "MAIL_TRANSPORT";
pub const ENV_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const ENV_API_KEY: &str = "MAIL_API_KEY";
pub const ENV_API_URL: &str = "MAIL_API_URL";
pub const ENV_UTC_OFFSET: &str = "REPORT_UTC_OFFSET_HOURS";
pub const ENV_TZ_LABEL: &str = "REPORT_TZ_LABEL";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("no recipients configured: set EMAIL_RECIPIENT to one or more comma-separated addresses")]
    NoRecipients,

    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("{transport} transport needs {var}")]
    MissingCredential {
        transport: &'static str,
        var: &'static str,
    },

    #[error("unknown MAIL_TRANSPORT '{0}' (expected 'smtp' or 'api')")]
    UnknownTransport(String),

    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Which transport delivers the report, with its credential.
#[derive(Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Smtp {
        host: String,
        username: String,
        password: String,
    },
    HttpApi {
        endpoint: String,
        api_key: String,
    },
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportConfig::Smtp { host, username, .. } => f
                .debug_struct("Smtp")
                .field("host", host)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            TransportConfig::HttpApi { endpoint, .. } => f
                .debug_struct("HttpApi")
                .field("endpoint", endpoint)
                .field("api_key", &"<redacted>")
                .finish(),
        }
    }
}

/// Sender, recipients and transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub sender: String,
    pub recipients: Vec<String>,
    pub transport: TransportConfig,
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_address(address: &str) -> Result<(), ConfigError> {
    address
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Split a comma-separated recipient list. Blank entries are ignored; at least
/// one valid address is required.
pub fn parse_recipients(raw: &str) -> Result<Vec<String>, ConfigError> {
    let recipients: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if recipients.is_empty() {
        return Err(ConfigError::NoRecipients);
    }
    for r in &recipients {
        validate_address(r)?;
    }
    Ok(recipients)
}

impl DeliveryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Recipients are checked before the sender and the credential, so an
    /// empty list is always reported as `NoRecipients`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let recipients = parse_recipients(&lookup(ENV_RECIPIENT).unwrap_or_default())?;

        let sender = non_empty(&lookup, ENV_SENDER).ok_or(ConfigError::MissingVar(ENV_SENDER))?;
        validate_address(&sender)?;

        let transport_name = non_empty(&lookup, ENV_TRANSPORT).unwrap_or_else(|| "smtp".into());
        let transport = match transport_name.to_ascii_lowercase().as_str() {
            "smtp" => TransportConfig::Smtp {
                host: non_empty(&lookup, ENV_SMTP_HOST).unwrap_or_else(|| DEFAULT_SMTP_HOST.into()),
                username: non_empty(&lookup, ENV_SMTP_USERNAME).unwrap_or_else(|| sender.clone()),
                password: non_empty(&lookup, ENV_PASSWORD).ok_or(ConfigError::MissingCredential {
                    transport: "smtp",
                    var: ENV_PASSWORD,
                })?,
            },
            "api" | "http" => TransportConfig::HttpApi {
                endpoint: non_empty(&lookup, ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.into()),
                api_key: non_empty(&lookup, ENV_API_KEY).ok_or(ConfigError::MissingCredential {
                    transport: "api",
                    var: ENV_API_KEY,
                })?,
            },
            _ => return Err(ConfigError::UnknownTransport(transport_name)),
        };

        Ok(Self {
            sender,
            recipients,
            transport,
        })
    }
}

/// How timestamps are shown in the report and the email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub utc_offset: FixedOffset,
    pub zone_label: String,
}

impl Default for DisplayConfig {
    /// Singapore time, UTC+8.
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
            zone_label: "SGT".into(),
        }
    }
}

impl DisplayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(raw) = non_empty(&lookup, ENV_UTC_OFFSET) {
            let invalid = || ConfigError::InvalidValue {
                var: ENV_UTC_OFFSET,
                value: raw.clone(),
            };
            let hours: f64 = raw.parse().map_err(|_| invalid())?;
            let secs = (hours * 3600.0).round();
            cfg.utc_offset = if secs.abs() < 86_400.0 {
                FixedOffset::east_opt(secs as i32).ok_or_else(invalid)?
            } else {
                return Err(invalid());
            };
            if non_empty(&lookup, ENV_TZ_LABEL).is_none() {
                cfg.zone_label = format_offset_label(hours);
            }
        }
        if let Some(label) = non_empty(&lookup, ENV_TZ_LABEL) {
            cfg.zone_label = label;
        }
        Ok(cfg)
    }
}

fn format_offset_label(hours: f64) -> String {
    if hours == 0.0 {
        "UTC".into()
    } else {
        format!("UTC{hours:+}")
    }
}
