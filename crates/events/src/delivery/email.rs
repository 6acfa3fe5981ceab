//! Threshold summary delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the HTML
//! summary rendered by [`SummaryRenderer`] to a fixed recipient list.
//! Configuration is loaded from environment variables; if `SMTP_HOST` or
//! `SMTP_TO` is missing, [`EmailConfig::from_env`] returns `None` and no
//! mailer should be constructed.

use async_trait::async_trait;
use dx_db::models::threshold::Threshold;
use lettre::message::Mailbox;

use crate::notifier::{NotifyError, ThresholdNotifier};
use crate::summary::SummaryRenderer;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    /// The summary template failed to compile or render.
    #[error("Email template error: {0}")]
    Template(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@dx-dashboard.local";

/// Default sender display name when `SMTP_FROM_NAME` is not set.
const DEFAULT_FROM_NAME: &str = "DX Dashboard";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Display name attached to the "From" address.
    pub from_name: String,
    /// Addresses every summary is sent to.
    pub recipients: Vec<String>,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set or `SMTP_TO` lists no
    /// addresses, signalling that email delivery is not configured.
    ///
    /// | Variable         | Required | Default                       |
    /// |------------------|----------|-------------------------------|
    /// | `SMTP_HOST`      | yes      | (none)                        |
    /// | `SMTP_TO`        | yes      | (none, comma-separated)       |
    /// | `SMTP_PORT`      | no       | `587`                         |
    /// | `SMTP_FROM`      | no       | `noreply@dx-dashboard.local`  |
    /// | `SMTP_FROM_NAME` | no       | `DX Dashboard`                |
    /// | `SMTP_USER`      | no       | (none)                        |
    /// | `SMTP_PASSWORD`  | no       | (none)                        |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let smtp_host = lookup("SMTP_HOST")?;
        let recipients = parse_recipients(&lookup("SMTP_TO").unwrap_or_default());
        if recipients.is_empty() {
            return None;
        }

        Some(Self {
            smtp_host,
            smtp_port: lookup("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            from_name: lookup("SMTP_FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            recipients,
            smtp_user: lookup("SMTP_USER"),
            smtp_password: lookup("SMTP_PASSWORD"),
        })
    }
}

fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends threshold summary emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
    renderer: SummaryRenderer,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let renderer = SummaryRenderer::new().map_err(|e| EmailError::Template(e.to_string()))?;
        Ok(Self { config, renderer })
    }

    /// Build the summary message for `changed` without sending it.
    pub fn build_message(&self, changed: &[Threshold]) -> Result<lettre::Message, EmailError> {
        use lettre::message::header::ContentType;

        let html = self
            .renderer
            .render(changed)
            .map_err(|e| EmailError::Template(e.to_string()))?;

        let from = Mailbox::new(
            Some(self.config.from_name.clone()),
            self.config.from_address.parse()?,
        );

        let mut builder = lettre::Message::builder()
            .from(from)
            .subject(self.renderer.subject())
            .header(ContentType::TEXT_HTML);
        for recipient in &self.config.recipients {
            builder = builder.to(Mailbox::new(None, recipient.parse()?));
        }

        builder
            .body(html)
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Send the summary for `changed` to every configured recipient.
    pub async fn deliver(&self, changed: &[Threshold]) -> Result<(), EmailError> {
        use lettre::{
            transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport,
            Tokio1Executor,
        };

        let email = self.build_message(changed)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(
            recipients = self.config.recipients.len(),
            thresholds = changed.len(),
            "Threshold summary email sent"
        );
        Ok(())
    }
}

#[async_trait]
impl ThresholdNotifier for EmailDelivery {
    async fn notify(&self, changed: &[Threshold]) -> Result<(), NotifyError> {
        self.deliver(changed).await.map_err(NotifyError::from)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dx_core::threshold_type::ThresholdType;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn test_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            from_name: DEFAULT_FROM_NAME.to_string(),
            recipients: vec!["ops@example.com".to_string(), "lead@example.com".to_string()],
            smtp_user: None,
            smtp_password: None,
        }
    }

    fn threshold() -> Threshold {
        Threshold {
            id: 1,
            group_id: Some(4),
            threshold_type_id: ThresholdType::GROUP_ID,
            created_by: Some("admin".into()),
            created_date: None,
            updated_by: None,
            updated_date: None,
            approved_by: Some("alice".into()),
            at_risk_threshold: None,
            no_detection_threshold: None,
            in_warning_threshold: None,
            full_threshold: None,
        }
    }

    #[test]
    fn from_lookup_returns_none_without_smtp_host() {
        let lookup = lookup_from(&[("SMTP_TO", "ops@example.com")]);
        assert!(EmailConfig::from_lookup(lookup).is_none());
    }

    #[test]
    fn from_lookup_returns_none_without_recipients() {
        let lookup = lookup_from(&[("SMTP_HOST", "smtp.example.com"), ("SMTP_TO", " , ")]);
        assert!(EmailConfig::from_lookup(lookup).is_none());
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let lookup = lookup_from(&[
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_TO", "ops@example.com, lead@example.com"),
            ("SMTP_PORT", "not-a-port"),
        ]);
        let config = EmailConfig::from_lookup(lookup).unwrap();
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.from_address, "noreply@dx-dashboard.local");
        assert_eq!(config.from_name, "DX Dashboard");
        assert_eq!(config.recipients, vec!["ops@example.com", "lead@example.com"]);
        assert!(config.smtp_user.is_none());
    }

    #[test]
    fn build_message_addresses_all_recipients() {
        let delivery = EmailDelivery::new(test_config()).unwrap();
        let message = delivery.build_message(&[threshold()]).unwrap();

        let to: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(to, vec!["ops@example.com", "lead@example.com"]);

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Thresholds Update"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn build_message_rejects_bad_recipient() {
        let mut config = test_config();
        config.recipients = vec!["not-an-email".to_string()];
        let delivery = EmailDelivery::new(config).unwrap();
        let err = delivery.build_message(&[threshold()]).unwrap_err();
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }
}
