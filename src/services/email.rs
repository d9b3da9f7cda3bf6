//! Email notifications: HTML mail over SMTP via lettre.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::EmailConfig;
use crate::error::ServiceError;
use crate::services::ExternalResult;

const PROVIDER: &str = "smtp";

/// A message ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivers an already-validated email.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Address every message is sent from.
    fn from_address(&self) -> &str;

    async fn deliver(&self, email: OutgoingEmail) -> Result<(), ServiceError>;
}

/// SMTP relay transport (SendGrid's relay by default).
pub struct SmtpEmailTransport {
    config: EmailConfig,
}

impl SmtpEmailTransport {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

fn build_message(from: &str, email: &OutgoingEmail) -> Result<Message, ServiceError> {
    let sender = from
        .parse::<Mailbox>()
        .map_err(|e| ServiceError::InvalidAddress {
            address: from.to_string(),
            reason: format!("{e}"),
        })?;
    let to = email.to.parse::<Mailbox>().map_err(|e| ServiceError::InvalidAddress {
        address: email.to.clone(),
        reason: format!("{e}"),
    })?;

    Message::builder()
        .from(sender)
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(email.html_body.clone())
        .map_err(|e| ServiceError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to build email: {e}"),
        })
}

fn send_blocking(config: &EmailConfig, message: &Message) -> Result<(), ServiceError> {
    let creds = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::starttls_relay(&config.smtp_host)
        .map_err(|e| ServiceError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("SMTP relay error: {e}"),
        })?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    transport
        .send(message)
        .map_err(|e| ServiceError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("SMTP send failed: {e}"),
        })?;
    Ok(())
}

#[async_trait]
impl EmailTransport for SmtpEmailTransport {
    fn from_address(&self) -> &str {
        &self.config.from_address
    }

    async fn deliver(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        let message = build_message(&self.config.from_address, &email)?;
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || send_blocking(&config, &message))
            .await
            .map_err(|e| ServiceError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("SMTP task failed: {e}"),
            })?
    }
}

/// Validates destinations and sends email through a transport.
#[derive(Clone)]
pub struct EmailNotifier {
    transport: Arc<dyn EmailTransport>,
}

impl EmailNotifier {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }

    /// Send an HTML email. Malformed destinations are rejected before any network call.
    pub async fn send(&self, to: &str, subject: &str, html_body: &str) -> ExternalResult<()> {
        let to = to.trim();
        if let Err(e) = to.parse::<Address>() {
            tracing::warn!(to, "Rejected email destination: {}", e);
            return ExternalResult::InvalidInput(format!("Invalid email address {to}: {e}"));
        }

        let email = OutgoingEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        };
        match self.transport.deliver(email).await {
            Ok(()) => {
                tracing::info!(to, from = self.transport.from_address(), "Email sent");
                ExternalResult::Success(())
            }
            Err(e) => {
                tracing::error!(to, "Error sending email: {}", e);
                e.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::DEFAULT_FROM_ADDRESS;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl EmailTransport for RecordingTransport {
        fn from_address(&self) -> &str {
            DEFAULT_FROM_ADDRESS
        }

        async fn deliver(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    #[tokio::test]
    async fn valid_address_is_delivered() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = EmailNotifier::new(transport.clone());

        let result = notifier
            .send("jane@example.com", "Your plan", "<p>Spa day</p>")
            .await;
        assert!(result.is_success());

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert_eq!(sent[0].subject, "Your plan");
        assert_eq!(sent[0].html_body, "<p>Spa day</p>");
    }

    #[tokio::test]
    async fn malformed_address_is_rejected_without_sending() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = EmailNotifier::new(transport.clone());

        let result = notifier.send("not-an-email", "s", "b").await;
        assert_eq!(result.kind(), "invalid_input");
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn message_is_html_from_fixed_sender() {
        let email = OutgoingEmail {
            to: "jane@example.com".into(),
            subject: "Tonight".into(),
            html_body: "<b>Dinner</b>".into(),
        };
        let message = build_message(DEFAULT_FROM_ADDRESS, &email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: info@mydatejar.com"));
        assert!(raw.contains("To: jane@example.com"));
        assert!(raw.contains("Subject: Tonight"));
        assert!(raw.contains("Content-Type: text/html"));
    }
}
