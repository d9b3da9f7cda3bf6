//! SMS notifications: E.164 validation in front of Twilio's Messages API.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};

use crate::config::SmsConfig;
use crate::error::ServiceError;
use crate::services::ExternalResult;

const PROVIDER: &str = "twilio";

/// Shown when a destination number fails validation.
pub const INVALID_PHONE_MESSAGE: &str =
    "Phone number must be in E.164 format, e.g., +12345678901";

static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{1,3}\d{9,15}$").expect("E.164 pattern compiles"));

/// Whether `number` looks like an E.164 number (`+`, country code, 9 to 15 digits).
pub fn is_valid_e164(number: &str) -> bool {
    E164.is_match(number)
}

/// Delivers an already-validated SMS.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn deliver(&self, to: &str, body: &str) -> Result<(), ServiceError>;
}

/// Twilio REST transport.
pub struct TwilioSmsTransport {
    client: reqwest::Client,
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
}

impl TwilioSmsTransport {
    pub fn new(client: reqwest::Client, config: &SmsConfig) -> Self {
        Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.account_sid
        )
    }
}

#[async_trait]
impl SmsTransport for TwilioSmsTransport {
    async fn deliver(&self, to: &str, body: &str) -> Result<(), ServiceError> {
        let form = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&form)
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::HttpStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Validates destinations and sends SMS through a transport.
#[derive(Clone)]
pub struct SmsNotifier {
    transport: Arc<dyn SmsTransport>,
}

impl SmsNotifier {
    pub fn new(transport: Arc<dyn SmsTransport>) -> Self {
        Self { transport }
    }

    /// Send `body` to `to`. Invalid numbers are rejected before any network call.
    pub async fn send(&self, to: &str, body: &str) -> ExternalResult<()> {
        let to = to.trim();
        if !is_valid_e164(to) {
            tracing::warn!(to, "Rejected SMS destination");
            return ExternalResult::InvalidInput(INVALID_PHONE_MESSAGE.to_string());
        }
        match self.transport.deliver(to, body).await {
            Ok(()) => {
                tracing::info!(to, "SMS sent");
                ExternalResult::Success(())
            }
            Err(e) => {
                tracing::error!(to, "Error sending SMS: {}", e);
                e.into()
            }
        }
    }
}
