//! Configuration types.
//!
//! Provider credentials are read once at process start. Values come from the
//! environment in production; tests feed a map through [`HartConfig::from_lookup`].

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default model for the free-chat step.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
/// Default OpenAI-compatible API base.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Sender used for every outbound email.
pub const DEFAULT_FROM_ADDRESS: &str = "info@mydatejar.com";
/// SendGrid's SMTP relay.
pub const DEFAULT_SMTP_HOST: &str = "smtp.sendgrid.net";
/// Per-request timeout applied to every HTTP adapter.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Completion provider settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

/// Twilio settings. SMS is disabled when any of these is missing.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: SecretString,
    pub from_number: String,
}

/// SMTP settings for outbound email.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct HartConfig {
    pub openai: OpenAiConfig,
    pub places_api_key: SecretString,
    pub sms: Option<SmsConfig>,
    pub email: Option<EmailConfig>,
}

impl HartConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let openai = OpenAiConfig {
            api_key: SecretString::from(require("OPENAI_API_KEY")?),
            model: get("HART_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        };

        let places_api_key = SecretString::from(require("GOOGLE_PLACES_API_KEY")?);

        let sms = match (
            get("TWILIO_ACCOUNT_SID"),
            get("TWILIO_AUTH_TOKEN"),
            get("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsConfig {
                account_sid,
                auth_token: SecretString::from(auth_token),
                from_number,
            }),
            _ => None,
        };

        let email = match get("SENDGRID_API_KEY").or_else(|| get("EMAIL_SMTP_PASSWORD")) {
            Some(password) => {
                let smtp_port = match get("EMAIL_SMTP_PORT") {
                    Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                        key: "EMAIL_SMTP_PORT".to_string(),
                        message: e.to_string(),
                    })?,
                    None => 587,
                };
                Some(EmailConfig {
                    smtp_host: get("EMAIL_SMTP_HOST")
                        .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                    smtp_port,
                    username: get("EMAIL_SMTP_USERNAME").unwrap_or_else(|| "apikey".to_string()),
                    password: SecretString::from(password),
                    from_address: get("EMAIL_FROM_ADDRESS")
                        .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
                })
            }
            None => None,
        };

        Ok(Self {
            openai,
            places_api_key,
            sms,
            email,
        })
    }
}

/// Shared HTTP client for every adapter, with [`HTTP_TIMEOUT`] applied.
pub fn http_client() -> crate::error::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
    Ok(client)
}
