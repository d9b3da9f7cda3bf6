//! External service adapters.
//!
//! Every adapter returns an [`ExternalResult`] so callers can match on the
//! outcome instead of handling provider errors themselves.

pub mod email;
pub mod places;
pub mod recommend;
pub mod sms;

pub use email::{EmailNotifier, EmailTransport, SmtpEmailTransport};
pub use places::{GoogleMapsClient, LatLng, Place, PlacesClient};
pub use recommend::{Experience, Recommender, Restaurant};
pub use sms::{SmsNotifier, SmsTransport, TwilioSmsTransport};

use crate::error::ServiceError;

/// Outcome of a call through an external service adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalResult<T> {
    /// The provider answered with a usable payload.
    Success(T),
    /// The provider answered, but nothing matched.
    NotFound,
    /// The caller's input was rejected before or by the provider.
    InvalidInput(String),
    /// The provider could not be reached or refused the request.
    ProviderError(String),
}

impl<T> ExternalResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::NotFound => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::ProviderError(_) => "provider_error",
        }
    }
}

impl<T> From<ServiceError> for ExternalResult<T> {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidAddress { .. } => Self::InvalidInput(err.to_string()),
            other => Self::ProviderError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_classify_by_cause() {
        let invalid: ExternalResult<()> = ServiceError::InvalidAddress {
            address: "nope".into(),
            reason: "missing @".into(),
        }
        .into();
        assert_eq!(invalid.kind(), "invalid_input");

        let failed: ExternalResult<()> = ServiceError::ProviderStatus {
            provider: "google_maps".into(),
            status: "REQUEST_DENIED".into(),
        }
        .into();
        assert_eq!(failed.kind(), "provider_error");
        assert!(!failed.is_success());
    }
}
