use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("Too many requests: retry in {} seconds", .retry_after.num_seconds())]
    RateLimited { retry_after: Duration },

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Invalid or expired token")]
    InvalidOrExpired,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Only @{domain} addresses are allowed")]
    DomainNotAllowed { domain: String },

    #[error("Token is required")]
    MissingToken,
}

impl Error {
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, Error::DeliveryFailed(_))
    }

    pub fn is_invalid_or_expired(&self) -> bool {
        matches!(self, Error::InvalidOrExpired)
    }

    /// How long the caller should wait before retrying, for rate-limited
    /// requests.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_error =
            Error::InvalidRequest(ValidationError::InvalidEmail("test@".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Invalid request: Invalid email format: test@"
        );

        let domain_error = Error::InvalidRequest(ValidationError::DomainNotAllowed {
            domain: "example.com".to_string(),
        });
        assert_eq!(
            domain_error.to_string(),
            "Invalid request: Only @example.com addresses are allowed"
        );

        let rejected = Error::InvalidOrExpired;
        assert_eq!(rejected.to_string(), "Invalid or expired token");
    }

    #[test]
    fn test_rate_limited_display() {
        let err = Error::RateLimited {
            retry_after: Duration::seconds(42),
        };
        assert_eq!(err.to_string(), "Too many requests: retry in 42 seconds");
        assert_eq!(err.retry_after(), Some(Duration::seconds(42)));
    }

    #[test]
    fn test_is_invalid_request() {
        assert!(Error::InvalidRequest(ValidationError::MissingEmail).is_invalid_request());
        assert!(Error::InvalidRequest(ValidationError::MissingToken).is_invalid_request());
        assert!(!Error::InvalidOrExpired.is_invalid_request());
    }

    #[test]
    fn test_is_invalid_or_expired() {
        assert!(Error::InvalidOrExpired.is_invalid_or_expired());
        assert!(!Error::Internal("boom".to_string()).is_invalid_or_expired());
    }

    #[test]
    fn test_error_from_conversions() {
        let validation_error = ValidationError::MissingEmail;
        let error: Error = validation_error.into();
        assert!(matches!(
            error,
            Error::InvalidRequest(ValidationError::MissingEmail)
        ));
    }

    #[test]
    fn test_retry_after_absent_for_other_errors() {
        assert_eq!(Error::InvalidOrExpired.retry_after(), None);
        assert_eq!(
            Error::DeliveryFailed("upstream".to_string()).retry_after(),
            None
        );
    }
}
