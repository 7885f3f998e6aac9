use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Lazy-loaded email validation regex
///
/// This regex validates email addresses according to a practical subset of RFC 5322.
/// It's loaded once at runtime and reused for all email validation operations.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Normalize a submitted address: trim surrounding whitespace and
/// lowercase. All policy checks and store keys use the normalized form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address
///
/// # Arguments
///
/// * `email` - The email address to validate (already normalized)
///
/// # Returns
///
/// Returns `Ok(())` if the email is valid, or a `ValidationError` if invalid.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "address is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

/// Enforce the allowed-domain policy on a normalized address.
///
/// Exactly one domain is allowed; there is deliberately no allow-all
/// fallback.
pub fn validate_domain(email: &str, allowed_domain: &str) -> Result<(), ValidationError> {
    if email.ends_with(&format!("@{allowed_domain}")) {
        Ok(())
    } else {
        Err(ValidationError::DomainNotAllowed {
            domain: allowed_domain.to_string(),
        })
    }
}
