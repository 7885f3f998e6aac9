//! Access token generation and format checks
//!
//! Tokens are opaque bearer values of the form `mlk_{random}`, where the
//! random part is base64 URL-safe encoded without padding. They carry 256
//! bits of entropy from the operating system CSPRNG and are safe to embed
//! directly in a link query string.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

/// Prefix carried by every issued access token.
pub const TOKEN_PREFIX: &str = "mlk";

/// Random bytes behind each issued token (256 bits).
const TOKEN_BYTES: usize = 32;

/// Minimum entropy the format check accepts (128 bits).
const MIN_TOKEN_BYTES: usize = 16;

/// Generate a fresh access token.
///
/// # Example
/// ```
/// use postern_core::token::generate_access_token;
///
/// let token = generate_access_token();
/// assert!(token.starts_with("mlk_"));
/// ```
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes).unwrap();

    // Encode to base64 URL-safe without padding
    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    format!("{TOKEN_PREFIX}_{encoded}")
}

/// Check that a presented value has the shape of an issued token.
///
/// This is a cheap pre-filter, not an authenticity check: it rejects
/// values that could never have been issued (wrong prefix, not base64
/// URL-safe, under 128 bits) before any store lookup.
pub fn validate_token_format(token: &str) -> bool {
    let Some(random_part) = token.strip_prefix(&format!("{TOKEN_PREFIX}_")) else {
        return false;
    };

    match BASE64_URL_SAFE_NO_PAD.decode(random_part) {
        Ok(decoded) => decoded.len() >= MIN_TOKEN_BYTES,
        Err(_) => false,
    }
}
