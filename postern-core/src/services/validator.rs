use std::sync::Arc;

use chrono::Utc;

use crate::Error;
use crate::error::ValidationError;
use crate::store::TokenStore;
use crate::token::validate_token_format;

/// Service that redeems access tokens.
///
/// Every failure past the empty-token check collapses into
/// [`Error::InvalidOrExpired`]: a caller probing with guessed tokens
/// learns nothing about whether a token is malformed, unknown, expired,
/// or already used.
pub struct ValidatorService<S: TokenStore> {
    store: Arc<S>,
}

impl<S: TokenStore> ValidatorService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Redeem `token`, returning the email it was issued for.
    ///
    /// Consumption is single-use: when several callers race on the same
    /// token, exactly one of them gets the email and the rest get
    /// [`Error::InvalidOrExpired`].
    pub async fn validate(&self, token: &str) -> Result<String, Error> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ValidationError::MissingToken.into());
        }

        // Reject tokens that cannot have come from the issuer without
        // touching the store.
        if !validate_token_format(token) {
            return Err(Error::InvalidOrExpired);
        }

        let record = self
            .store
            .consume(token)
            .await?
            .ok_or(Error::InvalidOrExpired)?;

        // The store hands back expired records; expiry is enforced
        // here. The record is already consumed at this point, which is
        // fine: an expired token is dead either way.
        if record.is_expired(Utc::now()) {
            tracing::debug!(email = %record.email, "Rejected expired access token");
            return Err(Error::InvalidOrExpired);
        }

        tracing::info!(email = %record.email, "Access token redeemed");
        Ok(record.email)
    }
}
