use std::sync::Arc;

use chrono::Utc;

use crate::Error;
use crate::config::MagicLinkConfig;
use crate::services::{MailerService, ReissueThrottle};
use crate::store::{TokenRecord, TokenStore};
use crate::token::generate_access_token;
use crate::validation::{normalize_email, validate_domain, validate_email};

/// Service that turns an email address into a delivered access link.
///
/// The flow is store-then-send: the token is persisted before the email
/// goes out, and rolled back if delivery fails, so a token that was
/// never delivered can never be redeemed later.
pub struct IssuerService<S: TokenStore, M: MailerService> {
    store: Arc<S>,
    mailer: Arc<M>,
    throttle: Arc<ReissueThrottle>,
    config: MagicLinkConfig,
}

impl<S: TokenStore, M: MailerService> IssuerService<S, M> {
    pub fn new(
        store: Arc<S>,
        mailer: Arc<M>,
        throttle: Arc<ReissueThrottle>,
        config: MagicLinkConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            throttle,
            config,
        }
    }

    /// Issue a fresh access token for `email` and send it out.
    ///
    /// Issuing supersedes any token previously stored for the address,
    /// so only the most recently sent link works. Returns the stored
    /// record; callers serving HTTP should not echo its token back in
    /// the response body.
    pub async fn issue(&self, email: &str) -> Result<TokenRecord, Error> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_domain(&email, &self.config.allowed_domain)?;

        let now = Utc::now();
        self.throttle.check_and_stamp(&email, now)?;

        let token = generate_access_token();
        let record = TokenRecord::new(
            token.clone(),
            email.clone(),
            now,
            now + self.config.token_ttl,
        );
        self.store.put(record.clone()).await?;

        let access_link = self.config.access_link(&token);
        if let Err(e) = self
            .mailer
            .send_access_link(&email, &access_link, self.config.token_ttl)
            .await
        {
            // Delivery failed, so the stored token must not stay
            // redeemable. Unwind the store and reopen the throttle
            // window so the user can retry immediately.
            if let Err(revoke_err) = self.store.revoke(&token).await {
                tracing::error!(
                    error = %revoke_err,
                    email = %email,
                    "Failed to revoke token after delivery failure"
                );
            }
            self.throttle.reset(&email);
            tracing::warn!(error = %e, email = %email, "Access link delivery failed");
            return Err(e);
        }

        tracing::info!(email = %email, expires_at = %record.expires_at, "Access link issued");
        Ok(record)
    }
}
