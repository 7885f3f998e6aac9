//! Core functionality for passwordless access links.
//!
//! This crate implements the whole token lifecycle behind a "send me a
//! sign-in link" flow: issuing single-use access tokens for addresses on
//! an allowed email domain, delivering them as links over a pluggable
//! mailer, and redeeming them exactly once.
//!
//! Storage is abstracted behind the [`TokenStore`] trait so the same
//! services run against the bundled in-memory store or a database
//! backend. [`Postern`] wires the services together for applications
//! that do not need the pieces individually.
//!
//! ## Example
//!
//! ```rust,no_run
//! use postern_core::services::AccessLinkMailerService;
//! use postern_core::{MagicLinkConfig, MemoryTokenStore, Postern};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryTokenStore::new());
//!     let mailer = Arc::new(AccessLinkMailerService::from_env().unwrap());
//!     let config = MagicLinkConfig::new("example.com", "https://app.example.com");
//!
//!     let postern = Postern::new(store, mailer, config);
//!
//!     // Issue sends the link; validate redeems the token it carried.
//!     postern.issue("alice@example.com").await.unwrap();
//! }
//! ```
use std::sync::Arc;

use chrono::Utc;

pub mod config;
pub mod error;
pub mod services;
pub mod store;
pub mod token;
pub mod validation;

pub use config::MagicLinkConfig;
pub use error::{Error, ValidationError};
pub use store::{MemoryTokenStore, TokenRecord, TokenStore};

use services::{IssuerService, MailerService, ReissueThrottle, ValidatorService};

/// The assembled magic link authenticator.
///
/// Owns an issuer and a validator sharing one token store, plus the
/// per-address reissue throttle. Generic over the store and mailer so
/// deployments choose persistence and delivery independently.
pub struct Postern<S: TokenStore, M: MailerService> {
    store: Arc<S>,
    throttle: Arc<ReissueThrottle>,
    issuer: IssuerService<S, M>,
    validator: ValidatorService<S>,
    config: MagicLinkConfig,
}

impl<S: TokenStore, M: MailerService> Postern<S, M> {
    pub fn new(store: Arc<S>, mailer: Arc<M>, config: MagicLinkConfig) -> Self {
        let throttle = Arc::new(ReissueThrottle::new(config.reissue_interval));
        let issuer = IssuerService::new(store.clone(), mailer, throttle.clone(), config.clone());
        let validator = ValidatorService::new(store.clone());

        Self {
            store,
            throttle,
            issuer,
            validator,
            config,
        }
    }

    pub fn config(&self) -> &MagicLinkConfig {
        &self.config
    }

    /// Issue an access token for `email` and send the link.
    ///
    /// See [`IssuerService::issue`] for the full contract.
    pub async fn issue(&self, email: &str) -> Result<TokenRecord, Error> {
        self.issuer.issue(email).await
    }

    /// Redeem `token`, returning the email it was issued for.
    ///
    /// See [`ValidatorService::validate`] for the full contract.
    pub async fn validate(&self, token: &str) -> Result<String, Error> {
        self.validator.validate(token).await
    }

    /// Remove expired tokens and stale throttle stamps.
    ///
    /// Returns the number of tokens swept. Sweeping is hygiene, not
    /// correctness: validation rejects expired tokens whether or not a
    /// sweep ran.
    pub async fn sweep_expired(&self) -> Result<usize, Error> {
        let now = Utc::now();
        let swept = self.store.sweep_expired(now).await?;
        self.throttle.prune(now);
        Ok(swept)
    }

    /// Spawn a background task that sweeps on `interval` until
    /// `shutdown` flips.
    pub fn start_sweep_task(
        &self,
        interval: std::time::Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let throttle = Arc::clone(&self.throttle);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let now = Utc::now();
                        match store.sweep_expired(now).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(count = count, "Swept expired access tokens");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to sweep expired access tokens");
                            }
                            _ => {}
                        }
                        throttle.prune(now);
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down access token sweep task");
                        break;
                    }
                }
            }
        })
    }
}
