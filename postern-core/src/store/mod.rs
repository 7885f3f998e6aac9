//! Token storage
//!
//! The [`TokenStore`] is the only shared mutable state in the system and
//! the place where the single-use guarantee lives: [`TokenStore::consume`]
//! is an atomic fetch-and-remove, so two concurrent redemptions of the
//! same token can never both succeed. Backends are interchangeable; the
//! in-process [`MemoryTokenStore`] covers single-instance deployments and
//! `postern-storage-sqlite` covers deployments that share a database.

mod memory;

pub use memory::MemoryTokenStore;

use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The sole persisted entity: one issued access token bound to one email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl TokenRecord {
    pub fn new(
        token: String,
        email: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token,
            email,
            issued_at,
            expires_at,
            consumed_at: None,
        }
    }

    pub fn consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl PartialEq for TokenRecord {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
            && self.email == other.email
            && self.consumed_at.map(|t| t.timestamp()) == other.consumed_at.map(|t| t.timestamp())
            // Database backends round-trip timestamps at second precision,
            // so equality compares unix seconds rather than full instants.
            && self.issued_at.timestamp() == other.issued_at.timestamp()
            && self.expires_at.timestamp() == other.expires_at.timestamp()
    }
}

/// Storage contract for issued access tokens.
///
/// Implementations must make every operation atomic with respect to
/// concurrent `put` and `consume` calls: a single lock-guarded critical
/// section in process, or a single conditional statement against a
/// shared database.
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Insert `record`, superseding (deleting) any existing unconsumed
    /// record for the same email in the same atomic step.
    async fn put(&self, record: TokenRecord) -> Result<(), Error>;

    /// Atomically remove and return the record for `token`, stamped with
    /// `consumed_at`.
    ///
    /// Under concurrent calls with the same token exactly one caller
    /// receives `Some`; every other caller receives `None`. Expiry is
    /// not checked here: the record is handed out even when stale so the
    /// validator owns the expiry decision, and at most one caller ever
    /// sees it.
    async fn consume(&self, token: &str) -> Result<Option<TokenRecord>, Error>;

    /// Delete `token` if present, without consuming semantics.
    ///
    /// Used to roll back a token whose access link was never delivered.
    /// Revoking an absent token is not an error.
    async fn revoke(&self, token: &str) -> Result<(), Error>;

    /// Remove records that have expired as of `now`, returning the
    /// number removed. Not required for correctness (the validator
    /// enforces expiry regardless) but bounds storage growth.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, Error>;
}
