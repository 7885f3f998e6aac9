use super::{TokenRecord, TokenStore};
use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-process [`TokenStore`] for single-instance deployments.
///
/// Every operation is one critical section under a single lock, which is
/// what makes `put` and `consume` atomic with respect to each other. The
/// lock is never held across an await point.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: RwLock<HashMap<String, TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn put(&self, record: TokenRecord) -> Result<(), Error> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("token store lock poisoned".to_string()))?;

        // Supersession: one live token per email.
        records.retain(|_, existing| existing.email != record.email);
        records.insert(record.token.clone(), record);
        Ok(())
    }

    async fn consume(&self, token: &str) -> Result<Option<TokenRecord>, Error> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("token store lock poisoned".to_string()))?;

        // remove() is the whole single-use guarantee: only one caller
        // can ever take the record out of the map.
        Ok(records.remove(token).map(|mut record| {
            record.consumed_at = Some(Utc::now());
            record
        }))
    }

    async fn revoke(&self, token: &str) -> Result<(), Error> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("token store lock poisoned".to_string()))?;

        records.remove(token);
        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::Internal("token store lock poisoned".to_string()))?;

        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok(before - records.len())
    }
}
