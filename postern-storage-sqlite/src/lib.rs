//! SQLite-backed [`TokenStore`] for deployments that share a database
//! across instances.
//!
//! Atomicity comes from the database rather than an in-process lock:
//! supersession runs in a transaction and consumption is a single
//! `DELETE ... RETURNING`, so concurrent redemptions of one token still
//! have exactly one winner.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use postern_core::{Error, TokenRecord, TokenStore};
use sqlx::SqlitePool;

pub struct SqliteTokenStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct TokenRow {
    token: String,
    email: String,
    issued_at: i64,
    expires_at: i64,
}

impl From<TokenRow> for TokenRecord {
    fn from(row: TokenRow) -> Self {
        TokenRecord::new(
            row.token,
            row.email,
            DateTime::from_timestamp(row.issued_at, 0).unwrap(),
            DateTime::from_timestamp(row.expires_at, 0).unwrap(),
        )
    }
}

impl SqliteTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, Error> {
        let pool = SqlitePool::connect(url)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Create the token table and its indexes if they do not exist.
    pub async fn migrate(&self) -> Result<(), Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS magic_tokens (
                token TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                issued_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_magic_tokens_email ON magic_tokens (email)")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_magic_tokens_expires_at ON magic_tokens (expires_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        tracing::debug!("magic_tokens table ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn put(&self, record: TokenRecord) -> Result<(), Error> {
        // Supersession and insert commit together so no interleaving
        // leaves an address with two live tokens or none.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        sqlx::query("DELETE FROM magic_tokens WHERE email = ?")
            .bind(&record.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        sqlx::query(
            "INSERT INTO magic_tokens (token, email, issued_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.token)
        .bind(&record.email)
        .bind(record.issued_at.timestamp())
        .bind(record.expires_at.timestamp())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(())
    }

    async fn consume(&self, token: &str) -> Result<Option<TokenRecord>, Error> {
        let row: Option<TokenRow> = sqlx::query_as(
            r#"
            DELETE FROM magic_tokens
            WHERE token = ?
            RETURNING token, email, issued_at, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(row.map(|row| {
            let mut record = TokenRecord::from(row);
            record.consumed_at = Some(Utc::now());
            record
        }))
    }

    async fn revoke(&self, token: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM magic_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(())
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, Error> {
        let result = sqlx::query("DELETE FROM magic_tokens WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(result.rows_affected() as usize)
    }
}
