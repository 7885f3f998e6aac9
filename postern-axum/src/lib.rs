//! Axum routes for the postern magic link service.
//!
//! Mount [`create_router`] under any path prefix to expose the issue and
//! verify endpoints over HTTP. The router owns nothing but an
//! [`AuthState`] holding the shared [`postern_core::Postern`] instance,
//! so it composes with the rest of an application's routes.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use postern_core::services::AccessLinkMailerService;
//! use postern_core::{MagicLinkConfig, MemoryTokenStore, Postern};
//!
//! #[tokio::main]
//! async fn main() {
//!     let postern = Arc::new(Postern::new(
//!         Arc::new(MemoryTokenStore::new()),
//!         Arc::new(AccessLinkMailerService::from_env().unwrap()),
//!         MagicLinkConfig::from_env().unwrap(),
//!     ));
//!
//!     let app = axum::Router::new().nest("/auth", postern_axum::create_router(postern));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

mod error;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use routes::{AuthState, create_router};
pub use types::{
    HealthResponse, MagicLinkRequest, MagicLinkResponse, VerifyMagicTokenRequest,
    VerifyMagicTokenResponse,
};
