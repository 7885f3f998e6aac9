use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use postern_core::services::MailerService;
use postern_core::{Postern, TokenStore};
use serde_json::json;

use crate::{
    error::Result,
    types::{
        HealthResponse, MagicLinkRequest, MagicLinkResponse, VerifyMagicTokenRequest,
        VerifyMagicTokenResponse,
    },
};

/// Shared state for all magic link routes.
pub struct AuthState<S: TokenStore, M: MailerService> {
    pub postern: Arc<Postern<S, M>>,
}

impl<S: TokenStore, M: MailerService> Clone for AuthState<S, M> {
    fn clone(&self) -> Self {
        Self {
            postern: self.postern.clone(),
        }
    }
}

/// Build the router serving the magic link endpoints.
///
/// Routes:
/// - `POST /magic-link` requests an access link for an email address
/// - `POST /magic-link/verify` redeems the token from a link
/// - `GET /health` liveness probe
///
/// Wrong verbs on known paths answer 405 with the same JSON error shape
/// as every other failure.
pub fn create_router<S, M>(postern: Arc<Postern<S, M>>) -> Router
where
    S: TokenStore,
    M: MailerService + 'static,
{
    let state = AuthState { postern };

    Router::new()
        .route("/health", get(health_handler))
        .route("/magic-link", post(request_magic_link_handler))
        .route("/magic-link/verify", post(verify_magic_link_handler))
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn request_magic_link_handler<S, M>(
    State(state): State<AuthState<S, M>>,
    Json(payload): Json<MagicLinkRequest>,
) -> Result<impl IntoResponse>
where
    S: TokenStore,
    M: MailerService,
{
    let record = state.postern.issue(&payload.email).await?;

    // The token itself travels only in the email; the response confirms
    // delivery without exposing it.
    Ok(Json(MagicLinkResponse {
        success: true,
        message: format!("Magic link sent to {}", record.email),
    }))
}

async fn verify_magic_link_handler<S, M>(
    State(state): State<AuthState<S, M>>,
    Json(payload): Json<VerifyMagicTokenRequest>,
) -> Result<impl IntoResponse>
where
    S: TokenStore,
    M: MailerService,
{
    let email = state.postern.validate(&payload.token).await?;

    Ok(Json(VerifyMagicTokenResponse {
        success: true,
        email,
    }))
}

async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header};
    use chrono::Duration;
    use postern_core::{Error, MagicLinkConfig, MemoryTokenStore};
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct RecordingMailer {
        links: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl MailerService for RecordingMailer {
        async fn send_access_link(
            &self,
            _to: &str,
            access_link: &str,
            _expires_in: Duration,
        ) -> std::result::Result<(), Error> {
            if self.fail {
                return Err(Error::DeliveryFailed("provider unavailable".to_string()));
            }
            self.links.lock().unwrap().push(access_link.to_string());
            Ok(())
        }
    }

    fn test_app(fail_delivery: bool) -> (Router, Arc<Mutex<Vec<String>>>) {
        let links = Arc::new(Mutex::new(Vec::new()));
        let mailer = RecordingMailer {
            links: links.clone(),
            fail: fail_delivery,
        };
        let postern = Arc::new(Postern::new(
            Arc::new(MemoryTokenStore::new()),
            Arc::new(mailer),
            MagicLinkConfig::new("example.com", "https://app.example.com"),
        ));
        (create_router(postern), links)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_request_magic_link_success() {
        let (app, links) = test_app(false);

        let response = app
            .oneshot(post_json(
                "/magic-link",
                json!({ "email": "alice@example.com" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Magic link sent to alice@example.com"));

        let links = links.lock().unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].starts_with("https://app.example.com?token=mlk_"));
    }

    #[tokio::test]
    async fn test_request_magic_link_rejects_foreign_domain() {
        let (app, links) = test_app(false);

        let response = app
            .oneshot(post_json(
                "/magic-link",
                json!({ "email": "mallory@gmail.com" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("Only @example.com addresses are allowed"));
        assert!(links.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_verify_round_trip() {
        let (app, links) = test_app(false);

        let response = app
            .clone()
            .oneshot(post_json(
                "/magic-link",
                json!({ "email": "alice@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let link = links.lock().unwrap()[0].clone();
        let token = link.split_once("?token=").unwrap().1.to_string();

        let response = app
            .clone()
            .oneshot(post_json("/magic-link/verify", json!({ "token": token })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["email"], json!("alice@example.com"));

        // Second redemption of the same token is refused.
        let response = app
            .oneshot(post_json("/magic-link/verify", json!({ "token": token })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_empty_token_is_bad_request() {
        let (app, _links) = test_app(false);

        let response = app
            .oneshot(post_json("/magic-link/verify", json!({ "token": "" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("Token is required"));
    }

    #[tokio::test]
    async fn test_verify_unknown_token_is_unauthorized() {
        let (app, _links) = test_app(false);

        let response = app
            .oneshot(post_json(
                "/magic-link/verify",
                json!({ "token": "mlk_AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_reissue_is_rate_limited_with_retry_after() {
        let (app, _links) = test_app(false);

        let response = app
            .clone()
            .oneshot(post_json(
                "/magic-link",
                json!({ "email": "alice@example.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(post_json(
                "/magic-link",
                json!({ "email": "alice@example.com" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_delivery_failure_is_bad_gateway() {
        let (app, _links) = test_app(true);

        let response = app
            .oneshot(post_json(
                "/magic-link",
                json!({ "email": "alice@example.com" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("Failed to send magic link"));
    }

    #[tokio::test]
    async fn test_wrong_verb_is_method_not_allowed() {
        let (app, _links) = test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/magic-link")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("Method not allowed"));
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _links) = test_app(false);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], json!("healthy"));
    }
}
