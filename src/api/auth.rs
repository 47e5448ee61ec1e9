//! Credential sign-in and session handling.
//!
//! Sign-in takes an email and display name and finds or registers that user,
//! then issues a random bearer token. Tokens are stored SHA-256 hashed with
//! an expiry; protected routes resolve the caller through the `User`
//! extractor or the [`auth_middleware`] layer.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::db::{LoginRequest, LoginResponse, Session, User};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name};

/// Generate a random token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Sign in endpoint: find-or-create the user by email, then issue a session
/// token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_email(&request.email) {
        errors.add("email", e);
    }
    if let Err(e) = validate_name(&request.name) {
        errors.add("name", e);
    }
    errors.finish()?;

    let user = match state.store.get_user_by_email(&request.email).await? {
        Some(user) => user,
        None => {
            let user = state
                .store
                .create_user(&request.name, &request.email)
                .await?;
            tracing::info!("Registered new user {} at sign-in", user.email);
            user
        }
    };

    let token = generate_token();
    let token_hash = hash_token(&token);

    let expires_at = chrono::Utc::now()
        + chrono::Duration::days(state.config.auth.session_ttl_days);
    let session_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(&user.id)
    .bind(&token_hash)
    .bind(expires_at.to_rfc3339())
    .bind(&now)
    .execute(&state.db)
    .await?;

    Ok(Json(LoginResponse { token, user }))
}

/// Validate token endpoint
pub async fn validate(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> StatusCode {
    let token = match extract_token(request.headers()) {
        Some(token) => token,
        None => return StatusCode::UNAUTHORIZED,
    };

    match lookup_session(&state, &token).await {
        Ok(Some(_)) => StatusCode::OK,
        Ok(None) => StatusCode::UNAUTHORIZED,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Auth middleware that validates bearer tokens on protected routes
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let session = lookup_session(&state, &token)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    match session {
        Some(_) => Ok(next.run(request).await),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

fn extract_token(headers: &axum::http::HeaderMap) -> Option<String> {
    let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok())?;
    auth_header
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}

async fn lookup_session(state: &AppState, token: &str) -> Result<Option<Session>, sqlx::Error> {
    let token_hash = hash_token(token);
    sqlx::query_as(
        "SELECT * FROM sessions WHERE token_hash = ? AND expires_at > ?",
    )
    .bind(&token_hash)
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_optional(&state.db)
    .await
}

/// Get the current user from a token
pub async fn get_current_user(state: &AppState, token: &str) -> Result<User, StatusCode> {
    let session = lookup_session(state, token)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    user.ok_or(StatusCode::UNAUTHORIZED)
}

/// Extractor for getting the current authenticated user from a request
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        get_current_user(state, &token).await.map_err(|status| {
            if status == StatusCode::UNAUTHORIZED {
                ApiError::unauthorized("Invalid or expired session")
            } else {
                ApiError::internal("Failed to resolve session")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db;

    async fn test_state() -> Arc<AppState> {
        let pool = db::init_in_memory().await.unwrap();
        Arc::new(AppState::new(Config::default(), pool))
    }

    #[tokio::test]
    async fn test_login_registers_and_issues_session() {
        let state = test_state().await;

        let response = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
            }),
        )
        .await
        .unwrap();
        let LoginResponse { token, user } = response.0;
        assert_eq!(user.email, "ada@example.com");

        // The issued token resolves back to the same user.
        let resolved = get_current_user(&state, &token).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_finds_existing_user_by_email() {
        let state = test_state().await;
        let first = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".to_string(),
                name: "Ada".to_string(),
            }),
        )
        .await
        .unwrap();

        // Signing in again with the same email reuses the account; the
        // submitted name does not overwrite the stored one.
        let second = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "ada@example.com".to_string(),
                name: "Somebody Else".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(second.0.user.id, first.0.user.id);
        assert_eq!(second.0.user.name, "Ada");
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let state = test_state().await;
        let err = get_current_user(&state, "not-a-real-token")
            .await
            .unwrap_err();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let state = test_state().await;
        let user = state
            .store
            .create_user("Ada", "ada@example.com")
            .await
            .unwrap();

        let token = generate_token();
        let expired = chrono::Utc::now() - chrono::Duration::hours(1);
        sqlx::query(
            "INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(&user.id)
        .bind(hash_token(&token))
        .bind(expired.to_rfc3339())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&state.db)
        .await
        .unwrap();

        let session = lookup_session(&state, &token).await.unwrap();
        assert!(session.is_none());

        let err = get_current_user(&state, &token).await.unwrap_err();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_extract_token_requires_bearer_scheme() {
        let mut headers = axum::http::HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        headers.insert("Authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(extract_token(&headers).as_deref(), Some("abc123"));

        headers.insert("Authorization", "Basic abc123".parse().unwrap());
        assert!(extract_token(&headers).is_none());
    }

    #[test]
    fn test_generate_token_is_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = "abc123";
        assert_eq!(hash_token(token), hash_token(token));
        assert_ne!(hash_token(token), hash_token("abc124"));
        // SHA-256 hex digest length
        assert_eq!(hash_token(token).len(), 64);
    }
}
