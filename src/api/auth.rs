//! Auth API endpoints
//!
//! Registration, login, logout, and the current-user lookup. Login hands
//! back the session token both as a cookie and in the JSON body so browser
//! and API clients can each pick it up.

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::User;

/// Build the public auth router
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Build the authenticated auth router
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/v1/auth/register - Create an account
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state
        .user_service
        .register(&req.username, &req.email, &req.password)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/auth/login - Open a session
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let (user, session) = state.user_service.login(&req.username, &req.password).await?;

    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax",
        session.id
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::internal_error(format!("Invalid cookie value: {}", e)))?,
    );

    Ok((
        headers,
        Json(LoginResponse {
            token: session.id,
            user,
        }),
    ))
}

/// POST /api/v1/auth/logout - Discard the current session
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthenticatedUser,
) -> Result<(HeaderMap, StatusCode), ApiError> {
    if let Some(token) = session_token(&headers) {
        state.user_service.logout(&token).await?;
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; Max-Age=0"),
    );
    Ok((response_headers, StatusCode::NO_CONTENT))
}

/// GET /api/v1/auth/me - The authenticated user
async fn me(user: AuthenticatedUser) -> Json<User> {
    Json(user.0)
}

/// Pull the session token back out of the request headers for logout.
fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get(header::COOKIE)
        .and_then(|c| c.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(str::trim)
                .find_map(|c| c.strip_prefix("session="))
                .map(|t| t.to_string())
        })
}
