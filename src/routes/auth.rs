use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::Account,
    state::AppState,
};

/// The authenticated viewer, resolved from the bearer session token
pub struct Viewer(pub String);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let username = state
            .store
            .resolve_session(token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(Viewer(username))
    }
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub username: String,
    pub token: String,
}

/// Registers a new account and signs it in
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let username = request.username.trim().to_string();
    let password = request.password.trim();

    if username.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password are required.".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    state
        .store
        .create_account(Account::new(username.clone(), password_hash))
        .await?;

    let token = state.store.create_session(&username).await?;

    tracing::info!(username = %username, "Account created");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse { username, token }),
    ))
}

/// Verifies credentials and issues a fresh session token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> AppResult<Json<SessionResponse>> {
    let username = request.username.trim();
    let password = request.password.trim();

    // Unknown user and wrong password are indistinguishable to the caller
    let invalid = || AppError::InvalidInput("Invalid username or password.".to_string());

    let account = state
        .store
        .find_account(username)
        .await?
        .ok_or_else(invalid)?;

    let verified = bcrypt::verify(password, &account.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

    if !verified {
        return Err(invalid());
    }

    let token = state.store.create_session(&account.username).await?;

    tracing::info!(username = %account.username, "Logged in");

    Ok(Json(SessionResponse {
        username: account.username,
        token,
    }))
}

/// Revokes the presented session token
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<StatusCode> {
    if let Some(token) = bearer_token(&headers) {
        state.store.revoke_session(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}
