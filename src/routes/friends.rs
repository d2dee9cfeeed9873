use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

use super::auth::Viewer;

#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct FriendLinkResponse {
    pub friend: String,
}

/// Creates a single-use invite code for the viewer
pub async fn create_invite(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<(StatusCode, Json<InviteResponse>)> {
    let code = state.store.create_invite(&viewer).await?;

    tracing::info!(owner = %viewer, "Invite code created");

    Ok((StatusCode::CREATED, Json(InviteResponse { code })))
}

/// Consumes an invite code and links the two users as friends
pub async fn accept_invite(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(request): Json<AcceptInviteRequest>,
) -> AppResult<Json<FriendLinkResponse>> {
    let code = request.code.trim();

    let inviter = state
        .store
        .take_invite(code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invite code is invalid or already used.".to_string()))?;

    if inviter == viewer {
        return Err(AppError::InvalidInput(
            "You cannot accept your own invite.".to_string(),
        ));
    }

    state.store.add_friend_edge(&viewer, &inviter).await?;

    tracing::info!(inviter = %inviter, acceptor = %viewer, "Friend link established");

    Ok(Json(FriendLinkResponse { friend: inviter }))
}

/// The viewer's connected friends
pub async fn list(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<Json<Vec<String>>> {
    let friends = state.store.friends_of(&viewer).await?;
    Ok(Json(friends))
}
