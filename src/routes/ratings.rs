use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MediaType, Rating},
    state::AppState,
};

use super::auth::Viewer;

/// Global load window, matching the original document query limit
pub const RECENT_RATINGS_LIMIT: i64 = 100;
/// Community feed cap
const COMMUNITY_LIMIT: usize = 12;

#[derive(Debug, Deserialize)]
pub struct CreateRatingRequest {
    pub title: String,
    pub media_type: MediaType,
    pub score: f64,
    #[serde(default)]
    pub comment: String,
    /// Set when a catalog search result was selected
    #[serde(default)]
    pub external_id: Option<i64>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub comment: String,
}

/// Saves a new rating for the viewer
pub async fn create(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Json(request): Json<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required.".to_string()));
    }

    if !Rating::valid_score(request.score) {
        return Err(AppError::InvalidInput(
            "Score must be between 0 and 5 in steps of 0.1.".to_string(),
        ));
    }

    let rating = Rating::new(
        viewer,
        title,
        request.media_type,
        request.score,
        request.comment.trim().to_string(),
        request.external_id,
        request.poster_url,
    );

    let rating = state.store.insert_rating(rating).await?;

    tracing::info!(owner = %rating.owner, title = %rating.title, "Rating saved");

    Ok((StatusCode::CREATED, Json(rating)))
}

/// The viewer's own ratings, newest first
pub async fn list_mine(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<Json<Vec<Rating>>> {
    let ratings = state.store.ratings_for(&viewer).await?;
    Ok(Json(ratings))
}

/// Recent ratings by other users
pub async fn community(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<Json<Vec<Rating>>> {
    let ratings = state.store.recent_ratings(RECENT_RATINGS_LIMIT).await?;
    let others: Vec<Rating> = ratings
        .into_iter()
        .filter(|r| r.owner != viewer)
        .take(COMMUNITY_LIMIT)
        .collect();
    Ok(Json(others))
}

/// Looks up a rating the viewer owns; foreign ratings are invisible
async fn owned_rating(state: &AppState, viewer: &str, id: Uuid) -> AppResult<Rating> {
    let rating = state
        .store
        .find_rating(id)
        .await?
        .filter(|r| r.owner == viewer)
        .ok_or_else(|| AppError::NotFound("Rating not found.".to_string()))?;
    Ok(rating)
}

/// Replaces the comment on one of the viewer's ratings
pub async fn edit_comment(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<Uuid>,
    Json(request): Json<EditCommentRequest>,
) -> AppResult<Json<Rating>> {
    let mut rating = owned_rating(&state, &viewer, id).await?;

    let comment = request.comment.trim().to_string();
    state.store.update_comment(id, &comment).await?;
    rating.comment = comment;

    tracing::info!(owner = %viewer, rating_id = %id, "Rating comment updated");

    Ok(Json(rating))
}

/// Deletes one of the viewer's ratings
pub async fn remove(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    owned_rating(&state, &viewer, id).await?;
    state.store.delete_rating(id).await?;

    tracing::info!(owner = %viewer, rating_id = %id, "Rating deleted");

    Ok(StatusCode::NO_CONTENT)
}
