use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{MediaType, Rating},
    state::AppState,
};

use super::auth::Viewer;

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    /// Library owner; defaults to the viewer
    pub user: Option<String>,
    /// "Movie" or "TV Show"; anything else means no type filter
    pub media_type: Option<String>,
    #[serde(default)]
    pub min_score: f64,
    /// "recent" (default), "highest" or "title"
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LibraryResponse {
    pub owner: String,
    pub count: usize,
    pub items: Vec<Rating>,
}

/// Browses a rating library with filters
///
/// A viewer may browse their own library or a connected friend's; any other
/// user's library is off limits.
pub async fn browse(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
    Query(query): Query<LibraryQuery>,
) -> AppResult<Json<LibraryResponse>> {
    let owner = query.user.clone().unwrap_or_else(|| viewer.clone());

    if owner != viewer {
        let friends = state.store.friends_of(&viewer).await?;
        if !friends.iter().any(|f| f == &owner) {
            return Err(AppError::Forbidden(
                "You can only view your own library or a connected friend library.".to_string(),
            ));
        }
    }

    let mut items = state.store.ratings_for(&owner).await?;

    if let Some(filter) = query.media_type.as_deref().and_then(MediaType::parse) {
        items.retain(|r| r.media_type == filter);
    }
    items.retain(|r| r.score >= query.min_score);

    match query.sort.as_deref() {
        Some("highest") => {
            items.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
        Some("title") => items.sort_by(|a, b| a.title.cmp(&b.title)),
        // Store order is already newest first
        _ => {}
    }

    Ok(Json(LibraryResponse {
        owner,
        count: items.len(),
        items,
    }))
}
