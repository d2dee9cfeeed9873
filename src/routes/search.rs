use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, models::CatalogItem, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Free-text catalog search for the rating form
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = state.catalog.search(&params.q).await?;
    Ok(Json(items))
}
