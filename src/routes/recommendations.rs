use std::collections::HashSet;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{MediaType, Rating, RecommendationCandidate},
    services::{rank_for_viewer, RecommendationOutcome},
    state::AppState,
};

use super::auth::Viewer;
use super::ratings::RECENT_RATINGS_LIMIT;

#[derive(Debug, Serialize)]
pub struct CandidateView {
    pub external_id: u64,
    pub title: String,
    pub media_type: MediaType,
    pub aggregate_score: f64,
    /// Aggregate score formatted to two decimal places
    pub score: String,
    /// Comma-joined contributing seed titles
    pub why: String,
    pub poster_url: Option<String>,
}

impl From<RecommendationCandidate> for CandidateView {
    fn from(candidate: RecommendationCandidate) -> Self {
        Self {
            score: candidate.score_display(),
            why: candidate.why(),
            external_id: candidate.external_id,
            title: candidate.title,
            media_type: candidate.media_type,
            aggregate_score: candidate.aggregate_score,
            poster_url: candidate.poster_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub status: crate::models::RecommendationStatus,
    pub message: &'static str,
    pub candidates: Vec<CandidateView>,
}

impl From<RecommendationOutcome> for RecommendationResponse {
    fn from(outcome: RecommendationOutcome) -> Self {
        Self {
            status: outcome.status,
            message: outcome.status.message(),
            candidates: outcome
                .candidates
                .into_iter()
                .map(CandidateView::from)
                .collect(),
        }
    }
}

/// Computes recommendations for the authenticated viewer
///
/// A refresh that finishes after a newer one started is discarded; the caller
/// always receives the most recently committed result.
pub async fn recommend(
    State(state): State<AppState>,
    Viewer(viewer): Viewer,
) -> AppResult<Json<RecommendationResponse>> {
    let generation = state.recommendations.begin();

    let friends = state.store.friends_of(&viewer).await?;
    let circle: HashSet<&str> = std::iter::once(viewer.as_str())
        .chain(friends.iter().map(String::as_str))
        .collect();

    // Recency order across the viewer and their friends comes from the
    // global newest-first window, as the rating pages load it
    let ratings: Vec<Rating> = state
        .store
        .recent_ratings(RECENT_RATINGS_LIMIT)
        .await?
        .into_iter()
        .filter(|r| circle.contains(r.owner.as_str()))
        .collect();

    let outcome = rank_for_viewer(state.catalog.as_ref(), &ratings).await;

    let committed = state
        .recommendations
        .commit(&viewer, generation, outcome.clone())
        .await;

    let outcome = if committed {
        outcome
    } else {
        tracing::debug!(viewer = %viewer, generation, "Superseded recommendation run discarded");
        state
            .recommendations
            .latest(&viewer)
            .await
            .unwrap_or(outcome)
    };

    Ok(Json(RecommendationResponse::from(outcome)))
}
