use serde::{Deserialize, Serialize};

use super::MediaType;

/// An external catalog entry proposed as a recommendation
///
/// Ephemeral: recomputed on each request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationCandidate {
    pub external_id: u64,
    pub title: String,
    pub media_type: MediaType,
    pub aggregate_score: f64,
    /// Seed titles that contributed, first-added order, at most 3
    pub reasons: Vec<String>,
    pub poster_url: Option<String>,
}

impl RecommendationCandidate {
    /// Human-readable "why" line, comma-joined contributing seed titles
    pub fn why(&self) -> String {
        format!("Because you liked {}", self.reasons.join(", "))
    }

    /// Aggregate score formatted to two decimal places for display
    pub fn score_display(&self) -> String {
        format!("{:.2}", self.aggregate_score)
    }
}

/// Outcome of a recommendation run, mapped 1:1 to user-facing notices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    /// No authenticated viewer
    SignInRequired,
    /// No viewer/friend rating scored 3.5 or above
    NeedMoreRatings,
    /// No seed rating could be matched to a catalog entry
    CouldNotMapTitles,
    /// Seeds resolved but every related entry was excluded or missing
    NoCandidates,
    /// Ranked candidates are available
    Updated,
}

impl RecommendationStatus {
    /// The notice text shown to the viewer
    pub fn message(&self) -> &'static str {
        match self {
            RecommendationStatus::SignInRequired => "Sign in required.",
            RecommendationStatus::NeedMoreRatings => {
                "Rate a few more titles 3.5 or higher to get recommendations."
            }
            RecommendationStatus::CouldNotMapTitles => {
                "Could not map your rated titles to the catalog."
            }
            RecommendationStatus::NoCandidates => "No recommendations returned.",
            RecommendationStatus::Updated => "Recommendations updated.",
        }
    }
}
