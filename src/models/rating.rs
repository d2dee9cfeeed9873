use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MediaType;

/// A saved rating, owned by exactly one user
///
/// `external_id` and `poster_url` are present when the rating was created from
/// a catalog search result rather than a custom title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub media_type: MediaType,
    /// 0.0 to 5.0 in one-decimal steps
    pub score: f64,
    pub comment: String,
    pub external_id: Option<i64>,
    pub poster_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Builds a new rating for `owner`, stamped with the current time
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: String,
        title: String,
        media_type: MediaType,
        score: f64,
        comment: String,
        external_id: Option<i64>,
        poster_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            title,
            media_type,
            score,
            comment,
            external_id,
            poster_url,
            created_at: Utc::now(),
        }
    }

    /// Checks the one-decimal 0..=5 score contract of the rating form
    pub fn valid_score(score: f64) -> bool {
        if !(0.0..=5.0).contains(&score) {
            return false;
        }
        let tenths = score * 10.0;
        (tenths - tenths.round()).abs() < 1e-9
    }
}
