use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::{
    models::{CatalogItem, MediaType, Rating, RecommendationCandidate, RecommendationStatus},
    services::providers::CatalogProvider,
};

/// Ratings below this score never seed recommendations
const MIN_SEED_SCORE: f64 = 3.5;
/// Qualifying ratings considered, in recency order
const MAX_SEED_RATINGS: usize = 8;
/// Resolved seeds actually used, bounding external calls
const MAX_RESOLVED_SEEDS: usize = 5;
/// Related entries taken per seed
const MAX_RELATED_PER_SEED: usize = 8;
/// Candidates returned
const MAX_CANDIDATES: usize = 10;
/// Seed titles kept per candidate, first-added order
const MAX_REASONS: usize = 3;

/// Result of a recommendation run: a status notice plus ranked candidates
#[derive(Debug, Clone)]
pub struct RecommendationOutcome {
    pub status: RecommendationStatus,
    pub candidates: Vec<RecommendationCandidate>,
}

impl RecommendationOutcome {
    fn empty(status: RecommendationStatus) -> Self {
        Self {
            status,
            candidates: Vec::new(),
        }
    }
}

/// A seed rating resolved to a catalog entry
struct ResolvedSeed {
    item: CatalogItem,
    /// The originating rating's score
    weight: f64,
    /// The originating rating's title, recorded as a candidate reason
    seed_title: String,
}

/// Running aggregate for one (media type, external id) composite key
struct CandidateAccumulator {
    item: CatalogItem,
    score: f64,
    reasons: Vec<String>,
}

/// Ranks recommendation candidates for a viewer.
///
/// `ratings` holds the viewer's and their friends' ratings in recency order.
/// Highly rated titles (>= 3.5) become seeds; each seed is resolved against
/// the catalog and its related-items list feeds a weighted aggregate. Anything
/// the viewer or a friend has already rated is excluded. Per-seed failures
/// degrade to fewer recommendations, never to a hard error.
pub async fn rank_for_viewer(
    provider: &dyn CatalogProvider,
    ratings: &[Rating],
) -> RecommendationOutcome {
    let seeds: Vec<&Rating> = ratings
        .iter()
        .filter(|r| r.score >= MIN_SEED_SCORE)
        .take(MAX_SEED_RATINGS)
        .collect();

    if seeds.is_empty() {
        return RecommendationOutcome::empty(RecommendationStatus::NeedMoreRatings);
    }

    // Every already-rated title is off the table, regardless of its score
    let excluded: HashSet<String> = ratings.iter().map(|r| r.title.to_lowercase()).collect();

    let resolved = resolve_seeds(provider, &seeds).await;
    if resolved.is_empty() {
        return RecommendationOutcome::empty(RecommendationStatus::CouldNotMapTitles);
    }

    // Discovery order doubles as the deterministic tie-break, so the
    // accumulator list is kept in first-seen order and sorted stably.
    let mut order: HashMap<(MediaType, u64), usize> = HashMap::new();
    let mut accumulators: Vec<CandidateAccumulator> = Vec::new();

    for seed in &resolved {
        let related = match provider.related(seed.item.media_type, seed.item.external_id).await {
            Ok(related) => related,
            Err(e) => {
                tracing::warn!(
                    seed = %seed.item.title,
                    error = %e,
                    "Related items fetch failed, skipping seed"
                );
                continue;
            }
        };

        for (rank, item) in related.into_iter().take(MAX_RELATED_PER_SEED).enumerate() {
            if excluded.contains(&item.title.to_lowercase()) {
                continue;
            }

            let contribution =
                seed.weight * (1.0 / (rank as f64 + 1.0)) + item.popularity / 1000.0;

            let key = (item.media_type, item.external_id);
            let index = *order.entry(key).or_insert_with(|| {
                accumulators.push(CandidateAccumulator {
                    item: item.clone(),
                    score: 0.0,
                    reasons: Vec::new(),
                });
                accumulators.len() - 1
            });

            let acc = &mut accumulators[index];
            acc.score += contribution;
            if !acc.reasons.contains(&seed.seed_title) {
                acc.reasons.push(seed.seed_title.clone());
            }
        }
    }

    // Stable sort keeps first-discovered order for equal scores
    accumulators.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let candidates: Vec<RecommendationCandidate> = accumulators
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|acc| {
            let mut reasons = acc.reasons;
            reasons.truncate(MAX_REASONS);
            RecommendationCandidate {
                external_id: acc.item.external_id,
                title: acc.item.title,
                media_type: acc.item.media_type,
                aggregate_score: acc.score,
                reasons,
                poster_url: acc.item.poster_url,
            }
        })
        .collect();

    if candidates.is_empty() {
        RecommendationOutcome::empty(RecommendationStatus::NoCandidates)
    } else {
        RecommendationOutcome {
            status: RecommendationStatus::Updated,
            candidates,
        }
    }
}

/// Resolves seed ratings to catalog entries, stopping after enough successes.
///
/// Each seed is searched by title; the first result matching the rating's
/// declared media type wins, falling back to the first result of any type.
/// Failures are skipped silently and never abort the batch.
async fn resolve_seeds(provider: &dyn CatalogProvider, seeds: &[&Rating]) -> Vec<ResolvedSeed> {
    let mut resolved = Vec::new();

    for rating in seeds {
        if resolved.len() >= MAX_RESOLVED_SEEDS {
            break;
        }

        let results = match provider.search(&rating.title).await {
            Ok(results) => results,
            Err(e) => {
                tracing::debug!(title = %rating.title, error = %e, "Seed search failed, skipping");
                continue;
            }
        };

        let item = results
            .iter()
            .find(|item| item.media_type == rating.media_type)
            .or_else(|| results.first())
            .cloned();

        match item {
            Some(item) => resolved.push(ResolvedSeed {
                item,
                weight: rating.score,
                seed_title: rating.title.clone(),
            }),
            None => {
                tracing::debug!(title = %rating.title, "Seed did not match any catalog entry");
            }
        }
    }

    resolved
}

/// Latest committed recommendations per viewer, guarded against stale runs.
///
/// Each run takes a generation id before its first network call; a run may
/// only commit if no newer run for the same viewer has committed since. The
/// superseded run's result is dropped and the caller serves the newer one.
#[derive(Default)]
pub struct RecommendationBoard {
    generation: AtomicU64,
    inner: RwLock<HashMap<String, BoardEntry>>,
}

struct BoardEntry {
    generation: u64,
    outcome: RecommendationOutcome,
}

impl RecommendationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a run, returning its generation id
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Commits a finished run unless a newer one already committed.
    ///
    /// Returns false when the run was superseded.
    pub async fn commit(&self, viewer: &str, generation: u64, outcome: RecommendationOutcome) -> bool {
        let mut inner = self.inner.write().await;
        match inner.get(viewer) {
            Some(entry) if entry.generation > generation => false,
            _ => {
                inner.insert(
                    viewer.to_string(),
                    BoardEntry {
                        generation,
                        outcome,
                    },
                );
                true
            }
        }
    }

    /// Most recently committed outcome for the viewer
    pub async fn latest(&self, viewer: &str) -> Option<RecommendationOutcome> {
        let inner = self.inner.read().await;
        inner.get(viewer).map(|entry| entry.outcome.clone())
    }
}
