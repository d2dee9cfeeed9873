use crate::{
    error::AppResult,
    models::{CatalogItem, MediaType},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// External movie/TV metadata source
///
/// Two operations drive the whole application: free-text search (rating form,
/// seed resolution) and the rank-significant related-items list the
/// recommendation ranker consumes. Keeping both behind one trait means the
/// ranker never learns which catalog it is talking to.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Case-insensitive free-text search
    ///
    /// An empty query yields an empty result without a network call.
    /// A non-success upstream response surfaces as an error, distinguishable
    /// from "no matches".
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>>;

    /// Ordered related-items list for a catalog entry
    ///
    /// Position in the returned list is rank-significant; earlier entries are
    /// stronger matches.
    async fn related(&self, media_type: MediaType, external_id: u64)
        -> AppResult<Vec<CatalogItem>>;
}
