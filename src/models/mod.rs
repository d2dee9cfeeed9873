pub mod account;
pub mod catalog;
pub mod rating;
pub mod recommendation;

pub use account::Account;
pub use catalog::{CatalogItem, MediaType, TmdbEntry, TmdbListResponse};
pub use rating::Rating;
pub use recommendation::{RecommendationCandidate, RecommendationStatus};
