pub mod providers;
pub mod recommendations;

pub use providers::CatalogProvider;
pub use recommendations::{rank_for_viewer, RecommendationBoard, RecommendationOutcome};
