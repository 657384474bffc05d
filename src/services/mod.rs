//! The recommendation pipeline: features, similarity, popularity, title
//! lookup and the strategies built on top of them

pub mod features;
pub mod popularity;
pub mod recommendations;
pub mod similarity;
pub mod title_search;

pub use features::FeatureMatrix;
pub use popularity::PopularityRanking;
pub use recommendations::Recommender;
pub use similarity::SimilarityIndex;
pub use title_search::TitleIndex;
