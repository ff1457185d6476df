pub mod confidence;
pub mod csv_analysis;
pub mod export;
pub mod extract;
pub mod matching;
pub mod providers;
pub mod similarity;
pub mod title_search;

pub use matching::MatchingService;
