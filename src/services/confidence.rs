//! Confidence model.
//!
//! Scores catalog candidates against the title and year detected in a row
//! and classifies the result as matched, uncertain or unmatched.

use std::cmp::Ordering;

use crate::{
    models::{CatalogMovie, MatchStatus},
    services::similarity::title_similarity,
};

const TITLE_WEIGHT: f64 = 0.6;
const EXACT_YEAR_BONUS: f64 = 0.3;
const NEAR_YEAR_BONUS: f64 = 0.1;
/// TMDB popularity typically spans 0-1000
const POPULARITY_SCALE: f64 = 1000.0;
const POPULARITY_CAP: f64 = 0.1;

const MATCHED_THRESHOLD: f64 = 0.7;
const UNCERTAIN_THRESHOLD: f64 = 0.4;

/// A catalog candidate with its confidence against the detected fields
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub movie: CatalogMovie,
    pub confidence: f64,
}

/// Confidence in `[0, 1]` that `movie` is the film described by `title`/`year`.
pub fn calculate_confidence(movie: &CatalogMovie, title: &str, year: Option<i32>) -> f64 {
    let title_score = title_similarity(title, &movie.title)
        .max(title_similarity(title, &movie.original_title));
    let mut confidence = title_score * TITLE_WEIGHT;

    if let (Some(year), Some(release_year)) = (year, movie.release_year()) {
        match (release_year - year).abs() {
            0 => confidence += EXACT_YEAR_BONUS,
            1 => confidence += NEAR_YEAR_BONUS,
            _ => {}
        }
    }

    // Tie-breaker only
    confidence += (movie.popularity / POPULARITY_SCALE).clamp(0.0, POPULARITY_CAP);

    confidence.clamp(0.0, 1.0)
}

/// Classifies a confidence; an empty candidate set is always unmatched.
pub fn match_status(confidence: f64, has_results: bool) -> MatchStatus {
    if !has_results {
        MatchStatus::Unmatched
    } else if confidence > MATCHED_THRESHOLD {
        MatchStatus::Matched
    } else if confidence > UNCERTAIN_THRESHOLD {
        MatchStatus::Uncertain
    } else {
        MatchStatus::Unmatched
    }
}

/// Scores every candidate and sorts by descending confidence.
///
/// Ties keep the catalog's response order.
pub fn rank_candidates(
    movies: Vec<CatalogMovie>,
    title: &str,
    year: Option<i32>,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = movies
        .into_iter()
        .map(|movie| {
            let confidence = calculate_confidence(&movie, title, year);
            ScoredCandidate { movie, confidence }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    scored
}
