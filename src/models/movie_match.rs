use serde::{Deserialize, Serialize};

use super::{CatalogMovie, CsvColumn, RowFields};

/// Classification of a match confidence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Matched,
    Uncertain,
    Unmatched,
}

/// How the current selection of a match record was decided
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchResolution {
    /// Picked by the confidence model
    #[default]
    Automatic,
    /// Chosen by a reviewer
    Manual,
    /// Selection removed by a reviewer
    Cleared,
}

/// Per-row result of matching a CSV row against the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieMatch {
    pub source_row: Vec<String>,
    pub source_columns: Vec<CsvColumn>,
    pub detected_title: String,
    pub detected_year: Option<i32>,
    pub detected_date: Option<String>,
    pub detected_rating: Option<f64>,
    pub selected_candidate: Option<CatalogMovie>,
    pub confidence: f64,
    pub status: MatchStatus,
    /// Runners-up in confidence order, at most five
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_candidates: Vec<CatalogMovie>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_note: Option<String>,
    #[serde(default)]
    pub resolution: MatchResolution,
}

impl MovieMatch {
    /// Record with no candidate, as produced for empty search results
    pub fn unmatched(title: impl Into<String>, year: Option<i32>) -> Self {
        Self {
            source_row: Vec::new(),
            source_columns: Vec::new(),
            detected_title: title.into(),
            detected_year: year,
            detected_date: None,
            detected_rating: None,
            selected_candidate: None,
            confidence: 0.0,
            status: MatchStatus::Unmatched,
            alternative_candidates: Vec::new(),
            error_note: None,
            resolution: MatchResolution::Automatic,
        }
    }

    /// Unmatched record explaining why the lookup failed
    pub fn failed(title: impl Into<String>, year: Option<i32>, note: impl Into<String>) -> Self {
        Self {
            error_note: Some(note.into()),
            ..Self::unmatched(title, year)
        }
    }

    /// Attaches the source row and the fields extracted from it
    pub fn with_source(mut self, row: Vec<String>, columns: Vec<CsvColumn>, fields: &RowFields) -> Self {
        self.source_row = row;
        self.source_columns = columns;
        self.detected_date = fields.date.clone();
        self.detected_rating = fields.rating;
        self
    }

    /// Reviewer picked `candidate`: full confidence, matched.
    pub fn with_selection(&self, candidate: CatalogMovie) -> Self {
        Self {
            selected_candidate: Some(candidate),
            confidence: 1.0,
            status: MatchStatus::Matched,
            error_note: None,
            resolution: MatchResolution::Manual,
            ..self.clone()
        }
    }

    /// Reviewer removed the selection.
    pub fn cleared(&self) -> Self {
        Self {
            selected_candidate: None,
            confidence: 0.0,
            status: MatchStatus::Unmatched,
            resolution: MatchResolution::Cleared,
            ..self.clone()
        }
    }

    /// Anything a reviewer still has to look at
    pub fn needs_review(&self) -> bool {
        self.status != MatchStatus::Matched || self.error_note.is_some()
    }
}

/// Review filter over a list of match records
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchFilter {
    #[default]
    All,
    Matched,
    NeedsReview,
}

impl MatchFilter {
    pub fn accepts(&self, record: &MovieMatch) -> bool {
        match self {
            MatchFilter::All => true,
            MatchFilter::Matched => record.status == MatchStatus::Matched,
            MatchFilter::NeedsReview => record.needs_review(),
        }
    }

    pub fn apply<'a>(&self, records: &'a [MovieMatch]) -> Vec<&'a MovieMatch> {
        records.iter().filter(|r| self.accepts(r)).collect()
    }
}

/// Counts per status over a batch of match records
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchSummary {
    pub total: usize,
    pub matched: usize,
    pub uncertain: usize,
    pub unmatched: usize,
    /// Records whose lookup raised an error
    pub failed: usize,
}

impl MatchSummary {
    pub fn from_matches(records: &[MovieMatch]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.total += 1;
            match record.status {
                MatchStatus::Matched => summary.matched += 1,
                MatchStatus::Uncertain => summary.uncertain += 1,
                MatchStatus::Unmatched => summary.unmatched += 1,
            }
            if record.error_note.is_some() {
                summary.failed += 1;
            }
            summary
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: u64, title: &str) -> CatalogMovie {
        CatalogMovie {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            release_date: Some("1999-03-31".to_string()),
            poster_path: None,
            backdrop_path: None,
            overview: None,
            popularity: 10.0,
            vote_average: 8.2,
            vote_count: 100,
        }
    }

    fn uncertain_match() -> MovieMatch {
        MovieMatch {
            selected_candidate: Some(movie(603, "The Matrix")),
            confidence: 0.55,
            status: MatchStatus::Uncertain,
            alternative_candidates: vec![movie(604, "The Matrix Reloaded")],
            ..MovieMatch::unmatched("Matrix", Some(1999))
        }
    }

    #[test]
    fn test_with_selection_forces_full_confidence() {
        let original = uncertain_match();
        let updated = original.with_selection(movie(604, "The Matrix Reloaded"));

        assert_eq!(updated.confidence, 1.0);
        assert_eq!(updated.status, MatchStatus::Matched);
        assert_eq!(updated.resolution, MatchResolution::Manual);
        assert_eq!(updated.selected_candidate.as_ref().map(|m| m.id), Some(604));
        assert_eq!(updated.alternative_candidates.len(), 1);

        // The original value is untouched
        assert_eq!(original.status, MatchStatus::Uncertain);
        assert_eq!(original.resolution, MatchResolution::Automatic);
    }

    #[test]
    fn test_with_selection_clears_error_note() {
        let failed = MovieMatch::failed("Heat", Some(1995), "Error searching for movie");
        let updated = failed.with_selection(movie(949, "Heat"));

        assert_eq!(updated.error_note, None);
        assert_eq!(updated.status, MatchStatus::Matched);
    }

    #[test]
    fn test_cleared_resets_selection() {
        let cleared = uncertain_match().cleared();

        assert!(cleared.selected_candidate.is_none());
        assert_eq!(cleared.confidence, 0.0);
        assert_eq!(cleared.status, MatchStatus::Unmatched);
        assert_eq!(cleared.resolution, MatchResolution::Cleared);
        assert_eq!(cleared.detected_title, "Matrix");
    }

    #[test]
    fn test_filters() {
        let matched = uncertain_match().with_selection(movie(603, "The Matrix"));
        let uncertain = uncertain_match();
        let failed = MovieMatch::failed("Heat", None, "boom");
        let records = vec![matched, uncertain, failed];

        assert_eq!(MatchFilter::All.apply(&records).len(), 3);
        assert_eq!(MatchFilter::Matched.apply(&records).len(), 1);
        assert_eq!(MatchFilter::NeedsReview.apply(&records).len(), 2);
    }

    #[test]
    fn test_summary_counts() {
        let records = vec![
            uncertain_match().with_selection(movie(603, "The Matrix")),
            uncertain_match(),
            MovieMatch::unmatched("Nothing", None),
            MovieMatch::failed("Heat", None, "boom"),
        ];

        let summary = MatchSummary::from_matches(&records);
        assert_eq!(
            summary,
            MatchSummary {
                total: 4,
                matched: 1,
                uncertain: 1,
                unmatched: 2,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_serialization_omits_empty_optionals() {
        let json = serde_json::to_value(MovieMatch::unmatched("Heat", None)).unwrap();

        assert_eq!(json["status"], "unmatched");
        assert_eq!(json["detectedTitle"], "Heat");
        assert_eq!(json["resolution"], "automatic");
        assert!(json.get("errorNote").is_none());
        assert!(json.get("alternativeCandidates").is_none());
    }
}
