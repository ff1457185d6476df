//! Title similarity scoring.
//!
//! Titles are compared after folding case, dropping punctuation and collapsing
//! whitespace, so "The Matrix!" and "the  matrix" are identical.

use strsim::levenshtein;

/// Weight applied to the length ratio when one title contains the other
const CONTAINMENT_WEIGHT: f64 = 0.8;

/// Lowercases, keeps only `[a-z0-9]` and whitespace, collapses runs of whitespace.
pub fn normalize_title(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity of two titles in `[0, 1]`.
///
/// Symmetric in its arguments. An empty raw input scores 0.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = normalize_title(a);
    let b = normalize_title(b);

    if a == b {
        return 1.0;
    }

    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    let (shorter, longer) = (len_a.min(len_b), len_a.max(len_b));

    if a.contains(b.as_str()) || b.contains(a.as_str()) {
        return CONTAINMENT_WEIGHT * shorter as f64 / longer as f64;
    }

    if longer == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longer as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  The Matrix: Reloaded!! "), "the matrix reloaded");
        assert_eq!(normalize_title("Amélie"), "amlie");
        assert_eq!(normalize_title("Se7en\t(1995)"), "se7en 1995");
        assert_eq!(normalize_title("???"), "");
    }

    #[test]
    fn test_identical_after_normalization() {
        let titles = [
            "Oppenheimer",
            "The Lord of the Rings: The Return of the King",
            "WALL·E",
            "2001: A Space Odyssey",
            "  spaced   out  ",
        ];

        for title in titles {
            assert_close(title_similarity(title, title), 1.0);
            assert_close(title_similarity(title, &title.to_uppercase()), 1.0);
        }
        assert_close(title_similarity("Spider-Man", "spiderman"), 1.0);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_close(title_similarity("", "Heat"), 0.0);
        assert_close(title_similarity("Heat", ""), 0.0);
        assert_close(title_similarity("", ""), 0.0);
    }

    #[test]
    fn test_punctuation_only_inputs_are_equal() {
        assert_close(title_similarity("!!!", "???"), 1.0);
    }

    #[test]
    fn test_containment_uses_length_ratio() {
        // "alien" (5) inside "aliens" (6)
        assert_close(title_similarity("Alien", "Aliens"), 0.8 * 5.0 / 6.0);
        assert_close(title_similarity("Aliens", "Alien"), 0.8 * 5.0 / 6.0);
    }

    #[test]
    fn test_edit_distance_branch() {
        // kitten -> sitting: distance 3, longest 7
        assert_close(title_similarity("kitten", "sitting"), 1.0 - 3.0 / 7.0);
        assert_close(title_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("The Godfather", "Godfather Part II"),
            ("Heat", "Hear"),
            ("Blade Runner 2049", "Blade Runner"),
            ("Amélie", "Amelie"),
            ("Up", "Pulp Fiction"),
        ];

        for (a, b) in pairs {
            assert_close(title_similarity(a, b), title_similarity(b, a));
        }
    }

    #[test]
    fn test_score_is_bounded() {
        let pairs = [("a", "bbbbbbbbbb"), ("Heat", "Heat 2"), ("x y z", "xyz")];
        for (a, b) in pairs {
            let score = title_similarity(a, b);
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
