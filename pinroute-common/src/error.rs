//! Error types and utilities for the pinroute toolkit
//!
//! Provides the error taxonomy shared by the graph builders, the shortest-path
//! query and the command-line front end, plus fuzzy matching for location ids
//! that are not present in the supplied dataset.

use strsim::{jaro_winkler, normalized_levenshtein};

/// Minimum combined similarity for an id to be offered as a suggestion.
///
/// Postal codes are short digit strings, so a single transposed or dropped
/// digit still scores well above this while unrelated codes fall below it.
const MIN_SUGGESTION_SCORE: f64 = 0.65;

/// Find the best fuzzy match for `input` among `candidates`
///
/// Scores each candidate as 70% Jaro-Winkler plus 30% normalized Levenshtein.
/// Jaro-Winkler rewards shared prefixes (postal codes share region prefixes);
/// Levenshtein catches dropped or doubled digits.
fn find_best_fuzzy_match<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let input_lower = input.to_lowercase();
    let mut best_match = None;
    let mut best_score = 0.0f64;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();

        let jw_score = jaro_winkler(&input_lower, &candidate_lower);
        let lev_score = normalized_levenshtein(&input_lower, &candidate_lower);
        let score = (jw_score * 0.7) + (lev_score * 0.3);

        if score >= MIN_SUGGESTION_SCORE && score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Suggest a known location id for a possibly mistyped one
///
/// Returns `None` when `id` is itself known (no suggestion needed) or when no
/// candidate is similar enough.
pub fn suggest_location<'a, I>(id: &str, known: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let known = known.into_iter();

    if known.clone().any(|candidate| candidate == id) {
        return None;
    }

    find_best_fuzzy_match(id, known)
}

/// Main error type for pinroute operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source or destination id not present in the supplied location list
    #[error("Location '{id}' not found in dataset{}", suggestion_suffix(.suggestion))]
    UnknownLocation {
        id: String,
        suggestion: Option<String>,
    },

    /// Neighbor count is not usable for graph construction
    #[error("Invalid neighbor count {requested} for {locations} locations: at least 1 neighbor is required")]
    InvalidNeighborCount { requested: usize, locations: usize },

    /// The spatial index could not resolve a nearest-neighbor query
    #[error("Nearest-neighbor query failed for location '{id}': {reason}")]
    IndexQuery { id: String, reason: String },

    /// Invalid input handed over by a collaborator
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(id) => format!(" (did you mean '{id}'?)"),
        None => String::new(),
    }
}

impl Error {
    /// Build an `UnknownLocation` error, looking up a suggestion among `known`
    pub fn unknown_location<'a, I>(id: &str, known: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        Error::UnknownLocation {
            id: id.to_string(),
            suggestion: suggest_location(id, known),
        }
    }
}

/// Result type alias for pinroute operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [&str; 5] = ["110001", "400001", "560001", "560034", "600028"];

    #[test]
    fn test_exact_match_needs_no_suggestion() {
        assert_eq!(suggest_location("560034", KNOWN.iter().copied()), None);
    }

    #[test]
    fn test_transposed_digits_are_suggested() {
        assert_eq!(
            suggest_location("560043", KNOWN.iter().copied()),
            Some("560034".to_string())
        );
    }

    #[test]
    fn test_unrelated_input_has_no_suggestion() {
        assert_eq!(suggest_location("zzzz", KNOWN.iter().copied()), None);
    }

    #[test]
    fn test_unknown_location_display_includes_suggestion() {
        let err = Error::unknown_location("56001", KNOWN.iter().copied());
        let msg = err.to_string();
        assert!(msg.contains("'56001'"), "unexpected message: {msg}");
        assert!(msg.contains("did you mean '560001'"), "unexpected message: {msg}");
    }

    #[test]
    fn test_unknown_location_display_without_suggestion() {
        let err = Error::unknown_location("zzzz", KNOWN.iter().copied());
        assert_eq!(err.to_string(), "Location 'zzzz' not found in dataset");
    }

    #[test]
    fn test_invalid_neighbor_count_display() {
        let err = Error::InvalidNeighborCount {
            requested: 0,
            locations: 4,
        };
        assert!(err.to_string().contains("Invalid neighbor count 0"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
