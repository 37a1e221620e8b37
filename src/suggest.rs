//! Ranking library tracks as follow-ups to a reference track.

use std::cmp::Ordering;

use crate::config::SuggestionSettings;
use crate::curation::SetCuration;
use crate::harmony::{CompatibilityScore, score};
use crate::library::{Track, TrackLibrary};

/// Hard cap on how many suggestions are returned.
pub const MAX_SUGGESTIONS: usize = 10;
/// Candidates scoring below this total are dropped.
pub const DEFAULT_MIN_SCORE: u8 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub track: Track,
    pub score: CompatibilityScore,
}

/// Bounds applied to a ranking.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Limits {
    pub max: usize,
    pub min_score: u8,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max: MAX_SUGGESTIONS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl From<&SuggestionSettings> for Limits {
    fn from(s: &SuggestionSettings) -> Self {
        Self {
            max: s.limit.min(MAX_SUGGESTIONS),
            min_score: s.min_score,
        }
    }
}

/// Best-first ordering: total score, then closer tempo, then name, then path.
fn rank(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score
        .total
        .cmp(&a.score.total)
        .then_with(|| a.score.bpm_delta.cmp(&b.score.bpm_delta))
        .then_with(|| {
            a.track
                .display_name
                .to_lowercase()
                .cmp(&b.track.display_name.to_lowercase())
        })
        .then_with(|| a.track.path.cmp(&b.track.path))
}

/// Suggest tracks from `library` to follow `reference`.
///
/// The reference itself and anything already in `set` are never suggested.
/// A reference without a known key has nothing to match against and yields
/// an empty list.
pub fn suggest(
    reference: &Track,
    library: &TrackLibrary,
    set: &SetCuration,
    limits: Limits,
) -> Vec<Suggestion> {
    if reference.camelot().is_none() {
        return Vec::new();
    }

    let mut ranked: Vec<Suggestion> = library
        .tracks()
        .iter()
        .filter(|t| t.id != reference.id && !set.contains(&t.id))
        .map(|t| Suggestion {
            track: t.clone(),
            score: score(reference, t),
        })
        .filter(|s| s.score.total >= limits.min_score)
        .collect();

    ranked.sort_by(rank);
    ranked.truncate(limits.max.min(MAX_SUGGESTIONS));
    ranked
}
