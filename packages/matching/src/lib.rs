#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Fuzzy name matching for hazards and locations.
//!
//! [`score`] combines a Ratcliff/Obershelp similarity ratio with prefix
//! and substring boosts. Two consumers sit on top of it:
//!
//! - [`rank_top_n`] for interactive search, which always returns the best
//!   available matches even when every score is weak.
//! - [`best_match`] for automatic entity resolution, which returns nothing
//!   unless the top candidate clears a (higher) acceptance threshold.

pub mod ratio;

use std::cmp::Ordering;

/// Scores at or above this value form the "significant" ranking pool.
pub const MIN_SIGNIFICANT_SCORE: f64 = 0.35;

/// Acceptance threshold for automatic catalog resolution.
pub const RESOLUTION_THRESHOLD: f64 = 0.6;

/// Result count used when a search does not specify a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest result count a search may request.
pub const MAX_LIMIT: usize = 50;

/// Floor applied when the candidate starts with the query.
const PREFIX_BOOST: f64 = 0.95;

/// Floor applied when the query appears anywhere in the candidate.
const SUBSTRING_BOOST: f64 = 0.85;

/// Anything that can be ranked by name.
pub trait Named {
    /// The display name matched against queries.
    fn name(&self) -> &str;
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

impl Named for str {
    fn name(&self) -> &str {
        self
    }
}

impl<T: Named + ?Sized> Named for &T {
    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A candidate paired with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    /// Score in `[0, 1]`.
    pub score: f64,
    /// The scored candidate.
    pub candidate: T,
}

/// Scores `candidate` against `query` in `[0, 1]`, case-insensitively.
///
/// The similarity ratio is raised to at least 0.95 when the candidate
/// starts with the query, otherwise to at least 0.85 when the query is a
/// substring of the candidate. An empty candidate scores 0.
#[must_use]
pub fn score(candidate: &str, query: &str) -> f64 {
    let candidate = candidate.to_lowercase();
    if candidate.is_empty() {
        return 0.0;
    }
    let query = query.to_lowercase();

    let similarity = ratio::similarity_ratio(&candidate, &query);
    if candidate.starts_with(&query) {
        similarity.max(PREFIX_BOOST)
    } else if candidate.contains(&query) {
        similarity.max(SUBSTRING_BOOST)
    } else {
        similarity
    }
}

/// Clamps a requested result count to `[1, MAX_LIMIT]`, defaulting to
/// [`DEFAULT_LIMIT`].
#[must_use]
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Ranks `candidates` by name against `query` and returns at most `limit`
/// of them with their scores.
///
/// Only candidates scoring at least [`MIN_SIGNIFICANT_SCORE`] are kept;
/// if none qualifies the whole scored pool is ranked instead. Ordering is
/// descending score, then ascending name.
#[must_use]
pub fn rank_scored<T: Named>(
    candidates: impl IntoIterator<Item = T>,
    query: &str,
    limit: usize,
) -> Vec<Scored<T>> {
    let scored: Vec<Scored<T>> = candidates
        .into_iter()
        .map(|candidate| Scored {
            score: score(candidate.name(), query),
            candidate,
        })
        .collect();

    let mut pool = if scored.iter().any(|s| s.score >= MIN_SIGNIFICANT_SCORE) {
        scored
            .into_iter()
            .filter(|s| s.score >= MIN_SIGNIFICANT_SCORE)
            .collect()
    } else {
        scored
    };

    pool.sort_by(rank_order);
    pool.truncate(limit);
    pool
}

/// Like [`rank_scored`], returning only the candidates.
#[must_use]
pub fn rank_top_n<T: Named>(
    candidates: impl IntoIterator<Item = T>,
    query: &str,
    limit: usize,
) -> Vec<T> {
    rank_scored(candidates, query, limit)
        .into_iter()
        .map(|s| s.candidate)
        .collect()
}

/// Returns the single highest-scoring candidate if its score is at least
/// `threshold`.
///
/// On equal scores the earliest candidate wins.
#[must_use]
pub fn best_match<T: Named>(
    candidates: impl IntoIterator<Item = T>,
    query: &str,
    threshold: f64,
) -> Option<T> {
    let mut best: Option<Scored<T>> = None;

    for candidate in candidates {
        let candidate_score = score(candidate.name(), query);
        if best.as_ref().is_none_or(|b| candidate_score > b.score) {
            best = Some(Scored {
                score: candidate_score,
                candidate,
            });
        }
    }

    match best {
        Some(b) if b.score >= threshold => {
            log::trace!("Best match for '{query}': '{}' ({:.3})", b.candidate.name(), b.score);
            Some(b.candidate)
        }
        _ => None,
    }
}

fn rank_order<T: Named>(a: &Scored<T>, b: &Scored<T>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.name().cmp(b.candidate.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typo_prefers_closer_name() {
        let rocky = score("Rocky Mountain National Park", "rokky");
        let yosemite = score("Yosemite National Park", "rokky");
        assert!(rocky > yosemite, "{rocky} should exceed {yosemite}");
    }

    #[test]
    fn prefix_and_substring_boosts() {
        assert!(score("Bear Activity", "bear") >= 0.95);
        assert!(score("Black Bear Activity", "bear") >= 0.85);
        assert!(score("Black Bear Activity", "bear") < 0.95);
    }

    #[test]
    fn empty_candidate_scores_zero() {
        assert!(score("", "bear").abs() < f64::EPSILON);
        assert!(score("", "").abs() < f64::EPSILON);
    }

    #[test]
    fn scores_are_case_insensitive() {
        assert!((score("BEAR ACTIVITY", "bear activity") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_respects_limit() {
        let names = vec!["Bear Activity", "Bear Advisory", "Avalanche Risk", "Bears"];
        assert_eq!(rank_top_n(names.clone(), "bear", 1).len(), 1);
        assert_eq!(rank_top_n(names.clone(), "bear", 2).len(), 2);
        assert!(rank_top_n(names, "bear", 50).len() <= 4);
    }

    #[test]
    fn equal_scores_order_by_name() {
        let names = vec!["Bear Zone", "Bear Alert", "Bear Meadow"];
        let ranked = rank_top_n(names, "bear", 10);
        assert_eq!(ranked, vec!["Bear Alert", "Bear Meadow", "Bear Zone"]);
    }

    #[test]
    fn ranking_orders_by_descending_score() {
        let names = vec!["Avalanche Risk", "Bear Activity"];
        let ranked = rank_scored(names, "berr", 10);
        assert_eq!(ranked[0].candidate, "Bear Activity");
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn weak_pool_falls_back_to_everything() {
        let names = vec!["Yosemite", "Zion"];
        let ranked = rank_scored(names, "qqqqqqqqqqqq", 10);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|s| s.score < MIN_SIGNIFICANT_SCORE));
    }

    #[test]
    fn significant_pool_drops_weak_candidates() {
        let names = vec!["Bear Activity", "Zion"];
        let ranked = rank_top_n(names, "bear", 10);
        assert_eq!(ranked, vec!["Bear Activity"]);
    }

    #[test]
    fn best_match_requires_threshold() {
        let names = vec!["Rocky Park".to_string(), "Yosemite".to_string()];
        assert_eq!(
            best_match(names.iter(), "rocky park", RESOLUTION_THRESHOLD).map(String::as_str),
            Some("Rocky Park")
        );
        assert!(best_match(names.iter(), "grand canyon", RESOLUTION_THRESHOLD).is_none());
        assert!(best_match(Vec::<String>::new(), "anything", 0.0).is_none());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(5)), 5);
    }
}
