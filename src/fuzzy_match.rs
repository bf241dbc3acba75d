//! Approximate matching of actor names against the top-raw-names corpus.

use serde::Deserialize;

use crate::category::Category;
use crate::error::{Error, Result};
use crate::similarity::{
    partial_ratio, ratio, ratio_upper_bound, token_overlap_len, tokens, Score,
};
use crate::vocabulary::TopRawNames;

/// Default acceptance threshold on the 0-100 scale.
pub const DEFAULT_FUZZY_THRESHOLD: Score = 85;

/// Similarity function used by the fuzzy stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuzzyScorer {
    /// Plain indel ratio.
    Ratio,
    /// Ratio over alphabetically sorted tokens.
    #[default]
    TokenSort,
    /// Best window of the longer string against the shorter.
    Partial,
}

impl FuzzyScorer {
    /// Preprocess one side once so candidates are not re-tokenised per name.
    fn prepare(self, text: &str) -> String {
        match self {
            FuzzyScorer::TokenSort => {
                let mut toks: Vec<&str> = tokens(text).collect();
                toks.sort_unstable();
                toks.join(" ")
            }
            FuzzyScorer::Ratio | FuzzyScorer::Partial => text.to_string(),
        }
    }

    fn score_prepared(self, a: &str, b: &str) -> Score {
        match self {
            FuzzyScorer::Ratio | FuzzyScorer::TokenSort => ratio(a, b),
            FuzzyScorer::Partial => partial_ratio(a, b),
        }
    }

    fn upper_bound(self, a_len: usize, b_len: usize) -> Score {
        match self {
            FuzzyScorer::Ratio | FuzzyScorer::TokenSort => ratio_upper_bound(a_len, b_len),
            FuzzyScorer::Partial if a_len == 0 || b_len == 0 => 0,
            FuzzyScorer::Partial => 100,
        }
    }

    /// Score two normalised names.
    pub fn score(self, a: &str, b: &str) -> Score {
        self.score_prepared(&self.prepare(a), &self.prepare(b))
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    category: Category,
    name: String,
    prepared: String,
    prepared_len: usize,
}

/// Best fuzzy candidate for a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyHit<'a> {
    pub category: Category,
    pub candidate: &'a str,
    pub score: Score,
}

/// Threshold matcher over a [`TopRawNames`] table.
#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    candidates: Vec<Candidate>,
    threshold: Score,
    scorer: FuzzyScorer,
}

impl FuzzyMatcher {
    pub fn new(top: &TopRawNames, threshold: Score, scorer: FuzzyScorer) -> Result<Self> {
        if threshold > 100 {
            return Err(Error::InvalidThreshold {
                field: "fuzzy_threshold",
                value: u16::from(threshold),
            });
        }
        let candidates = top
            .iter()
            .flat_map(|(category, names)| {
                names.iter().map(move |name| {
                    let prepared = scorer.prepare(name);
                    Candidate {
                        category,
                        name: name.clone(),
                        prepared_len: prepared.chars().count(),
                        prepared,
                    }
                })
            })
            .collect();
        Ok(Self {
            candidates,
            threshold,
            scorer,
        })
    }

    pub fn threshold(&self) -> Score {
        self.threshold
    }

    pub fn scorer(&self) -> FuzzyScorer {
        self.scorer
    }

    /// Number of reference names scanned per lookup.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Best-scoring candidate at or above the threshold.
    ///
    /// Equal scores go to the candidate sharing the most token characters
    /// with `name`, then to the earlier category in priority order.
    pub fn match_name(&self, name: &str) -> Option<FuzzyHit<'_>> {
        let prepared = self.scorer.prepare(name);
        if prepared.is_empty() {
            return None;
        }
        let len = prepared.chars().count();

        let mut best: Option<(&Candidate, Score, usize)> = None;
        for cand in &self.candidates {
            let floor = best.map_or(self.threshold, |(_, s, _)| s.max(self.threshold));
            if self.scorer.upper_bound(len, cand.prepared_len) < floor {
                continue;
            }
            let score = self.scorer.score_prepared(&prepared, &cand.prepared);
            if score < floor {
                continue;
            }
            let overlap = token_overlap_len(name, &cand.name);
            let better = match best {
                None => true,
                Some((_, best_score, best_overlap)) => {
                    score > best_score || (score == best_score && overlap > best_overlap)
                }
            };
            if better {
                best = Some((cand, score, overlap));
            }
        }

        best.map(|(cand, score, _)| FuzzyHit {
            category: cand.category,
            candidate: &cand.name,
            score,
        })
    }

    pub fn classify(&self, name: &str) -> Option<Category> {
        self.match_name(name).map(|hit| hit.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::GeoReference;
    use std::collections::BTreeMap;

    fn top(rows: &[(&str, &[&str])]) -> TopRawNames {
        let table: BTreeMap<String, Vec<String>> = rows
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect();
        TopRawNames::from_table(&table, &GeoReference::embedded().unwrap()).unwrap()
    }

    #[test]
    fn test_accepts_close_spelling() {
        let m = FuzzyMatcher::new(
            &top(&[("Civilians", &["protesters"]), ("Government", &["riot police"])]),
            85,
            FuzzyScorer::TokenSort,
        )
        .unwrap();
        let hit = m.match_name("protestors").unwrap();
        assert_eq!(hit.category, Category::Civilians);
        assert_eq!(hit.candidate, "protesters");
        assert!(hit.score >= 85);
        assert_eq!(m.classify("police riot"), Some(Category::Government));
        assert_eq!(m.classify("bishops"), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let t = top(&[("Healthcare", &["nurses association"])]);
        let name = "nurse asociation";
        let score = FuzzyScorer::TokenSort.score(name, "nurses association");
        assert!(score > 0 && score < 100);

        let at = FuzzyMatcher::new(&t, score, FuzzyScorer::TokenSort).unwrap();
        assert_eq!(at.classify(name), Some(Category::Healthcare));

        let above = FuzzyMatcher::new(&t, score + 1, FuzzyScorer::TokenSort).unwrap();
        assert_eq!(above.classify(name), None);
    }

    #[test]
    fn test_tie_prefers_token_overlap() {
        // "abc xyz" scores the same against both candidates; only the
        // Religious one shares a whole token with it.
        let t = top(&[("Civilians", &["abd xyy"]), ("Religious", &["abc xqq"])]);
        let m = FuzzyMatcher::new(&t, 50, FuzzyScorer::Ratio).unwrap();
        let name = "abc xyz";
        assert_eq!(
            FuzzyScorer::Ratio.score(name, "abd xyy"),
            FuzzyScorer::Ratio.score(name, "abc xqq")
        );
        assert_eq!(m.classify(name), Some(Category::Religious));
    }

    #[test]
    fn test_tie_falls_back_to_priority() {
        let t = top(&[("Religious", &["abcdx"]), ("Corporate", &["abcdy"])]);
        let m = FuzzyMatcher::new(&t, 50, FuzzyScorer::Ratio).unwrap();
        assert_eq!(m.classify("abcdz"), Some(Category::Corporate));
    }

    #[test]
    fn test_empty_categories_never_win() {
        let m = FuzzyMatcher::new(&TopRawNames::empty(), 0, FuzzyScorer::TokenSort).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.classify("anything"), None);
    }

    #[test]
    fn test_partial_scorer() {
        let t = top(&[("NGO/Advocacy", &["red cross"])]);
        let m = FuzzyMatcher::new(&t, 95, FuzzyScorer::Partial).unwrap();
        assert_eq!(m.classify("kenya red cross society"), Some(Category::NgoAdvocacy));
    }

    #[test]
    fn test_rejects_threshold_over_100() {
        assert!(FuzzyMatcher::new(&TopRawNames::empty(), 101, FuzzyScorer::Ratio).is_err());
    }
}
