//! Seed phrase matching: token-aligned lookup in category priority order.

use crate::category::Category;
use crate::vocabulary::SeedVocabulary;

// ── Word-boundary check ─────────────────────────────────────────────

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True when `phrase` occurs in `haystack` on word boundaries.
///
/// Both sides must already be normalised. `"art"` does not match inside
/// `"party"`, but `"labor union"` matches inside `"national labor union"`.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack.match_indices(phrase).any(|(pos, _)| {
        let before_ok = haystack[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = haystack[pos + phrase.len()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

/// Exact phrase matcher over a [`SeedVocabulary`].
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    seeds: SeedVocabulary,
}

impl PhraseMatcher {
    pub fn new(seeds: SeedVocabulary) -> Self {
        Self { seeds }
    }

    pub fn seeds(&self) -> &SeedVocabulary {
        &self.seeds
    }

    /// First category, in priority order, with a seed phrase inside `name`.
    ///
    /// Returns the category and the phrase that matched.
    pub fn match_name(&self, name: &str) -> Option<(Category, &str)> {
        self.seeds.iter().find_map(|(category, phrases)| {
            phrases
                .iter()
                .find(|p| contains_phrase(name, p))
                .map(|p| (category, p.as_str()))
        })
    }

    pub fn classify(&self, name: &str) -> Option<Category> {
        self.match_name(name).map(|(category, _)| category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::PRIORITY;
    use std::collections::BTreeMap;

    fn matcher(table: &[(&str, &[&str])]) -> PhraseMatcher {
        let map: BTreeMap<String, Vec<String>> = table
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect();
        PhraseMatcher::new(SeedVocabulary::from_table(&map).unwrap())
    }

    #[test]
    fn test_word_boundaries() {
        assert!(contains_phrase("labour party", "party"));
        assert!(!contains_phrase("party", "art"));
        assert!(!contains_phrase("reunion", "union"));
        assert!(contains_phrase("farmers union", "union"));
        assert!(contains_phrase("kenya red cross society", "red cross"));
    }

    #[test]
    fn test_later_occurrence_on_boundary() {
        // First "union" is inside "reunion"; the second stands alone.
        assert!(contains_phrase("reunion union", "union"));
    }

    #[test]
    fn test_non_ascii_boundaries() {
        assert!(!contains_phrase("éunion", "union"));
        assert!(contains_phrase("ministère union", "union"));
    }

    #[test]
    fn test_first_category_wins() {
        let m = matcher(&[("Government", &["ministry"]), ("Civilians", &["union"])]);
        assert_eq!(m.classify("union ministry"), Some(Category::Civilians));
        assert_eq!(m.classify("ministry of labour"), Some(Category::Government));
        assert_eq!(m.classify("village elders"), None);
    }

    #[test]
    fn test_every_ordered_pair_resolves_by_priority() {
        let table: Vec<(String, Vec<String>)> = PRIORITY
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str().to_string(), vec![format!("seed{i}")]))
            .collect();
        let map: BTreeMap<String, Vec<String>> = table.into_iter().collect();
        let m = PhraseMatcher::new(SeedVocabulary::from_table(&map).unwrap());

        for (i, a) in PRIORITY.iter().enumerate() {
            for (j, b) in PRIORITY.iter().enumerate() {
                if i == j {
                    continue;
                }
                let name = format!("seed{j} and seed{i}");
                let expected = if i < j { *a } else { *b };
                assert_eq!(m.classify(&name), Some(expected), "{name}");
            }
        }
    }

    #[test]
    fn test_reports_matched_phrase() {
        let m = matcher(&[("Healthcare", &["nurse", "doctors"])]);
        assert_eq!(
            m.match_name("striking doctors"),
            Some((Category::Healthcare, "doctors"))
        );
    }
}
