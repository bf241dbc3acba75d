//! Reference vocabularies: hand-curated seed phrases and the empirical
//! "top raw names" corpus used by the fuzzy matcher.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::category::{Category, PRIORITY};
use crate::error::{Error, Result};
use crate::gazetteer::GeoReference;
use crate::phrase_match::PhraseMatcher;
use crate::similarity::normalize_name;

/// Parse a label-keyed table into per-category normalised term lists,
/// laid out in [`PRIORITY`] order.
fn category_table(
    table: &BTreeMap<String, Vec<String>>,
    what: &'static str,
) -> Result<Vec<(Category, Vec<String>)>> {
    let mut by_category: FxHashMap<Category, Vec<String>> = FxHashMap::default();
    for (label, terms) in table {
        let category: Category = label.parse()?;
        if category == Category::Unknown {
            if terms.iter().any(|t| !t.trim().is_empty()) {
                return Err(Error::UnknownCategoryHasTerms(what));
            }
            continue;
        }
        let list = by_category.entry(category).or_default();
        for term in terms {
            let term = normalize_name(term);
            if !term.is_empty() && !list.contains(&term) {
                list.push(term);
            }
        }
    }
    Ok(PRIORITY
        .iter()
        .map(|c| (*c, by_category.remove(c).unwrap_or_default()))
        .collect())
}

// ── Seed vocabulary ─────────────────────────────────────────────────

/// Ordered seed phrases per category. Immutable once built.
#[derive(Debug, Clone)]
pub struct SeedVocabulary {
    entries: Vec<(Category, Vec<String>)>,
}

impl SeedVocabulary {
    /// Build from a table keyed by category label.
    ///
    /// Fails when no category has a single phrase.
    pub fn from_table(table: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let entries = category_table(table, "seed phrases")?;
        let vocab = Self { entries };
        if vocab.is_empty() {
            return Err(Error::EmptySeedVocabulary);
        }
        Ok(vocab)
    }

    /// Categories with their phrases, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries.iter().map(|(c, p)| (*c, p.as_slice()))
    }

    pub fn phrases(&self, category: Category) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, p)| p.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of phrases across categories.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Top raw names ───────────────────────────────────────────────────

/// Frequent raw actor names per category, place names excluded.
///
/// Only the fuzzy matcher reads this table.
#[derive(Debug, Clone)]
pub struct TopRawNames {
    entries: Vec<(Category, Vec<String>)>,
}

impl TopRawNames {
    /// A table with no names; the fuzzy stage never matches against it.
    pub fn empty() -> Self {
        Self {
            entries: PRIORITY.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    /// Load a precomputed table keyed by category label.
    ///
    /// Place names are dropped here too, so a hand-edited table cannot
    /// smuggle countries into the fuzzy corpus.
    pub fn from_table(table: &BTreeMap<String, Vec<String>>, geo: &GeoReference) -> Result<Self> {
        let mut entries = category_table(table, "top names")?;
        for (_, names) in entries.iter_mut() {
            names.retain(|n| !geo.is_place(n));
        }
        Ok(Self { entries })
    }

    /// Derive the table from one frequency pass over the dataset's names.
    ///
    /// Each distinct normalised name is labelled with the phrase matcher;
    /// names it cannot label and names the gazetteer knows as places are
    /// skipped. The `per_category` most frequent survivors are kept,
    /// ties broken alphabetically.
    pub fn from_name_frequencies<'a, I>(
        names: I,
        phrases: &PhraseMatcher,
        geo: &GeoReference,
        per_category: usize,
    ) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for name in names {
            let key = normalize_name(name);
            if !key.is_empty() {
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut table = Self::empty();
        for (name, count) in ranked {
            if geo.is_place(&name) {
                continue;
            }
            let Some(category) = phrases.classify(&name) else {
                continue;
            };
            if let Some((_, list)) = table.entries.iter_mut().find(|(c, _)| *c == category) {
                if list.len() < per_category {
                    debug!(actor = %name, count, category = %category, "top raw name");
                    list.push(name);
                }
            }
        }
        table
    }

    /// Categories with their names, in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.entries.iter().map(|(c, n)| (*c, n.as_slice()))
    }

    pub fn names(&self, category: Category) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| n.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, n)| n.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
