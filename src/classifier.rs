//! Name classifier: country → phrase → fuzzy → entity fallback, memoised
//! per normalised name.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::entity::{EntityKind, EntityTyper};
use crate::error::{Error, Result};
use crate::fuzzy_match::{FuzzyMatcher, FuzzyScorer};
use crate::gazetteer::{GeoReference, PlaceKind};
use crate::phrase_match::PhraseMatcher;
use crate::similarity::{normalize_name, Score};
use crate::vocabulary::{SeedVocabulary, TopRawNames};

// "Unknown Actor 1", "unknown actor", ... as filled in for absent names
static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^unknown actor(?: \d+)?$").unwrap());

/// The stage that decided a name's category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Empty name or an "Unknown Actor N" placeholder.
    Placeholder,
    /// Recognised as a country, demonym or subdivision.
    Country { kind: PlaceKind, entry: String },
    /// Contained a seed phrase.
    Phrase { phrase: String },
    /// Close to a top raw name.
    Fuzzy { candidate: String, score: Score },
    /// Typed by the entity recognizer.
    Entity(EntityKind),
    /// Nothing matched.
    Unmatched,
}

impl Stage {
    /// Short stage name for summaries and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Placeholder => "placeholder",
            Stage::Country { .. } => "country",
            Stage::Phrase { .. } => "phrase",
            Stage::Fuzzy { .. } => "fuzzy",
            Stage::Entity(_) => "entity",
            Stage::Unmatched => "unmatched",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Country { entry, .. } => write!(f, "country({entry})"),
            Stage::Phrase { phrase } => write!(f, "phrase({phrase})"),
            Stage::Fuzzy { candidate, score } => write!(f, "fuzzy({candidate}, {score})"),
            Stage::Entity(kind) => write!(f, "entity({kind})"),
            other => f.write_str(other.name()),
        }
    }
}

/// A category together with the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub stage: Stage,
    /// Served from the cache rather than computed by this call.
    pub cached: bool,
}

impl Classification {
    fn computed(category: Category, stage: Stage) -> Self {
        Self {
            category,
            stage,
            cached: false,
        }
    }
}

/// Fuzzy-stage settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzySettings {
    pub threshold: Score,
    pub scorer: FuzzyScorer,
}

impl Default for FuzzySettings {
    fn default() -> Self {
        Self {
            threshold: crate::fuzzy_match::DEFAULT_FUZZY_THRESHOLD,
            scorer: FuzzyScorer::default(),
        }
    }
}

/// Immutable reference data consulted by every classification.
///
/// Built once per pipeline run and shared read-only across workers.
pub struct ClassifierResources {
    geo: Arc<GeoReference>,
    phrases: PhraseMatcher,
    fuzzy: FuzzyMatcher,
    typer: Arc<dyn EntityTyper>,
}

impl fmt::Debug for ClassifierResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierResources")
            .field("geo_entries", &self.geo.len())
            .field("seed_phrases", &self.phrases.seeds().len())
            .field("top_names", &self.fuzzy.len())
            .field("fuzzy_threshold", &self.fuzzy.threshold())
            .finish()
    }
}

impl ClassifierResources {
    pub fn new(
        geo: Arc<GeoReference>,
        seeds: SeedVocabulary,
        top_names: &TopRawNames,
        typer: Arc<dyn EntityTyper>,
        fuzzy: FuzzySettings,
    ) -> Result<Self> {
        if geo.is_empty() {
            return Err(Error::EmptyGeoReference);
        }
        if seeds.is_empty() {
            return Err(Error::EmptySeedVocabulary);
        }
        if top_names.is_empty() {
            warn!("top raw names table is empty; fuzzy matching disabled");
        }
        let fuzzy = FuzzyMatcher::new(top_names, fuzzy.threshold, fuzzy.scorer)?;
        info!(
            geo_entries = geo.len(),
            seed_phrases = seeds.len(),
            top_names = fuzzy.len(),
            fuzzy_threshold = fuzzy.threshold(),
            "classifier resources ready"
        );
        Ok(Self {
            geo,
            phrases: PhraseMatcher::new(seeds),
            fuzzy,
            typer,
        })
    }

    pub fn geo(&self) -> &GeoReference {
        &self.geo
    }

    pub fn phrases(&self) -> &PhraseMatcher {
        &self.phrases
    }

    pub fn fuzzy(&self) -> &FuzzyMatcher {
        &self.fuzzy
    }

    /// Run every stage for `raw_name` without consulting any cache.
    ///
    /// A pure function of the name for fixed resources.
    pub fn classify_uncached(&self, raw_name: &str) -> Classification {
        let name = normalize_name(raw_name);
        if name.is_empty() || PLACEHOLDER_PATTERN.is_match(&name) {
            return Classification::computed(Category::Unknown, Stage::Placeholder);
        }

        if let Some(place) = self.geo.recognize(&name) {
            return Classification::computed(
                Category::Government,
                Stage::Country {
                    kind: place.kind,
                    entry: place.entry,
                },
            );
        }

        if let Some((category, phrase)) = self.phrases.match_name(&name) {
            return Classification::computed(
                category,
                Stage::Phrase {
                    phrase: phrase.to_string(),
                },
            );
        }

        if let Some(hit) = self.fuzzy.match_name(&name) {
            return Classification::computed(
                hit.category,
                Stage::Fuzzy {
                    candidate: hit.candidate.to_string(),
                    score: hit.score,
                },
            );
        }

        if let Some(kind) = self.typer.entity_kind(raw_name) {
            return Classification::computed(kind.category(), Stage::Entity(kind));
        }

        Classification::computed(Category::Unknown, Stage::Unmatched)
    }
}

/// Normalised name → classification, grown monotonically during a run.
#[derive(Debug, Clone, Default)]
pub struct ClassificationCache {
    entries: FxHashMap<String, Classification>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a raw or normalised name.
    pub fn get(&self, name: &str) -> Option<&Classification> {
        self.entries.get(&normalize_name(name))
    }

    /// Store a result under the normalised form of `name`.
    ///
    /// Returns the previous entry if there was one.
    pub fn insert(&mut self, name: &str, classification: Classification) -> Option<Classification> {
        self.entries.insert(normalize_name(name), classification)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries keyed by normalised name, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Classification)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Memoising classifier over shared [`ClassifierResources`].
#[derive(Debug)]
pub struct NameClassifier<'r> {
    resources: &'r ClassifierResources,
    cache: ClassificationCache,
}

impl<'r> NameClassifier<'r> {
    pub fn new(resources: &'r ClassifierResources) -> Self {
        Self::with_cache(resources, ClassificationCache::new())
    }

    /// Resume from a cache built earlier in the same run.
    pub fn with_cache(resources: &'r ClassifierResources, cache: ClassificationCache) -> Self {
        Self { resources, cache }
    }

    pub fn resources(&self) -> &'r ClassifierResources {
        self.resources
    }

    pub fn classify(&mut self, raw_name: &str) -> Category {
        self.classify_traced(raw_name).category
    }

    /// Classify and report which stage decided.
    ///
    /// Unknown results are cached as well, so an unmatched name never
    /// reaches the fuzzy stage twice.
    pub fn classify_traced(&mut self, raw_name: &str) -> Classification {
        let key = normalize_name(raw_name);
        if let Some(hit) = self.cache.entries.get(&key) {
            return Classification {
                cached: true,
                ..hit.clone()
            };
        }

        let result = self.resources.classify_uncached(raw_name);
        debug!(actor = %key, category = %result.category, stage = %result.stage, "classified");
        self.cache.entries.insert(key, result.clone());
        result
    }

    pub fn cache(&self) -> &ClassificationCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn into_cache(self) -> ClassificationCache {
        self.cache
    }
}
