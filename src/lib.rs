//! Actor categorization for protest-event records.
//!
//! Each raw actor name runs through four stages, first hit wins:
//! 1. Country / demonym / subdivision recognition (always Government)
//! 2. Seed phrase matching in category priority order
//! 3. Fuzzy matching against the top raw names per category
//! 4. Generic entity typing, otherwise Unknown
//!
//! Results are memoised per normalised name. Protest motivation comes from
//! the CAMEO event code alone.

pub mod category;
pub mod classifier;
pub mod config;
pub mod enrich;
pub mod entity;
pub mod error;
pub mod fuzzy_match;
pub mod gazetteer;
pub mod motivation;
pub mod phrase_match;
pub mod pipeline;
pub mod roles;
pub mod shard;
pub mod similarity;
pub mod vocabulary;

#[cfg(feature = "python")]
mod python;

pub use category::{Category, PRIORITY};
pub use classifier::{
    Classification, ClassificationCache, ClassifierResources, FuzzySettings, NameClassifier, Stage,
};
pub use config::EngineConfig;
pub use enrich::{fill_placeholder, EnrichedRecord, EventRecord, RecordEnricher};
pub use entity::{EntityKind, EntityTyper, HeuristicEntityTyper, NoEntityTyper};
pub use error::{Error, Result};
pub use fuzzy_match::{FuzzyMatcher, FuzzyScorer};
pub use gazetteer::{GeoReference, GeoSettings, PlaceKind, PlaceMatch};
pub use motivation::{MotivationRule, DEFAULT_MOTIVATION};
pub use phrase_match::PhraseMatcher;
pub use pipeline::{ActorPipeline, RunSummary};
pub use roles::ActorRoleTable;
pub use shard::{classify_sharded, merge_caches, MergeReport};
pub use similarity::{normalize_name, Score};
pub use vocabulary::{SeedVocabulary, TopRawNames};
