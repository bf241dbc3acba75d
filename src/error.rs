//! Error types for reference-data loading and validation.
//!
//! Classification itself never fails: an unresolved name is `Unknown`.
//! Everything here is a startup error for the surrounding pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration and resource assembly.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal configuration error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No seed phrases were configured for any category.
    #[error("seed vocabulary is empty")]
    EmptySeedVocabulary,

    /// The geographic reference has no countries.
    #[error("geographic reference is empty")]
    EmptyGeoReference,

    /// The motivation table has no code rules.
    #[error("motivation rule table is empty")]
    EmptyMotivationTable,

    /// A configuration key names a category outside the closed set.
    #[error("unknown actor category: {0:?}")]
    UnknownCategory(String),

    /// `Unknown` is the fall-through result and cannot carry phrases.
    #[error("the Unknown category cannot be given {0}")]
    UnknownCategoryHasTerms(&'static str),

    /// Similarity thresholds live on the 0-100 scale.
    #[error("invalid threshold {value} for {field}: must be within 0..=100")]
    InvalidThreshold { field: &'static str, value: u16 },

    /// Sharded runs need at least one shard.
    #[error("shard count must be at least 1")]
    InvalidShardCount,

    /// Malformed TOML.
    #[error("parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Reference file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an I/O error bound to the file that failed.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
