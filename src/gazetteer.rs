//! Country, demonym and subdivision recognition.
//!
//! Names that denote a sovereign country, its people, or a first-level
//! administrative subdivision are force-classified as Government before
//! any phrase matching runs.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::phrase_match::contains_phrase;
use crate::similarity::{place_key, ratio, ratio_upper_bound, Score};

static EMBEDDED_GEO_REFERENCE: &str = include_str!("../config/geo_reference.toml");

/// What kind of place a name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceKind {
    Country,
    Demonym,
    Subdivision,
}

/// A recognised place name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceMatch {
    pub kind: PlaceKind,
    /// Folded reference entry that matched.
    pub entry: String,
    /// ISO alpha-3 code of the owning country.
    pub country: String,
    /// `None` for exact matches, the similarity score otherwise.
    pub score: Option<Score>,
}

/// Tolerance knobs for place-name matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeoSettings {
    /// Shorter names never match, not even exactly.
    pub min_exact_len: usize,
    /// Shorter names are only matched exactly.
    pub min_fuzzy_len: usize,
    /// Minimum `ratio` for an approximate match.
    pub fuzzy_threshold: Score,
    /// Largest length difference considered for an approximate match.
    pub max_len_delta: usize,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            min_exact_len: 3,
            min_fuzzy_len: 6,
            fuzzy_threshold: 90,
            max_len_delta: 2,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoFile {
    countries: Vec<CountryRow>,
    #[serde(default)]
    subdivisions: Vec<SubdivisionRow>,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    alpha3: String,
    name: String,
    official: Option<String>,
    common: Option<String>,
    #[serde(default)]
    demonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SubdivisionRow {
    country: String,
    names: Vec<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    kind: PlaceKind,
    country: String,
    len: usize,
}

/// Standardised geographic reference: countries, demonyms, subdivisions.
#[derive(Debug, Clone)]
pub struct GeoReference {
    entries: Vec<Entry>,
    exact: FxHashMap<String, usize>,
    settings: GeoSettings,
}

impl GeoReference {
    /// The reference table compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_GEO_REFERENCE)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: GeoFile = toml::from_str(text)?;
        if file.countries.is_empty() {
            return Err(Error::EmptyGeoReference);
        }

        let mut geo = Self {
            entries: Vec::new(),
            exact: FxHashMap::default(),
            settings: GeoSettings::default(),
        };
        for row in &file.countries {
            let names = std::iter::once(&row.name)
                .chain(row.official.iter())
                .chain(row.common.iter());
            for name in names {
                geo.insert(name, PlaceKind::Country, &row.alpha3);
            }
            for demonym in &row.demonyms {
                geo.insert(demonym, PlaceKind::Demonym, &row.alpha3);
            }
        }
        for row in &file.subdivisions {
            for name in &row.names {
                geo.insert(name, PlaceKind::Subdivision, &row.country);
            }
        }
        Ok(geo)
    }

    #[must_use]
    pub fn with_settings(mut self, settings: GeoSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> GeoSettings {
        self.settings
    }

    fn insert(&mut self, name: &str, kind: PlaceKind, country: &str) {
        let key = place_key(name);
        if key.is_empty() || self.exact.contains_key(&key) {
            return;
        }
        self.exact.insert(key.clone(), self.entries.len());
        self.entries.push(Entry {
            len: key.chars().count(),
            key,
            kind,
            country: country.to_string(),
        });
    }

    /// Number of distinct reference names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recognise `name` as a country, demonym or subdivision.
    ///
    /// Exact matches are tried first. Approximate matching only applies to
    /// names of at least `min_fuzzy_len` characters and only against
    /// entries of similar length, so short tokens never match loosely.
    /// On equal scores the entry listed first in the reference wins.
    pub fn recognize(&self, name: &str) -> Option<PlaceMatch> {
        let key = place_key(name);
        let len = key.chars().count();
        if len < self.settings.min_exact_len {
            return None;
        }

        if let Some(&idx) = self.exact.get(&key) {
            let entry = &self.entries[idx];
            return Some(PlaceMatch {
                kind: entry.kind,
                entry: entry.key.clone(),
                country: entry.country.clone(),
                score: None,
            });
        }

        if len < self.settings.min_fuzzy_len {
            return None;
        }

        let mut best: Option<(&Entry, Score)> = None;
        for entry in &self.entries {
            if entry.len < self.settings.min_fuzzy_len
                || entry.len.abs_diff(len) > self.settings.max_len_delta
                || ratio_upper_bound(entry.len, len) < self.settings.fuzzy_threshold
            {
                continue;
            }
            let score = ratio(&key, &entry.key);
            if score >= self.settings.fuzzy_threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((entry, score));
            }
        }

        best.map(|(entry, score)| PlaceMatch {
            kind: entry.kind,
            entry: entry.key.clone(),
            country: entry.country.clone(),
            score: Some(score),
        })
    }

    pub fn is_place(&self, name: &str) -> bool {
        self.recognize(name).is_some()
    }

    /// True when a reference name occurs inside `name` on word boundaries.
    ///
    /// Used by the entity typer to spot phrases like "Lagos State Assembly".
    /// Entries shorter than four characters are ignored here.
    pub fn mentions_place(&self, name: &str) -> bool {
        let key = place_key(name);
        self.entries
            .iter()
            .any(|e| e.len >= 4 && contains_phrase(&key, &e.key))
    }
}
