//! Engine configuration loaded once at pipeline start.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fuzzy_match::{FuzzyScorer, DEFAULT_FUZZY_THRESHOLD};
use crate::gazetteer::GeoSettings;
use crate::motivation::{CodeLabel, MotivationRule, DEFAULT_MOTIVATION};
use crate::similarity::Score;

static EMBEDDED_CONFIG: &str = include_str!("../config/actor_taxonomy.toml");

fn default_fuzzy_threshold() -> u16 {
    u16::from(DEFAULT_FUZZY_THRESHOLD)
}

fn default_top_names_per_category() -> usize {
    25
}

fn default_shards() -> usize {
    1
}

/// `[motivation]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MotivationConfig {
    #[serde(default = "MotivationConfig::default_label")]
    pub default_label: String,
    #[serde(default)]
    pub rules: Vec<CodeLabel>,
}

impl MotivationConfig {
    fn default_label() -> String {
        DEFAULT_MOTIVATION.to_string()
    }
}

impl Default for MotivationConfig {
    fn default() -> Self {
        let standard = MotivationRule::default();
        Self {
            default_label: standard.default_label().to_string(),
            rules: standard.rules().to_vec(),
        }
    }
}

/// Reference data and tuning for one pipeline run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum fuzzy score (0-100) for the top-names stage.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u16,
    #[serde(default)]
    pub fuzzy_scorer: FuzzyScorer,
    /// How many frequent names per category feed the fuzzy stage.
    #[serde(default = "default_top_names_per_category")]
    pub top_names_per_category: usize,
    /// Worker shards for classification; 1 runs sequentially.
    #[serde(default = "default_shards")]
    pub shards: usize,
    #[serde(default)]
    pub geo: GeoSettings,
    /// Seed phrases keyed by category label.
    #[serde(default)]
    pub seeds: BTreeMap<String, Vec<String>>,
    /// Precomputed top names keyed by category label. When absent the
    /// table is derived from the dataset.
    #[serde(default)]
    pub top_names: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub motivation: MotivationConfig,
}

impl EngineConfig {
    /// The default configuration compiled into the crate.
    pub fn embedded() -> Result<Self> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine cannot run with.
    ///
    /// Category labels are checked later, when the vocabularies are built.
    pub fn validate(&self) -> Result<()> {
        if self.fuzzy_threshold > 100 {
            return Err(Error::InvalidThreshold {
                field: "fuzzy_threshold",
                value: self.fuzzy_threshold,
            });
        }
        if self.geo.fuzzy_threshold > 100 {
            return Err(Error::InvalidThreshold {
                field: "geo.fuzzy_threshold",
                value: u16::from(self.geo.fuzzy_threshold),
            });
        }
        if self.shards == 0 {
            return Err(Error::InvalidShardCount);
        }
        if self.seeds.values().all(|terms| terms.iter().all(|t| t.trim().is_empty())) {
            return Err(Error::EmptySeedVocabulary);
        }
        if self.motivation.rules.is_empty() {
            return Err(Error::EmptyMotivationTable);
        }
        Ok(())
    }

    /// Validated threshold on the score scale.
    pub fn fuzzy_threshold(&self) -> Score {
        self.fuzzy_threshold.min(100) as Score
    }

    pub fn motivation_rule(&self) -> Result<MotivationRule> {
        MotivationRule::new(
            self.motivation.rules.clone(),
            self.motivation.default_label.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_is_valid() {
        let config = EngineConfig::embedded().unwrap();
        assert_eq!(config.fuzzy_threshold(), 85);
        assert_eq!(config.fuzzy_scorer, FuzzyScorer::TokenSort);
        assert_eq!(config.shards, 1);
        assert_eq!(config.geo, GeoSettings::default());
        assert!(config.top_names.is_none());
        assert!(config.seeds["Agriculture"].iter().any(|s| s == "farmhand"));
        assert!(config.seeds["NGO/Advocacy"].iter().any(|s| s == "united nations"));
        assert_eq!(config.motivation_rule().unwrap(), MotivationRule::default());
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = EngineConfig::from_toml_str(
            r#"
            [seeds]
            "Civilians" = ["protesters"]
            "#,
        )
        .unwrap();
        assert_eq!(config.fuzzy_threshold(), 85);
        assert_eq!(config.top_names_per_category, 25);
        assert_eq!(config.motivation, MotivationConfig::default());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let err = EngineConfig::from_toml_str(
            r#"
            fuzzy_threshold = 101
            [seeds]
            "Civilians" = ["protesters"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidThreshold { value: 101, .. }));
    }

    #[test]
    fn test_missing_seeds_is_fatal() {
        let err = EngineConfig::from_toml_str("fuzzy_threshold = 80").unwrap_err();
        assert!(matches!(err, Error::EmptySeedVocabulary));
    }

    #[test]
    fn test_zero_shards_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            shards = 0
            [seeds]
            "Civilians" = ["protesters"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidShardCount));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let err = EngineConfig::from_toml_str("fuzzy_treshold = 80").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fuzzy_scorer = \"partial\"\n[seeds]\n\"Religious\" = [\"church\"]").unwrap();
        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.fuzzy_scorer, FuzzyScorer::Partial);

        let err = EngineConfig::from_path("/nonexistent/actor_taxonomy.toml").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
