//! One pipeline run: load reference data once, classify the distinct
//! actor names, enrich every row.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::category::Category;
use crate::classifier::{ClassificationCache, ClassifierResources, FuzzySettings, NameClassifier};
use crate::config::EngineConfig;
use crate::enrich::{unique_actor_names, EnrichedRecord, EventRecord, RecordEnricher};
use crate::entity::{EntityTyper, HeuristicEntityTyper};
use crate::error::Result;
use crate::gazetteer::GeoReference;
use crate::motivation::MotivationRule;
use crate::phrase_match::PhraseMatcher;
use crate::roles::ActorRoleTable;
use crate::shard::classify_sharded;
use crate::vocabulary::{SeedVocabulary, TopRawNames};

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub unique_names: usize,
    /// Actor slots per category, both slots counted.
    pub by_category: BTreeMap<Category, usize>,
    /// Cached names per deciding stage.
    pub by_stage: BTreeMap<&'static str, usize>,
    /// Names shards disagreed on; always zero for sequential runs.
    pub discrepancies: usize,
}

/// Reference data and settings for one run, read-only once built.
#[derive(Debug)]
pub struct ActorPipeline {
    resources: ClassifierResources,
    motivation: MotivationRule,
    roles: ActorRoleTable,
    shards: usize,
}

impl ActorPipeline {
    /// Assemble the pipeline with the rule-based entity typer.
    ///
    /// `records` feed the top-raw-names frequency pass unless the config
    /// carries a precomputed table.
    pub fn build(config: &EngineConfig, geo: GeoReference, records: &[EventRecord]) -> Result<Self> {
        let geo = Arc::new(geo.with_settings(config.geo));
        let typer = Arc::new(HeuristicEntityTyper::new(geo.clone()));
        Self::assemble(config, geo, typer, record_names(records))
    }

    /// Like [`ActorPipeline::build`], with the frequency pass run over a
    /// bare list of actor names.
    pub fn build_from_names(config: &EngineConfig, geo: GeoReference, names: &[String]) -> Result<Self> {
        let geo = Arc::new(geo.with_settings(config.geo));
        let typer = Arc::new(HeuristicEntityTyper::new(geo.clone()));
        Self::assemble(config, geo, typer, names.iter().map(String::as_str))
    }

    /// Assemble the pipeline with a caller-supplied entity typer.
    pub fn build_with_typer(
        config: &EngineConfig,
        geo: GeoReference,
        typer: Arc<dyn EntityTyper>,
        records: &[EventRecord],
    ) -> Result<Self> {
        let geo = Arc::new(geo.with_settings(config.geo));
        Self::assemble(config, geo, typer, record_names(records))
    }

    fn assemble<'a>(
        config: &EngineConfig,
        geo: Arc<GeoReference>,
        typer: Arc<dyn EntityTyper>,
        names: impl Iterator<Item = &'a str>,
    ) -> Result<Self> {
        let built = Self::try_assemble(config, geo, typer, names);
        if let Err(e) = &built {
            error!(error = %e, "reference data rejected; pipeline cannot run");
        }
        built
    }

    fn try_assemble<'a>(
        config: &EngineConfig,
        geo: Arc<GeoReference>,
        typer: Arc<dyn EntityTyper>,
        names: impl Iterator<Item = &'a str>,
    ) -> Result<Self> {
        config.validate()?;
        let seeds = SeedVocabulary::from_table(&config.seeds)?;
        let top_names = match &config.top_names {
            Some(table) => TopRawNames::from_table(table, &geo)?,
            None => {
                let labeller = PhraseMatcher::new(seeds.clone());
                TopRawNames::from_name_frequencies(
                    names,
                    &labeller,
                    &geo,
                    config.top_names_per_category,
                )
            }
        };
        let fuzzy = FuzzySettings {
            threshold: config.fuzzy_threshold(),
            scorer: config.fuzzy_scorer,
        };
        let resources = ClassifierResources::new(geo, seeds, &top_names, typer, fuzzy)?;
        Ok(Self {
            resources,
            motivation: config.motivation_rule()?,
            roles: ActorRoleTable::default(),
            shards: config.shards,
        })
    }

    pub fn resources(&self) -> &ClassifierResources {
        &self.resources
    }

    pub fn motivation(&self) -> &MotivationRule {
        &self.motivation
    }

    /// A fresh memoising classifier over this run's resources.
    pub fn classifier(&self) -> NameClassifier<'_> {
        NameClassifier::new(&self.resources)
    }

    /// Classify the distinct names, then enrich each record.
    pub fn run(&self, records: &[EventRecord]) -> Result<(Vec<EnrichedRecord>, RunSummary)> {
        let names = unique_actor_names(records);
        let mut summary = RunSummary {
            rows: records.len(),
            unique_names: names.len(),
            ..RunSummary::default()
        };

        let cache = if self.shards > 1 {
            let (cache, report) = classify_sharded(&self.resources, names, self.shards)?;
            summary.discrepancies = report.discrepancies.len();
            cache
        } else {
            let mut classifier = self.classifier();
            for name in names {
                classifier.classify(name);
            }
            classifier.into_cache()
        };
        tally_stages(&cache, &mut summary);

        let mut enricher =
            RecordEnricher::with_cache(&self.resources, &self.motivation, cache).with_roles(&self.roles);
        let enriched = enricher.enrich_all(records);
        for row in &enriched {
            *summary.by_category.entry(row.primary_actor_type).or_insert(0) += 1;
            *summary.by_category.entry(row.secondary_actor_type).or_insert(0) += 1;
        }

        info!(
            rows = summary.rows,
            unique_names = summary.unique_names,
            cached = enricher.cache().len(),
            "actor enrichment finished"
        );
        Ok((enriched, summary))
    }
}

fn record_names(records: &[EventRecord]) -> impl Iterator<Item = &str> {
    records
        .iter()
        .flat_map(|r| [r.actor1_name.as_str(), r.actor2_name.as_str()])
}

fn tally_stages(cache: &ClassificationCache, summary: &mut RunSummary) {
    for (_, classification) in cache.iter() {
        *summary.by_stage.entry(classification.stage.name()).or_insert(0) += 1;
    }
}
