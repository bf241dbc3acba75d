//! Sharded classification: partition the distinct names, classify each
//! shard on its own cache, merge the caches in shard order.

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{info, warn};

use crate::category::Category;
use crate::classifier::{ClassificationCache, ClassifierResources, NameClassifier};
use crate::error::{Error, Result};

/// A name two shards classified differently.
///
/// Classification is pure, so any entry here points at a
/// non-deterministic matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    pub name: String,
    pub kept: Category,
    pub kept_shard: usize,
    pub rejected: Category,
    pub rejected_shard: usize,
}

/// Outcome of merging per-shard caches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub shards: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl MergeReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Union caches in index order. On conflict the lower shard wins.
pub fn merge_caches(caches: Vec<ClassificationCache>) -> (ClassificationCache, MergeReport) {
    let mut merged = ClassificationCache::new();
    let mut owner: FxHashMap<String, usize> = FxHashMap::default();
    let mut report = MergeReport {
        shards: caches.len(),
        discrepancies: Vec::new(),
    };

    for (shard, cache) in caches.into_iter().enumerate() {
        let mut entries: Vec<_> = cache.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (name, classification) in entries {
            match merged.get(name) {
                Some(existing) if existing.category != classification.category => {
                    let kept_shard = owner.get(name).copied().unwrap_or(shard);
                    warn!(
                        actor = name,
                        kept = %existing.category,
                        kept_shard,
                        rejected = %classification.category,
                        rejected_shard = shard,
                        "shards disagree on a name"
                    );
                    report.discrepancies.push(Discrepancy {
                        name: name.to_string(),
                        kept: existing.category,
                        kept_shard,
                        rejected: classification.category,
                        rejected_shard: shard,
                    });
                }
                Some(_) => {}
                None => {
                    merged.insert(name, classification.clone());
                    owner.insert(name.to_string(), shard);
                }
            }
        }
    }
    (merged, report)
}

/// Classify every distinct raw name across `shards` rayon workers.
///
/// Names are deduplicated by their raw text in first-seen order, then
/// split into contiguous chunks, one per shard. Spellings that differ
/// only in case may land in different shards; the merge checks they
/// agree.
pub fn classify_sharded<'a, I>(
    resources: &ClassifierResources,
    names: I,
    shards: usize,
) -> Result<(ClassificationCache, MergeReport)>
where
    I: IntoIterator<Item = &'a str>,
{
    if shards == 0 {
        return Err(Error::InvalidShardCount);
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let distinct: Vec<&str> = names.into_iter().filter(|n| seen.insert(*n)).collect();
    let chunk_size = distinct.len().div_ceil(shards).max(1);

    let caches: Vec<ClassificationCache> = distinct
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut classifier = NameClassifier::new(resources);
            for name in chunk {
                classifier.classify(name);
            }
            classifier.into_cache()
        })
        .collect();

    let (cache, report) = merge_caches(caches);
    info!(
        names = distinct.len(),
        shards = report.shards,
        cached = cache.len(),
        discrepancies = report.discrepancies.len(),
        "sharded classification finished"
    );
    Ok((cache, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classification, FuzzySettings, Stage};
    use crate::entity::HeuristicEntityTyper;
    use crate::gazetteer::GeoReference;
    use crate::vocabulary::{SeedVocabulary, TopRawNames};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn resources() -> ClassifierResources {
        let geo = Arc::new(GeoReference::embedded().unwrap());
        let mut seeds = BTreeMap::new();
        seeds.insert("Civilians".to_string(), vec!["protesters".to_string()]);
        seeds.insert("Government".to_string(), vec!["police".to_string()]);
        let typer = Arc::new(HeuristicEntityTyper::new(geo.clone()));
        ClassifierResources::new(
            geo,
            SeedVocabulary::from_table(&seeds).unwrap(),
            &TopRawNames::empty(),
            typer,
            FuzzySettings::default(),
        )
        .unwrap()
    }

    fn entry(category: Category) -> Classification {
        Classification {
            category,
            stage: Stage::Unmatched,
            cached: false,
        }
    }

    #[test]
    fn test_sharded_matches_sequential() {
        let r = resources();
        let names = [
            "Police", "PROTESTERS", "France", "police", "Xqzforb123", "Rohingya",
            "Unknown Actor 1", "riot police", "NATO", "Lagos",
        ];
        let mut sequential = NameClassifier::new(&r);
        for n in names {
            sequential.classify(n);
        }

        for shards in [1, 2, 3, 16] {
            let (cache, report) = classify_sharded(&r, names, shards).unwrap();
            assert!(report.is_consistent());
            assert_eq!(cache.len(), sequential.cache().len());
            for n in names {
                assert_eq!(
                    cache.get(n).map(|c| c.category),
                    sequential.cache().get(n).map(|c| c.category),
                    "{n} with {shards} shards"
                );
            }
        }
    }

    #[test]
    fn test_merge_prefers_lower_shard() {
        let mut a = ClassificationCache::new();
        a.insert("acme", entry(Category::Corporate));
        let mut b = ClassificationCache::new();
        b.insert("ACME", entry(Category::NgoAdvocacy));
        b.insert("police", entry(Category::Government));

        let (merged, report) = merge_caches(vec![a, b]);
        assert_eq!(merged.get("acme").unwrap().category, Category::Corporate);
        assert_eq!(merged.len(), 2);
        assert_eq!(
            report.discrepancies,
            vec![Discrepancy {
                name: "acme".into(),
                kept: Category::Corporate,
                kept_shard: 0,
                rejected: Category::NgoAdvocacy,
                rejected_shard: 1,
            }]
        );
    }

    #[test]
    fn test_zero_shards_rejected() {
        let r = resources();
        assert!(matches!(
            classify_sharded(&r, ["police"], 0),
            Err(Error::InvalidShardCount)
        ));
    }

    #[test]
    fn test_empty_input() {
        let r = resources();
        let (cache, report) = classify_sharded(&r, std::iter::empty(), 4).unwrap();
        assert!(cache.is_empty());
        assert!(report.is_consistent());
    }
}
