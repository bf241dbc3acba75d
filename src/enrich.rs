//! Event record enrichment: actor categories, roles and protest motivation.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::classifier::{ClassificationCache, ClassifierResources, NameClassifier};
use crate::motivation::MotivationRule;
use crate::roles::ActorRoleTable;

/// Placeholder for an absent actor name in slot 1 or 2.
///
/// Blank names count as absent.
pub fn fill_placeholder(name: Option<&str>, slot: usize) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => format!("Unknown Actor {slot}"),
    }
}

/// One protest event as it arrives from the cleaning stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    pub event_id: String,
    #[serde(default)]
    pub date: Option<String>,
    pub actor1_name: String,
    pub actor2_name: String,
    #[serde(default)]
    pub actor1_type_code: Option<String>,
    #[serde(default)]
    pub actor2_type_code: Option<String>,
    pub event_code: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub goldstein_scale: Option<f64>,
    #[serde(default)]
    pub num_mentions: Option<u32>,
    #[serde(default)]
    pub avg_tone: Option<f64>,
}

impl EventRecord {
    /// A record with placeholder-filled actor names and no optional fields.
    pub fn new(
        event_id: impl Into<String>,
        actor1_name: Option<&str>,
        actor2_name: Option<&str>,
        event_code: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            date: None,
            actor1_name: fill_placeholder(actor1_name, 1),
            actor2_name: fill_placeholder(actor2_name, 2),
            actor1_type_code: None,
            actor2_type_code: None,
            event_code: event_code.into(),
            location: None,
            country_code: None,
            latitude: None,
            longitude: None,
            goldstein_scale: None,
            num_mentions: None,
            avg_tone: None,
        }
    }

    #[must_use]
    pub fn with_type_codes(mut self, actor1: Option<&str>, actor2: Option<&str>) -> Self {
        self.actor1_type_code = actor1.map(str::to_string);
        self.actor2_type_code = actor2.map(str::to_string);
        self
    }
}

/// An event record plus its derived attributes.
///
/// The source record is carried unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: EventRecord,
    pub primary_actor_type: Category,
    pub secondary_actor_type: Category,
    pub protest_motivation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_actor_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_actor_role: Option<String>,
}

/// Applies the memoised classifier and motivation table to records.
#[derive(Debug)]
pub struct RecordEnricher<'r> {
    classifier: NameClassifier<'r>,
    motivation: &'r MotivationRule,
    roles: Option<&'r ActorRoleTable>,
}

impl<'r> RecordEnricher<'r> {
    pub fn new(resources: &'r ClassifierResources, motivation: &'r MotivationRule) -> Self {
        Self::with_cache(resources, motivation, ClassificationCache::new())
    }

    /// Start from names already classified, e.g. by a sharded pass.
    pub fn with_cache(
        resources: &'r ClassifierResources,
        motivation: &'r MotivationRule,
        cache: ClassificationCache,
    ) -> Self {
        Self {
            classifier: NameClassifier::with_cache(resources, cache),
            motivation,
            roles: None,
        }
    }

    /// Attach role labels for records that carry actor type codes.
    #[must_use]
    pub fn with_roles(mut self, roles: &'r ActorRoleTable) -> Self {
        self.roles = Some(roles);
        self
    }

    fn role(&self, code: Option<&String>) -> Option<String> {
        let roles = self.roles?;
        code.and_then(|c| roles.label(c)).map(str::to_string)
    }

    pub fn enrich(&mut self, record: &EventRecord) -> EnrichedRecord {
        let primary = self.classifier.classify(&record.actor1_name);
        let secondary = self.classifier.classify(&record.actor2_name);
        EnrichedRecord {
            primary_actor_type: primary,
            secondary_actor_type: secondary,
            protest_motivation: self.motivation.derive(&record.event_code).to_string(),
            primary_actor_role: self.role(record.actor1_type_code.as_ref()),
            secondary_actor_role: self.role(record.actor2_type_code.as_ref()),
            record: record.clone(),
        }
    }

    /// Classify each distinct actor name once, then enrich every row.
    pub fn enrich_all(&mut self, records: &[EventRecord]) -> Vec<EnrichedRecord> {
        for name in unique_actor_names(records) {
            self.classifier.classify(name);
        }
        records.iter().map(|r| self.enrich(r)).collect()
    }

    pub fn cache(&self) -> &ClassificationCache {
        self.classifier.cache()
    }

    pub fn into_cache(self) -> ClassificationCache {
        self.classifier.into_cache()
    }
}

/// Distinct raw actor names across both slots, in first-seen order.
pub fn unique_actor_names(records: &[EventRecord]) -> Vec<&str> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    records
        .iter()
        .flat_map(|r| [r.actor1_name.as_str(), r.actor2_name.as_str()])
        .filter(|n| seen.insert(*n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::FuzzySettings;
    use crate::entity::HeuristicEntityTyper;
    use crate::gazetteer::GeoReference;
    use crate::vocabulary::{SeedVocabulary, TopRawNames};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn resources() -> ClassifierResources {
        let geo = Arc::new(GeoReference::embedded().unwrap());
        let mut seeds = BTreeMap::new();
        seeds.insert("NGO/Advocacy".to_string(), vec!["united nations".to_string()]);
        seeds.insert("Agriculture".to_string(), vec!["farmhand".to_string()]);
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

    #[test]
    fn test_fill_placeholder() {
        assert_eq!(fill_placeholder(None, 1), "Unknown Actor 1");
        assert_eq!(fill_placeholder(Some("  "), 2), "Unknown Actor 2");
        assert_eq!(fill_placeholder(Some(" Police "), 1), "Police");
    }

    #[test]
    fn test_enrich_record() {
        let r = resources();
        let motivation = MotivationRule::default();
        let mut enricher = RecordEnricher::new(&r, &motivation);

        let record = EventRecord::new("1", Some("United Nations"), Some("farmhand"), "143");
        let out = enricher.enrich(&record);
        assert_eq!(out.primary_actor_type, Category::NgoAdvocacy);
        assert_eq!(out.secondary_actor_type, Category::Agriculture);
        assert_eq!(out.protest_motivation, "Anti-Business");
        assert_eq!(out.record, record);
        assert_eq!(out.primary_actor_role, None);
    }

    #[test]
    fn test_absent_actor_is_unknown() {
        let r = resources();
        let motivation = MotivationRule::default();
        let mut enricher = RecordEnricher::new(&r, &motivation);
        let out = enricher.enrich(&EventRecord::new("2", None, Some("France"), "1411"));
        assert_eq!(out.record.actor1_name, "Unknown Actor 1");
        assert_eq!(out.primary_actor_type, Category::Unknown);
        assert_eq!(out.secondary_actor_type, Category::Government);
        assert_eq!(out.protest_motivation, "General Protest");
    }

    #[test]
    fn test_enrich_all_classifies_each_name_once() {
        let r = resources();
        let motivation = MotivationRule::default();
        let mut enricher = RecordEnricher::new(&r, &motivation);
        let records: Vec<EventRecord> = (0..50)
            .map(|i| EventRecord::new(i.to_string(), Some("FRANCE"), Some("France"), "142"))
            .collect();
        let out = enricher.enrich_all(&records);
        assert_eq!(out.len(), 50);
        assert_eq!(enricher.cache().len(), 1);
        assert!(out.iter().all(|e| e.primary_actor_type == Category::Government));
    }

    #[test]
    fn test_roles_attached() {
        let r = resources();
        let motivation = MotivationRule::default();
        let roles = ActorRoleTable::default();
        let mut enricher = RecordEnricher::new(&r, &motivation).with_roles(&roles);
        let record = EventRecord::new("3", Some("farmhand"), None, "141")
            .with_type_codes(Some("AGR"), None);
        let out = enricher.enrich(&record);
        assert_eq!(out.primary_actor_role.as_deref(), Some("Agriculture"));
        assert_eq!(out.secondary_actor_role, None);
    }

    #[test]
    fn test_unique_actor_names() {
        let records = vec![
            EventRecord::new("1", Some("A"), Some("B"), "140"),
            EventRecord::new("2", Some("B"), Some("C"), "140"),
        ];
        assert_eq!(unique_actor_names(&records), vec!["A", "B", "C"]);
    }
}
