//! Generic-entity fallback: coarse entity typing for names no
//! vocabulary could place.
//!
//! The typer is a capability, not a model: anything that can say
//! "geo-political entity", "organization" or "nationality/group" for a
//! string satisfies [`EntityTyper`]. The crate ships a rule-based typer.

use std::fmt;
use std::sync::Arc;

use crate::category::Category;
use crate::gazetteer::GeoReference;
use crate::phrase_match::contains_phrase;
use crate::similarity::{normalize_name, tokens};

/// Coarse entity type produced by a typer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    GeoPoliticalEntity,
    Organization,
    NationalityOrGroup,
}

impl EntityKind {
    /// Category an entity of this kind falls back to.
    pub fn category(self) -> Category {
        match self {
            EntityKind::GeoPoliticalEntity => Category::Government,
            EntityKind::Organization => Category::NgoAdvocacy,
            EntityKind::NationalityOrGroup => Category::Civilians,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::GeoPoliticalEntity => "GPE",
            EntityKind::Organization => "ORG",
            EntityKind::NationalityOrGroup => "NORP",
        })
    }
}

/// Entity typing over a raw actor name.
///
/// Implementations must be pure: the same string always yields the same
/// kind. The classifier caches by normalised name, so a typer that
/// depends on letter case would make the cache order-sensitive.
pub trait EntityTyper: Send + Sync {
    fn entity_kind(&self, raw_name: &str) -> Option<EntityKind>;
}

impl<F> EntityTyper for F
where
    F: Fn(&str) -> Option<EntityKind> + Send + Sync,
{
    fn entity_kind(&self, raw_name: &str) -> Option<EntityKind> {
        self(raw_name)
    }
}

/// A typer that never recognises anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEntityTyper;

impl EntityTyper for NoEntityTyper {
    fn entity_kind(&self, _raw_name: &str) -> Option<EntityKind> {
        None
    }
}

// High-precision organisation markers
const ORG_SUFFIX: &[&str] = &[
    "inc", "corp", "ltd", "llc", "plc", "gmbh", "co",
    "foundation", "institute", "university", "college", "academy",
    "agency", "association", "society", "council", "committee",
    "federation", "confederation", "organization", "organisation",
    "league", "network", "alliance", "front", "brigade", "commission",
    "bureau", "board", "centre", "center", "trust", "fund",
];

// Well-known acronyms, matched as whole tokens
const KNOWN_ORGS: &[&str] = &[
    "nato", "unhcr", "unicef", "unesco", "unrwa", "ocha", "wfp", "imf",
    "opec", "asean", "ecowas", "interpol", "icrc", "ifrc", "msf", "oxfam",
    "hamas", "hezbollah", "taliban", "isis", "fifa", "wto",
];

// Territorial words that mark a geo-political entity
const GPE_MARKERS: &[&str] = &[
    "city", "province", "provincial", "county", "municipality", "municipal",
    "district", "prefecture", "canton", "region", "regional", "governorate",
    "republic", "kingdom", "emirate", "sultanate", "principality", "territory",
    "borough", "township", "village council",
];

// Collective nouns for peoples and social groups
const GROUP_MARKERS: &[&str] = &[
    "people", "peoples", "tribe", "tribes", "tribal", "clan", "clans",
    "ethnic", "minority", "minorities", "community", "communities",
    "migrants", "immigrants", "refugees", "diaspora", "indigenous",
    "natives", "settlers", "kurds", "kurdish", "uyghurs", "uighurs",
    "rohingya", "tamils", "tamil", "pashtuns", "berbers", "roma",
    "sunni", "sunnis", "shia", "shiite", "shiites", "arab", "arabs",
];

/// Rule-based typer backed by the gazetteer and small marker lexicons.
///
/// Case-insensitive: it looks at the normalised name only.
#[derive(Debug, Clone)]
pub struct HeuristicEntityTyper {
    geo: Arc<GeoReference>,
}

impl HeuristicEntityTyper {
    pub fn new(geo: Arc<GeoReference>) -> Self {
        Self { geo }
    }
}

impl EntityTyper for HeuristicEntityTyper {
    fn entity_kind(&self, raw_name: &str) -> Option<EntityKind> {
        let name = normalize_name(raw_name);
        if name.is_empty() {
            return None;
        }

        if tokens(&name).any(|t| ORG_SUFFIX.contains(&t) || KNOWN_ORGS.contains(&t)) {
            return Some(EntityKind::Organization);
        }
        if GROUP_MARKERS.iter().any(|m| contains_phrase(&name, m)) {
            return Some(EntityKind::NationalityOrGroup);
        }
        if GPE_MARKERS.iter().any(|m| contains_phrase(&name, m)) || self.geo.mentions_place(&name) {
            return Some(EntityKind::GeoPoliticalEntity);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typer() -> HeuristicEntityTyper {
        HeuristicEntityTyper::new(Arc::new(GeoReference::embedded().unwrap()))
    }

    #[test]
    fn test_kind_to_category() {
        assert_eq!(EntityKind::GeoPoliticalEntity.category(), Category::Government);
        assert_eq!(EntityKind::Organization.category(), Category::NgoAdvocacy);
        assert_eq!(EntityKind::NationalityOrGroup.category(), Category::Civilians);
    }

    #[test]
    fn test_organizations() {
        let t = typer();
        assert_eq!(t.entity_kind("Acme Holdings Ltd"), Some(EntityKind::Organization));
        assert_eq!(t.entity_kind("NATO"), Some(EntityKind::Organization));
        assert_eq!(t.entity_kind("nato"), Some(EntityKind::Organization));
        assert_eq!(t.entity_kind("Sierra Club Foundation"), Some(EntityKind::Organization));
    }

    #[test]
    fn test_groups() {
        let t = typer();
        assert_eq!(t.entity_kind("Rohingya"), Some(EntityKind::NationalityOrGroup));
        assert_eq!(t.entity_kind("Kurdish minority"), Some(EntityKind::NationalityOrGroup));
    }

    #[test]
    fn test_geo_political() {
        let t = typer();
        assert_eq!(t.entity_kind("Lagos State Assembly"), Some(EntityKind::GeoPoliticalEntity));
        assert_eq!(t.entity_kind("Karachi City"), Some(EntityKind::GeoPoliticalEntity));
    }

    #[test]
    fn test_nonsense_is_untyped() {
        let t = typer();
        assert_eq!(t.entity_kind("Xqzforb123"), None);
        assert_eq!(t.entity_kind(""), None);
        assert_eq!(NoEntityTyper.entity_kind("NATO"), None);
    }

    #[test]
    fn test_closure_typer() {
        let t = |name: &str| (name == "Acme").then_some(EntityKind::Organization);
        assert_eq!(t.entity_kind("Acme"), Some(EntityKind::Organization));
        assert_eq!(t.entity_kind("acme"), None);
    }
}
