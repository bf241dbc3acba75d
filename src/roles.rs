//! CAMEO actor role codes (`Actor1Type1Code`, ...) to readable labels.
//!
//! Labels ride along on enriched rows for the reporting side of the
//! pipeline. They never feed into actor categorization.

use std::collections::BTreeMap;

static CAMEO_ROLES: &[(&str, &str)] = &[
    ("COP", "Police"),
    ("GOV", "Government"),
    ("INS", "Insurgents"),
    ("JUD", "Judiciary"),
    ("MIL", "Military"),
    ("OPP", "Political Opposition"),
    ("REB", "Rebels"),
    ("SEP", "Separatist Rebels"),
    ("SPY", "State Intelligence"),
    ("UAF", "Unaligned Armed Forces"),
    ("AGR", "Agriculture"),
    ("BUS", "Business"),
    ("CRM", "Criminal"),
    ("CVL", "Civilian"),
    ("DEV", "Development"),
    ("EDU", "Education"),
    ("ELI", "Elites"),
    ("ENV", "Environmental"),
    ("HLH", "Health"),
    ("HRI", "Human Rights"),
    ("LAB", "Labor"),
    ("LEG", "Legislature"),
    ("MED", "Media"),
    ("REF", "Refugees"),
    ("MOD", "Moderate"),
    ("RAD", "Radical"),
    ("AMN", "Amnesty International"),
    ("IRC", "Red Cross"),
    ("GRP", "Greenpeace"),
    ("UNO", "United Nations"),
    ("PKO", "Peacekeepers"),
    ("UIS", "Unidentified State Actor"),
    ("IGO", "Inter-Governmental Organization"),
    ("IMG", "International Militarized Group"),
    ("INT", "International/Transnational Generic"),
    ("MNC", "Multinational Corporation"),
    ("NGM", "Non-Governmental Movement"),
    ("NGO", "Non-Governmental Organization"),
    ("SET", "Settlers"),
];

/// Lookup from actor role code to label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRoleTable {
    labels: BTreeMap<String, String>,
}

impl Default for ActorRoleTable {
    fn default() -> Self {
        Self::from_pairs(CAMEO_ROLES.iter().copied())
    }
}

impl ActorRoleTable {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            labels: pairs
                .into_iter()
                .map(|(code, label)| (code.trim().to_ascii_uppercase(), label.to_string()))
                .collect(),
        }
    }

    /// Label for a code, case-insensitive. Blank codes have no label.
    pub fn label(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.labels
            .get(&code.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
