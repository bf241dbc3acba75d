//! The closed set of actor categories and their fixed priority order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Semantic actor category assigned to a raw actor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Civilians,
    Government,
    #[serde(rename = "Political Party")]
    PoliticalParty,
    #[serde(rename = "NGO/Advocacy")]
    NgoAdvocacy,
    Corporate,
    Agriculture,
    Healthcare,
    #[serde(rename = "Prison Reform")]
    PrisonReform,
    #[serde(rename = "Media Reform")]
    MediaReform,
    Religious,
    Unknown,
}

/// Categories in the order phrase and fuzzy matching consult them.
///
/// Earlier entries win when a name matches more than one category.
/// `Unknown` is not listed: it is only ever the fall-through result.
pub const PRIORITY: [Category; 10] = [
    Category::Civilians,
    Category::Government,
    Category::PoliticalParty,
    Category::NgoAdvocacy,
    Category::Corporate,
    Category::Agriculture,
    Category::Healthcare,
    Category::PrisonReform,
    Category::MediaReform,
    Category::Religious,
];

impl Category {
    /// Display label written to `PrimaryActorType` / `SecondaryActorType`.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Civilians => "Civilians",
            Category::Government => "Government",
            Category::PoliticalParty => "Political Party",
            Category::NgoAdvocacy => "NGO/Advocacy",
            Category::Corporate => "Corporate",
            Category::Agriculture => "Agriculture",
            Category::Healthcare => "Healthcare",
            Category::PrisonReform => "Prison Reform",
            Category::MediaReform => "Media Reform",
            Category::Religious => "Religious",
            Category::Unknown => "Unknown",
        }
    }

    /// Position in [`PRIORITY`]; `Unknown` sorts last.
    pub fn priority(self) -> usize {
        PRIORITY
            .iter()
            .position(|c| *c == self)
            .unwrap_or(PRIORITY.len())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a display label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PRIORITY
            .iter()
            .chain(std::iter::once(&Category::Unknown))
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}
