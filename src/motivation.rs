//! Protest motivation derived from the CAMEO event code.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Label for any code outside the rule table.
pub const DEFAULT_MOTIVATION: &str = "General Protest";

static STANDARD_RULES: &[(&str, &str)] = &[
    ("141", "Policy Change"),
    ("142", "Anti-Government"),
    ("143", "Anti-Business"),
    ("144", "Group Rights"),
    ("145", "Anti-Discrimination"),
];

/// One `code = label` row of the motivation table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodeLabel {
    pub code: String,
    pub label: String,
}

/// Ordered exact-match rules from event code to motivation label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotivationRule {
    rules: Vec<CodeLabel>,
    default_label: String,
}

impl Default for MotivationRule {
    fn default() -> Self {
        Self {
            rules: STANDARD_RULES
                .iter()
                .map(|(code, label)| CodeLabel {
                    code: code.to_string(),
                    label: label.to_string(),
                })
                .collect(),
            default_label: DEFAULT_MOTIVATION.to_string(),
        }
    }
}

impl MotivationRule {
    pub fn new(rules: Vec<CodeLabel>, default_label: impl Into<String>) -> Result<Self> {
        if rules.is_empty() {
            return Err(Error::EmptyMotivationTable);
        }
        Ok(Self {
            rules,
            default_label: default_label.into(),
        })
    }

    /// Label for `event_code`; the first rule with an equal code wins.
    ///
    /// Matching is exact after trimming, so "1411" does not fall under "141".
    pub fn derive(&self, event_code: &str) -> &str {
        let code = event_code.trim();
        self.rules
            .iter()
            .find(|r| r.code == code)
            .map_or(self.default_label.as_str(), |r| r.label.as_str())
    }

    pub fn default_label(&self) -> &str {
        &self.default_label
    }

    pub fn rules(&self) -> &[CodeLabel] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_codes() {
        let m = MotivationRule::default();
        assert_eq!(m.derive("141"), "Policy Change");
        assert_eq!(m.derive("142"), "Anti-Government");
        assert_eq!(m.derive("143"), "Anti-Business");
        assert_eq!(m.derive("144"), "Group Rights");
        assert_eq!(m.derive("145"), "Anti-Discrimination");
    }

    #[test]
    fn test_other_codes_fall_to_default() {
        let m = MotivationRule::default();
        for code in ["140", "1411", "14", "", "0141", "abc"] {
            assert_eq!(m.derive(code), "General Protest", "{code}");
        }
        assert_eq!(m.derive(" 143 "), "Anti-Business");
    }

    #[test]
    fn test_first_rule_wins() {
        let m = MotivationRule::new(
            vec![
                CodeLabel { code: "141".into(), label: "First".into() },
                CodeLabel { code: "141".into(), label: "Second".into() },
            ],
            "Other",
        )
        .unwrap();
        assert_eq!(m.derive("141"), "First");
        assert_eq!(m.derive("142"), "Other");
    }

    #[test]
    fn test_empty_table_is_fatal() {
        assert!(matches!(
            MotivationRule::new(Vec::new(), "x"),
            Err(Error::EmptyMotivationTable)
        ));
    }
}
