use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Config;
use crate::constants::{
    DEFAULT_CATEGORY_KEYWORDS, DEFAULT_LANGUAGE_CODES, DEFAULT_LANGUAGE_TAG, DEFAULT_REGION_KEYWORDS,
    UNKNOWN_LANGUAGE_TAG,
};

/// A label and the keywords that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Builds owned rules from one of the static tables in `constants`
pub fn rules_from_static(table: &[(&str, &[&str])]) -> Vec<KeywordRule> {
    table
        .iter()
        .map(|(name, keywords)| KeywordRule::new(*name, keywords))
        .collect()
}

/// Ordered keyword table. Matching is substring-based on lower-cased text and
/// the first rule with any hit wins, so rule order is part of the contract.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl KeywordTable {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| KeywordRule {
                name: rule.name,
                keywords: rule
                    .keywords
                    .into_iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Name of the first rule with a keyword contained in `text`
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|rule| rule.name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }
}

/// Maps detector language codes onto the small set of output tags
#[derive(Debug, Clone)]
pub struct LanguageTable {
    codes: BTreeMap<String, String>,
    default_tag: String,
    unknown_tag: String,
}

impl LanguageTable {
    pub fn new(codes: BTreeMap<String, String>, default_tag: String, unknown_tag: String) -> Self {
        let codes = codes.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
        Self {
            codes,
            default_tag,
            unknown_tag,
        }
    }

    /// Tag for a detector result. Unmapped codes and failed detections
    /// (`None`) both land on the default tag.
    pub fn tag_for(&self, code: Option<&str>) -> &str {
        code.and_then(|c| self.codes.get(&c.to_lowercase()))
            .map(String::as_str)
            .unwrap_or(&self.default_tag)
    }

    pub fn unknown_tag(&self) -> &str {
        &self.unknown_tag
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_LANGUAGE_CODES
                .iter()
                .map(|(code, tag)| (code.to_string(), tag.to_string()))
                .collect(),
            DEFAULT_LANGUAGE_TAG.to_string(),
            UNKNOWN_LANGUAGE_TAG.to_string(),
        )
    }
}

/// All classification tables used by the enricher
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    pub regions: KeywordTable,
    pub categories: KeywordTable,
    pub languages: LanguageTable,
}

impl ClassifierRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            regions: KeywordTable::new(config.regions.clone()),
            categories: KeywordTable::new(config.categories.clone()),
            languages: LanguageTable::new(
                config.language.codes.clone(),
                config.language.default_tag.clone(),
                config.language.unknown_tag.clone(),
            ),
        }
    }
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            regions: KeywordTable::new(rules_from_static(DEFAULT_REGION_KEYWORDS)),
            categories: KeywordTable::new(rules_from_static(DEFAULT_CATEGORY_KEYWORDS)),
            languages: LanguageTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_respects_declared_order() {
        let table = KeywordTable::new(vec![
            KeywordRule::new("First", &["alpha"]),
            KeywordRule::new("Second", &["alpha", "beta"]),
        ]);
        assert_eq!(table.first_match("ALPHA and beta"), Some("First"));
        assert_eq!(table.first_match("only beta"), Some("Second"));
        assert_eq!(table.first_match("gamma"), None);
    }

    #[test]
    fn test_reordering_changes_result() {
        let forward = KeywordTable::new(vec![
            KeywordRule::new("Kuala Lumpur", &["kl"]),
            KeywordRule::new("Selangor", &["subang"]),
        ]);
        let reversed = KeywordTable::new(vec![
            KeywordRule::new("Selangor", &["subang"]),
            KeywordRule::new("Kuala Lumpur", &["kl"]),
        ]);
        let text = "kl to subang";
        assert_eq!(forward.first_match(text), Some("Kuala Lumpur"));
        assert_eq!(reversed.first_match(text), Some("Selangor"));
    }

    #[test]
    fn test_keywords_are_lowercased_on_load() {
        let table = KeywordTable::new(vec![KeywordRule::new("Penang", &["GeorgeTown"])]);
        assert_eq!(table.first_match("Lovely georgetown food"), Some("Penang"));
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let table = KeywordTable::new(vec![KeywordRule::new("Anything", &[""])]);
        assert_eq!(table.first_match("some text"), None);
    }

    #[test]
    fn test_default_tables_keep_declaration_order() {
        let rules = ClassifierRules::default();
        let regions: Vec<&str> = rules.regions.names().collect();
        assert_eq!(regions.first(), Some(&"Kuala Lumpur"));
        assert_eq!(regions.last(), Some(&"Perlis"));
        assert_eq!(regions.len(), 14);

        let categories: Vec<&str> = rules.categories.names().collect();
        assert_eq!(
            categories,
            vec!["Login", "Billing", "Network", "App", "Customer Service", "General"]
        );
    }

    #[test]
    fn test_language_table_mapping() {
        let table = LanguageTable::default();
        assert_eq!(table.tag_for(Some("ind")), "MS");
        assert_eq!(table.tag_for(Some("zlm")), "MS");
        assert_eq!(table.tag_for(Some("cmn")), "CN");
        assert_eq!(table.tag_for(Some("eng")), "EN");
        assert_eq!(table.tag_for(Some("tam")), "TA");
        assert_eq!(table.tag_for(Some("fra")), "EN");
        assert_eq!(table.tag_for(None), "EN");
        assert_eq!(table.unknown_tag(), "Unknown");
    }
}
