//! Language slugs and language descriptors.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A sanitized language key: lower-case, restricted to `[a-z0-9_-]`, never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LangSlug(String);

impl LangSlug {
    /// Lower-case the input and strip every character outside the key charset.
    /// Returns `None` when nothing is left.
    pub fn sanitize(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
            .collect();

        (!key.is_empty()).then_some(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LangSlug {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::sanitize(&raw).ok_or_else(|| format!("invalid language key: {:?}", raw))
    }
}

impl From<LangSlug> for String {
    fn from(slug: LangSlug) -> Self {
        slug.0
    }
}

impl Borrow<str> for LangSlug {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LangSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LangSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A configured language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub slug: String,
    pub name: String,
    pub locale: String,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub flag: String,
}

/// Unvalidated language fields, as submitted or as found in storage.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInput {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub rtl: bool,
    #[serde(default)]
    pub flag: String,
}

impl Language {
    /// Validate and normalise a language. The slug must match `^[a-z-]{2,10}$` after
    /// trimming and lower-casing.
    pub fn from_input(input: LanguageInput) -> Option<Self> {
        let slug = input.slug.trim().to_lowercase();
        if !is_valid_language_slug(&slug) {
            return None;
        }

        Some(Self {
            slug,
            name: clean_text(&input.name),
            locale: clean_text(&input.locale),
            rtl: input.rtl,
            flag: clean_text(&input.flag),
        })
    }

    pub fn new(slug: &str, name: &str, locale: &str) -> Option<Self> {
        Self::from_input(LanguageInput {
            slug: slug.to_string(),
            name: name.to_string(),
            locale: locale.to_string(),
            ..LanguageInput::default()
        })
    }

    pub fn rtl(mut self) -> Self {
        self.rtl = true;
        self
    }

    /// Name to show for this language, falling back to the slug.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.slug
        } else {
            &self.name
        }
    }
}

/// The languages record: registered languages in registration order. Entries that
/// fail validation and repeated slugs are dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "Vec<Language>")]
pub struct LanguagesRecord {
    pub languages: Vec<Language>,
}

impl LanguagesRecord {
    pub fn get(&self, slug: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.slug == slug)
    }

    /// Replace the language with the same slug in place, or append it.
    pub fn upsert(&mut self, language: Language) {
        match self.languages.iter_mut().find(|l| l.slug == language.slug) {
            Some(existing) => *existing = language,
            None => self.languages.push(language),
        }
    }

    pub fn remove(&mut self, slug: &str) -> bool {
        let before = self.languages.len();
        self.languages.retain(|l| l.slug != slug);
        self.languages.len() != before
    }
}

impl From<serde_json::Value> for LanguagesRecord {
    fn from(value: serde_json::Value) -> Self {
        let raw: Vec<(Option<String>, serde_json::Value)> = match value {
            serde_json::Value::Array(items) => items.into_iter().map(|v| (None, v)).collect(),
            // Older records were keyed by slug, and the key stands in for a missing slug.
            serde_json::Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
            _ => Vec::new(),
        };

        let mut record = Self::default();
        for (key, item) in raw {
            let Ok(mut input) = serde_json::from_value::<LanguageInput>(item) else {
                continue;
            };
            if input.slug.trim().is_empty() {
                if let Some(key) = key {
                    input.slug = key;
                }
            }
            if let Some(language) = Language::from_input(input) {
                if record.get(&language.slug).is_none() {
                    record.languages.push(language);
                }
            }
        }
        record
    }
}

impl From<LanguagesRecord> for Vec<Language> {
    fn from(record: LanguagesRecord) -> Self {
        record.languages
    }
}

pub fn is_valid_language_slug(slug: &str) -> bool {
    (2..=10).contains(&slug.len()) && slug.chars().all(|c| c.is_ascii_lowercase() || c == '-')
}

fn clean_text(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_lowercases_and_strips() {
        assert_eq!(LangSlug::sanitize("FR").unwrap().as_str(), "fr");
        assert_eq!(LangSlug::sanitize(" pt-BR ").unwrap().as_str(), "pt-br");
        assert_eq!(LangSlug::sanitize("en_gb!").unwrap().as_str(), "en_gb");
        assert!(LangSlug::sanitize("").is_none());
        assert!(LangSlug::sanitize("@@").is_none());
    }

    #[test]
    fn test_language_slug_validation() {
        assert!(Language::new("en", "English", "en_US").is_some());
        assert!(Language::new(" DE ", "German", "de_DE").is_some());
        assert!(Language::new("e", "Too short", "").is_none());
        assert!(Language::new("english-long", "Too long", "").is_none());
        assert!(Language::new("en1", "Digits", "").is_none());
    }

    #[test]
    fn test_language_text_fields_are_cleaned() {
        let lang = Language::new("fr", "  French \n ", " fr_FR ").unwrap();
        assert_eq!(lang.name, "French");
        assert_eq!(lang.locale, "fr_FR");
        assert_eq!(lang.display_name(), "French");

        let unnamed = Language::new("xx", "", "").unwrap();
        assert_eq!(unnamed.display_name(), "xx");
    }

    #[test]
    fn test_languages_record_skips_invalid_entries() {
        let record: LanguagesRecord = serde_json::from_value(serde_json::json!([
            { "slug": "en", "name": "English", "locale": "en_US" },
            { "slug": "x1", "name": "Broken" },
            "garbage",
            { "slug": "EN", "name": "Duplicate" },
            { "slug": "ar", "name": "Arabic", "locale": "ar", "rtl": true }
        ]))
        .unwrap();

        let slugs: Vec<&str> = record.languages.iter().map(|l| l.slug.as_str()).collect();
        assert_eq!(slugs, vec!["en", "ar"]);
        assert_eq!(record.get("en").unwrap().name, "English");
        assert!(record.get("ar").unwrap().rtl);
    }

    #[test]
    fn test_legacy_languages_record_falls_back_to_key() {
        let record: LanguagesRecord = serde_json::from_value(serde_json::json!({
            "de": { "name": "German", "locale": "de_DE" },
            "fr": { "slug": "fr", "name": "French", "locale": "fr_FR" },
            "it": { "slug": "", "name": "Italian" },
            "bad1": { "name": "Broken" }
        }))
        .unwrap();

        let slugs: Vec<&str> = record.languages.iter().map(|l| l.slug.as_str()).collect();
        assert_eq!(slugs, vec!["de", "fr", "it"]);
        assert_eq!(record.get("de").unwrap().locale, "de_DE");
        assert_eq!(record.get("it").unwrap().name, "Italian");
    }

    #[test]
    fn test_languages_record_upsert_keeps_position() {
        let mut record = LanguagesRecord::default();
        record.upsert(Language::new("en", "English", "en_US").unwrap());
        record.upsert(Language::new("fr", "French", "fr_FR").unwrap());
        record.upsert(Language::new("en", "Anglais", "en_GB").unwrap());

        assert_eq!(record.languages[0].name, "Anglais");
        assert_eq!(record.languages.len(), 2);
        assert!(record.remove("fr"));
        assert!(!record.remove("fr"));
    }
}
