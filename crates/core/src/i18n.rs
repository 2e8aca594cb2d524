//! Translated console strings.
//!
//! Tables are embedded YAML documents keyed by language code. Keys use dot
//! notation (`errors.invalid_ai`) and values may contain `{name}` placeholders.

use std::collections::HashMap;

use leon::Template;
use log::debug;
use serde_yaml::Value;

use crate::config::DEFAULT_LANGUAGE;
use crate::error::{Error, Result};

/// Environment variable selecting the console language
pub const LANGUAGE_ENV: &str = "SPECIFY_LANG";

const EMBEDDED_TABLES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en.yml")),
    ("zh", include_str!("../locales/zh.yml")),
];

pub struct Translator {
    language: String,
    tables: HashMap<String, Value>,
}

impl Translator {
    /// Loads the embedded tables and activates `language` when a table exists
    /// for it, English otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locale`] if an embedded table is not valid YAML.
    pub fn new(language: &str) -> Result<Self> {
        let mut tables = HashMap::new();
        for (code, source) in EMBEDDED_TABLES {
            let table: Value = serde_yaml::from_str(source).map_err(|original| Error::Locale {
                language: code.to_string(),
                original,
            })?;
            tables.insert(code.to_string(), table);
        }

        let mut translator = Self {
            language: DEFAULT_LANGUAGE.to_string(),
            tables,
        };
        translator.set_language(language);
        Ok(translator)
    }

    /// Picks the language from `SPECIFY_LANG`, then `LANG`.
    pub fn detect() -> Result<Self> {
        let requested = std::env::var(LANGUAGE_ENV)
            .ok()
            .or_else(|| std::env::var("LANG").ok())
            .unwrap_or_default();
        Self::new(&language_code(&requested))
    }

    /// Switches the active language. Returns false, leaving the current
    /// language in place, when no table exists for `code`.
    pub fn set_language(&mut self, code: &str) -> bool {
        if self.tables.contains_key(code) {
            self.language = code.to_string();
            return true;
        }
        false
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn available_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.tables.keys().cloned().collect();
        languages.sort();
        languages
    }

    /// Looks up `key` and fills its placeholders from `params`.
    ///
    /// Falls back to English, then to the key itself. If interpolation fails
    /// the uninterpolated text is returned.
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(text) = self.lookup(key).and_then(Value::as_str) else {
            return key.to_string();
        };

        if params.is_empty() {
            return text.to_string();
        }

        interpolate(text, params).unwrap_or_else(|e| {
            debug!("Could not interpolate translation `{key}`: {e}");
            text.to_string()
        })
    }

    /// Looks up a list-valued entry. Missing or non-list keys yield an empty list.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.lookup(key)
            .and_then(Value::as_sequence)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        let found = self
            .tables
            .get(&self.language)
            .and_then(|table| nested_value(table, key));

        if found.is_some() || self.language == DEFAULT_LANGUAGE {
            return found;
        }

        self.tables
            .get(DEFAULT_LANGUAGE)
            .and_then(|table| nested_value(table, key))
    }
}

fn nested_value<'a>(table: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(table, |current, segment| current.get(segment))
}

fn interpolate(text: &str, params: &[(&str, &str)]) -> std::result::Result<String, String> {
    let template = Template::parse(text).map_err(|e| e.to_string())?;
    let values: HashMap<String, String> = params
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();

    template.render(&values).map_err(|e| e.to_string())
}

/// Reduces a locale such as `zh_CN.UTF-8` to its language code.
fn language_code(locale: &str) -> String {
    locale
        .split('.')
        .next()
        .unwrap_or_default()
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_lookup() {
        let translator = Translator::new("en").unwrap();
        assert_eq!(translator.t("steps.fetch", &[]), "Fetch latest release");
    }

    #[test]
    fn test_interpolation() {
        let translator = Translator::new("en").unwrap();
        assert_eq!(
            translator.t("project.directory_exists", &[("name", "demo")]),
            "Directory 'demo' already exists"
        );
    }

    #[test]
    fn test_missing_parameter_keeps_text() {
        let translator = Translator::new("en").unwrap();
        assert_eq!(
            translator.t("project.directory_exists", &[("other", "x")]),
            "Directory '{name}' already exists"
        );
    }

    #[test]
    fn test_missing_key_falls_back_to_key() {
        let translator = Translator::new("zh").unwrap();
        assert_eq!(translator.t("no.such.key", &[]), "no.such.key");
    }

    #[test]
    fn test_switching_language() {
        let mut translator = Translator::new("en").unwrap();
        assert!(translator.set_language("zh"));
        assert_eq!(translator.language(), "zh");
        assert_eq!(translator.t("steps.fetch", &[]), "获取最新版本");

        assert!(!translator.set_language("fr"));
        assert_eq!(translator.language(), "zh");
    }

    #[test]
    fn test_unknown_language_defaults_to_english() {
        let translator = Translator::new("fr").unwrap();
        assert_eq!(translator.language(), "en");
        assert_eq!(translator.available_languages(), vec!["en", "zh"]);
    }

    #[test]
    fn test_list_values() {
        let translator = Translator::new("en").unwrap();
        assert_eq!(translator.list("next_steps.claude_commands").len(), 4);
        assert!(translator.list("steps.fetch").is_empty());
    }

    #[test]
    fn test_language_code_from_locale() {
        assert_eq!(language_code("zh_CN.UTF-8"), "zh");
        assert_eq!(language_code("en-US"), "en");
        assert_eq!(language_code(""), "");
    }
}
