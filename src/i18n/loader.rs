//! Translation loader and i18n management
//!
//! This module provides translation loading, language detection and message
//! formatting for user-facing notices. Translations are read from the
//! configured directory; the copies bundled into the binary are used for any
//! language whose file is missing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde_json::{Value, Map};
use tokio::fs;
use tracing::{info, warn, error, debug};
use crate::utils::errors::{AttendanceError, Result};
use crate::config::I18nConfig;

/// Translations compiled into the binary
const BUNDLED_TRANSLATIONS: &[(&str, &str)] = &[
    ("id", include_str!("../../translations/id.json")),
    ("en", include_str!("../../translations/en.json")),
];

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    /// Loaded translations by language code
    translations: HashMap<String, Map<String, Value>>,
    /// Default language code
    default_language: String,
    /// Supported language codes
    supported_languages: Vec<String>,
    /// Directory holding `<lang>.json` files
    translations_path: PathBuf,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create a new I18n instance with no translations loaded
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
            translations_path: PathBuf::from(&config.translations_path),
        }
    }

    /// Create an instance populated from the bundled translations only
    pub fn bundled(config: &I18nConfig) -> Result<Self> {
        let mut i18n = Self::new(config);
        let supported_languages = i18n.supported_languages.clone();
        for lang_code in &supported_languages {
            i18n.load_bundled(lang_code)?;
        }
        Ok(i18n)
    }

    /// Load all translation files from the translations directory
    pub async fn load_translations(&mut self) -> Result<()> {
        let translations_dir = self.translations_path.clone();

        if !translations_dir.exists() {
            debug!("Translations directory {} not found, using bundled translations", translations_dir.display());
        }

        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = translations_dir.join(format!("{}.json", lang_code));

            if file_path.exists() {
                match self.load_language_file(&file_path, lang_code).await {
                    Ok(_) => info!("Loaded translations for language: {}", lang_code),
                    Err(e) => {
                        error!("Failed to load translations for {}: {}", lang_code, e);
                        self.load_bundled(lang_code)?;
                    }
                }
            } else {
                self.load_bundled(lang_code)?;
            }
        }

        if !self.translations.contains_key(&self.default_language) {
            return Err(AttendanceError::Config(format!(
                "No translations available for default language: {}",
                self.default_language
            )));
        }

        Ok(())
    }

    /// Load a single language file
    async fn load_language_file(&mut self, file_path: &Path, lang_code: &str) -> Result<()> {
        let content = fs::read_to_string(file_path).await?;
        self.insert_translations(lang_code, &content)
    }

    /// Load the compiled-in translations for a language, if any
    fn load_bundled(&mut self, lang_code: &str) -> Result<()> {
        match BUNDLED_TRANSLATIONS.iter().find(|(code, _)| *code == lang_code) {
            Some((_, content)) => {
                debug!("Using bundled translations for {}", lang_code);
                self.insert_translations(lang_code, content)
            }
            None => {
                warn!("No translations found for language: {}", lang_code);
                Ok(())
            }
        }
    }

    fn insert_translations(&mut self, lang_code: &str, content: &str) -> Result<()> {
        match serde_json::from_str(content)? {
            Value::Object(map) => {
                debug!("Loaded {} top-level translation groups for {}", map.len(), lang_code);
                self.translations.insert(lang_code.to_string(), map);
                Ok(())
            }
            _ => Err(AttendanceError::Config(format!(
                "Invalid translation file format for {}",
                lang_code
            ))),
        }
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        let value = self
            .get_translation_value(key, effective_lang)
            .or_else(|| self.get_translation_value(key, &self.default_language));

        match value {
            Some(translation) => {
                let text = self.extract_text_from_value(translation);
                self.format_message(&text, params)
            }
            None => {
                warn!("Translation key '{}' not found in any language", key);
                key.to_string()
            }
        }
    }

    /// Get a translated message with pluralization support
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);
        let plural_key = self.get_plural_key(key, count, effective_lang);

        let mut final_params = params.cloned().unwrap_or_default();
        final_params.insert("count".to_string(), count.to_string());

        // Languages without a specific form fall back to "other"
        if self.get_translation_value(&plural_key, effective_lang).is_some() {
            self.t(&plural_key, effective_lang, Some(&final_params))
        } else {
            self.t(&format!("{}.other", key), effective_lang, Some(&final_params))
        }
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.iter().any(|l| l == lang)
    }

    /// Get the effective language (fallback to default if not supported)
    fn get_effective_language<'a>(&'a self, lang: &'a str) -> &'a str {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang
        } else {
            &self.default_language
        }
    }

    /// Get translation value from nested JSON structure
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<&Value> {
        let translations = self.translations.get(lang)?;

        // Nested keys like "scanner.expired"
        let mut parts = key.split('.');
        let mut current = translations.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }

        Some(current)
    }

    /// Extract text from JSON value (handle both strings and plural objects)
    fn extract_text_from_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Object(obj) => {
                if let Some(other) = obj.get("other") {
                    self.extract_text_from_value(other)
                } else if let Some((_, first_value)) = obj.iter().next() {
                    self.extract_text_from_value(first_value)
                } else {
                    String::new()
                }
            }
            _ => value.to_string(),
        }
    }

    /// Format message with parameters
    fn format_message(&self, template: &str, params: Option<&TranslationParams>) -> String {
        match params {
            Some(params) => {
                let mut result = template.to_string();
                for (key, value) in params {
                    let placeholder = format!("{{{}}}", key);
                    result = result.replace(&placeholder, value);
                }
                result
            }
            None => template.to_string(),
        }
    }

    /// Get the appropriate plural key based on count and language rules
    fn get_plural_key(&self, base_key: &str, count: i64, lang: &str) -> String {
        format!("{}.{}", base_key, self.get_plural_form(count, lang))
    }

    /// Determine plural form based on language-specific rules
    fn get_plural_form(&self, count: i64, lang: &str) -> &'static str {
        match lang {
            // Indonesian has no grammatical plural
            "id" => "other",
            _ => {
                if count == 1 { "one" } else { "other" }
            }
        }
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Detect the user language from a POSIX locale such as `en_US.UTF-8`
    pub fn detect_language(&self, locale: Option<&str>) -> String {
        if let Some(locale) = locale {
            let lang_code = locale
                .split(['_', '-', '.'])
                .next()
                .unwrap_or(locale)
                .to_ascii_lowercase();

            if self.is_language_supported(&lang_code) {
                return lang_code;
            }
        }

        self.default_language.clone()
    }
}
