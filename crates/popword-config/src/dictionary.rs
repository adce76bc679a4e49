use std::env;

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries".to_string()
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_enrichment_lang() -> String {
    "vi".to_string()
}

fn default_max_words() -> usize {
    3
}

fn default_max_definitions() -> usize {
    3
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct DictionaryConfig {
    /// Enriched mode falls back to context-only meanings when disabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Language of the dictionary, independent of the translation target
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    /// Only this target language gets categorized meanings
    #[serde(default = "default_enrichment_lang")]
    pub enrichment_lang: String,
    /// Longest selection, in words, that is looked up
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    /// Definitions kept per part of speech
    #[serde(default = "default_max_definitions")]
    pub max_definitions: usize,
}

impl DictionaryConfig {
    pub fn new() -> Self {
        let api_url = env::var("POPWORD_DICTIONARY_URL").unwrap_or_else(|_| default_api_url());

        let enabled = env::var("POPWORD_DICTIONARY_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_enabled);

        Self {
            enabled,
            api_url,
            ..Default::default()
        }
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_url: default_api_url(),
            source_lang: default_source_lang(),
            enrichment_lang: default_enrichment_lang(),
            max_words: default_max_words(),
            max_definitions: default_max_definitions(),
        }
    }
}
