//! Translation aggregation.
//!
//! Basic mode is a single machine-translation call. Enriched mode adds
//! translated dictionary definitions grouped by part of speech, for short
//! selections into the enrichment language only.

use std::sync::Arc;

use futures_util::future::{join_all, join3};
use popword_config::dictionary::DictionaryConfig;
use popword_config::{Config, Locale};
use popword_dictionary::{DictEntry, Dictionary, LookupError, PartOfSpeech};
use popword_translator::{AUTO_DETECT, Translator};
use popword_types::{
    AlternativeMeanings, ErrorKind, LanguageCode, TranslationMode, TranslationOutcome,
    TranslationRequest, TranslationResult, is_degenerate,
};

use crate::error;
use crate::preprocess::{DefaultPreprocessor, Preprocessor, word_count};

/// Definitions picked from dictionary entries, per part of speech
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedDefinitions {
    pub noun: Vec<String>,
    pub verb: Vec<String>,
    pub adjective: Vec<String>,
}

impl CategorizedDefinitions {
    fn slot(&mut self, pos: PartOfSpeech) -> &mut Vec<String> {
        match pos {
            PartOfSpeech::Noun => &mut self.noun,
            PartOfSpeech::Verb => &mut self.verb,
            PartOfSpeech::Adjective => &mut self.adjective,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.noun.is_empty() && self.verb.is_empty() && self.adjective.is_empty()
    }

    pub fn len(&self) -> usize {
        self.noun.len() + self.verb.len() + self.adjective.len()
    }
}

/// Walks every meaning of every entry in order and keeps the first `max`
/// definitions of each category.
pub fn categorize(entries: &[DictEntry], max: usize) -> CategorizedDefinitions {
    let mut picked = CategorizedDefinitions::default();

    for meaning in entries.iter().flat_map(|entry| &entry.meanings) {
        let Some(pos) = meaning.category() else {
            continue;
        };

        let slot = picked.slot(pos);
        let room = max.saturating_sub(slot.len());
        slot.extend(
            meaning
                .definitions
                .iter()
                .take(room)
                .map(|d| d.definition.clone()),
        );
    }

    picked
}

/// Thresholds deciding when enrichment is attempted
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub enabled: bool,
    pub language: LanguageCode,
    pub max_words: usize,
    pub max_definitions: usize,
}

impl From<&DictionaryConfig> for EnrichmentSettings {
    fn from(config: &DictionaryConfig) -> Self {
        Self {
            enabled: config.enabled,
            language: config.enrichment_lang.clone(),
            max_words: config.max_words,
            max_definitions: config.max_definitions,
        }
    }
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        (&DictionaryConfig::default()).into()
    }
}

pub struct Aggregator {
    translator: Arc<dyn Translator>,
    dictionary: Option<Arc<dyn Dictionary>>,
    settings: EnrichmentSettings,
    locale: Locale,
}

impl Aggregator {
    pub fn new(
        translator: Arc<dyn Translator>,
        dictionary: Option<Arc<dyn Dictionary>>,
        config: &Config,
    ) -> Self {
        Self::with_settings(
            translator,
            dictionary,
            (&config.dictionary).into(),
            config.locale,
        )
    }

    pub fn with_settings(
        translator: Arc<dyn Translator>,
        dictionary: Option<Arc<dyn Dictionary>>,
        settings: EnrichmentSettings,
        locale: Locale,
    ) -> Self {
        Self {
            translator,
            dictionary,
            settings,
            locale,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Serve a request with the path its mode selects
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationOutcome {
        match request.mode {
            TranslationMode::Basic => self.basic(&request.text, &request.target_language).await,
            TranslationMode::Enriched => {
                self.enriched(&request.text, &request.target_language)
                    .await
            }
        }
    }

    /// One machine-translation call with source auto-detection
    pub async fn basic(&self, text: &str, target: &str) -> TranslationOutcome {
        let text = DefaultPreprocessor.process(text);
        if text.is_empty() {
            return Err(error::failure(
                ErrorKind::EmptyText,
                TranslationMode::Basic,
                self.locale,
                None,
            ));
        }

        let translation = match self.translator.translate(&text, AUTO_DETECT, target).await {
            Ok(translation) => translation,
            Err(e) => {
                tracing::error!(
                    "{} failed for {} chars: {}",
                    self.translator.metadata().name,
                    text.len(),
                    e
                );
                return Err(error::from_translate_error(
                    &e,
                    TranslationMode::Basic,
                    self.locale,
                ));
            }
        };

        if is_degenerate(&translation.text) {
            tracing::warn!("degenerate translation {:?}", translation.text);
            return Err(error::failure(
                ErrorKind::Degenerate,
                TranslationMode::Basic,
                self.locale,
                None,
            ));
        }

        Ok(TranslationResult::basic(
            translation.text,
            translation.detected,
        ))
    }

    /// Basic translation plus categorized meanings when the selection is
    /// short enough and the target is the enrichment language.
    ///
    /// Only a failed primary translation fails the request. Dictionary and
    /// per-definition failures just leave categories empty.
    pub async fn enriched(&self, text: &str, target: &str) -> TranslationOutcome {
        let text = DefaultPreprocessor.process(text);

        let primary = self.basic(&text, target).await.map_err(|mut failure| {
            failure.mode = TranslationMode::Enriched;
            failure
        })?;

        let mut meanings = if self.is_enrichable(&text, target) {
            self.categorized_meanings(&text, target).await
        } else {
            AlternativeMeanings::default()
        };
        meanings.in_context = vec![primary.main_translation.clone()];

        Ok(TranslationResult {
            main_translation: primary.main_translation,
            alternative_meanings: meanings,
            source_mode: TranslationMode::Enriched,
            detected_language: primary.detected_language,
        })
    }

    pub fn is_enrichable(&self, text: &str, target: &str) -> bool {
        self.settings.enabled
            && self.dictionary.is_some()
            && target == self.settings.language
            && word_count(text) <= self.settings.max_words
    }

    async fn categorized_meanings(&self, text: &str, target: &str) -> AlternativeMeanings {
        let Some(dictionary) = self.dictionary.as_ref() else {
            return AlternativeMeanings::default();
        };

        let entries = match dictionary.lookup(text).await {
            Ok(entries) => entries,
            Err(LookupError::NotFound(term)) => {
                tracing::debug!("{}: no entry for '{}'", dictionary.name(), term);
                return AlternativeMeanings::default();
            }
            Err(e) => {
                tracing::warn!("{} lookup failed, skipping meanings: {}", dictionary.name(), e);
                return AlternativeMeanings::default();
            }
        };

        let picked = categorize(&entries, self.settings.max_definitions);
        tracing::debug!(
            "'{}': {} entries, {} definitions to translate",
            text,
            entries.len(),
            picked.len()
        );

        if picked.is_empty() {
            return AlternativeMeanings::default();
        }

        let (as_noun, as_verb, as_adjective) = join3(
            self.translate_definitions(&picked.noun, target),
            self.translate_definitions(&picked.verb, target),
            self.translate_definitions(&picked.adjective, target),
        )
        .await;

        AlternativeMeanings {
            as_noun,
            as_verb,
            as_adjective,
            in_context: vec![],
        }
    }

    /// Translates every definition concurrently. Output keeps input order;
    /// failed and degenerate translations are dropped.
    async fn translate_definitions(&self, definitions: &[String], target: &str) -> Vec<String> {
        let outcomes = join_all(
            definitions
                .iter()
                .map(|definition| self.translator.translate(definition, AUTO_DETECT, target)),
        )
        .await;

        outcomes
            .into_iter()
            .zip(definitions)
            .filter_map(|(outcome, definition)| match outcome {
                Ok(translation) if is_degenerate(&translation.text) => {
                    tracing::debug!("dropping degenerate translation of '{}'", definition);
                    None
                }
                Ok(translation) => Some(translation.text),
                Err(e) => {
                    tracing::warn!("definition '{}' not translated: {}", definition, e);
                    None
                }
            })
            .collect()
    }
}
