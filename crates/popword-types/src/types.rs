use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub type LanguageCode = String;

/// Translated values that carry no information and are never shown
pub const SENTINEL_TRANSLATIONS: [&str; 3] = ["", " ", "."];

pub fn is_sentinel(text: &str) -> bool {
    SENTINEL_TRANSLATIONS.contains(&text)
}

/// A translation carrying no usable text: a sentinel or only whitespace
pub fn is_degenerate(text: &str) -> bool {
    is_sentinel(text) || text.trim().is_empty()
}

/// Which aggregation path serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Single machine-translation call
    #[serde(alias = "google")]
    Basic,
    /// Machine translation plus dictionary-derived meanings
    #[default]
    #[serde(alias = "chatgpt")]
    Enriched,
}

impl TranslationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationMode::Basic => "basic",
            TranslationMode::Enriched => "enriched",
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "google" => Ok(TranslationMode::Basic),
            "enriched" | "chatgpt" => Ok(TranslationMode::Enriched),
            other => Err(format!("unknown translation mode: {other}")),
        }
    }
}

/// Monotonic id assigned by the router at dispatch time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub target_language: LanguageCode,
    pub mode: TranslationMode,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        target_language: impl Into<LanguageCode>,
        mode: TranslationMode,
    ) -> Self {
        Self {
            text: text.into(),
            target_language: target_language.into(),
            mode,
        }
    }
}

/// Translated definitions grouped by part of speech.
///
/// Each list holds at most a handful of entries in dictionary order. An empty
/// list means no data was available.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeMeanings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub as_noun: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub as_verb: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub as_adjective: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_context: Vec<String>,
}

impl AlternativeMeanings {
    pub fn in_context(translation: &str) -> Self {
        Self {
            in_context: vec![translation.to_string()],
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_noun.is_empty()
            && self.as_verb.is_empty()
            && self.as_adjective.is_empty()
            && self.in_context.is_empty()
    }

    /// True when any part-of-speech list is populated
    pub fn has_categories(&self) -> bool {
        !(self.as_noun.is_empty() && self.as_verb.is_empty() && self.as_adjective.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub main_translation: String,
    #[serde(default)]
    pub alternative_meanings: AlternativeMeanings,
    #[serde(alias = "sourceService")]
    pub source_mode: TranslationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_language: Option<LanguageCode>,
}

impl TranslationResult {
    pub fn basic(main_translation: String, detected_language: Option<LanguageCode>) -> Self {
        Self {
            main_translation,
            alternative_meanings: AlternativeMeanings::default(),
            source_mode: TranslationMode::Basic,
            detected_language,
        }
    }

    /// Legacy shape where the failure message stands in for the translation
    pub fn fallback(failure: &TranslateFailure) -> Self {
        Self {
            main_translation: failure.message.clone(),
            alternative_meanings: AlternativeMeanings::default(),
            source_mode: failure.mode,
            detected_language: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unreachable endpoint or non-success status
    Network,
    /// Response did not have the expected shape
    Malformed,
    /// Backend answered with an empty or sentinel translation
    Degenerate,
    EmptyText,
    /// Cancelled because a newer request was dispatched
    Superseded,
    /// A provider panicked while serving the request
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Degenerate => "degenerate",
            ErrorKind::EmptyText => "empty_text",
            ErrorKind::Superseded => "superseded",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed translation: discriminant plus a user-facing, localized message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub mode: TranslationMode,
}

impl fmt::Display for TranslateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for TranslateFailure {}

pub type TranslationOutcome = Result<TranslationResult, TranslateFailure>;
