use serde::{Deserialize, Serialize};

/// One headword as returned by the dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<DefinitionDetail>,
}

impl Meaning {
    /// Grammatical category, `None` for anything outside noun/verb/adjective
    pub fn category(&self) -> Option<PartOfSpeech> {
        PartOfSpeech::parse(&self.part_of_speech)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionDetail {
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 3] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
    ];

    /// Case-insensitive match on the dictionary's `partOfSpeech` label
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "noun" => Some(PartOfSpeech::Noun),
            "verb" => Some(PartOfSpeech::Verb),
            "adjective" => Some(PartOfSpeech::Adjective),
            _ => None,
        }
    }
}

/// Bilingual dictionary lookup
#[async_trait::async_trait]
pub trait Dictionary: Send + Sync {
    /// e.g. "Free Dictionary API"
    fn name(&self) -> &str;

    /// Look up a word or short phrase
    async fn lookup(&self, term: &str) -> Result<Vec<DictEntry>, LookupError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("No entry for '{0}'")]
    NotFound(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
