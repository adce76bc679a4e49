pub mod google;

pub use google::GoogleTranslator;
pub use popword_types::LanguageCode;

/// Source language value that asks the backend to detect it
pub const AUTO_DETECT: &str = "auto";

/// Translation provider interface
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    /// Translate text from source to target language
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub provider: String,
    /// Source language reported by the backend when `from` was auto
    pub detected: Option<LanguageCode>,
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub requires_api_key: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl TranslateError {
    /// Response arrived but could not be understood
    pub fn is_malformed(&self) -> bool {
        matches!(self, TranslateError::MalformedResponse(_))
    }
}
