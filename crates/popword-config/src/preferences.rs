use popword_types::{LanguageCode, TranslationMode};
use serde::{Deserialize, Serialize};

fn default_target_language() -> LanguageCode {
    "vi".to_string()
}

/// User-chosen defaults, persisted by the host and read once per request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_target_language")]
    pub default_target_language: LanguageCode,
    #[serde(rename = "defaultTranslationService", alias = "defaultMode")]
    pub default_mode: TranslationMode,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_target_language: default_target_language(),
            default_mode: TranslationMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let prefs: Preferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.default_target_language, "vi");
        assert_eq!(prefs.default_mode, TranslationMode::Enriched);
    }

    #[test]
    fn test_reads_extension_storage_keys() {
        let prefs: Preferences = serde_json::from_str(
            r#"{"defaultTargetLanguage":"fr","defaultTranslationService":"google"}"#,
        )
        .unwrap();
        assert_eq!(prefs.default_target_language, "fr");
        assert_eq!(prefs.default_mode, TranslationMode::Basic);
    }
}
