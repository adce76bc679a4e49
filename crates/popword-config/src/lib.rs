use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::dictionary::DictionaryConfig;
use self::router::RouterConfig;
use self::translator::TranslatorConfig;

pub mod dictionary;
pub mod preferences;
pub mod router;
pub mod translator;

pub use preferences::Preferences;
pub use router::OverlapPolicy;

/// Language used for user-facing error messages
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Vi,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "vi" => Ok(Locale::Vi),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub dictionary: DictionaryConfig,
    pub router: RouterConfig,

    pub locale: Locale,
}

impl Config {
    pub fn new() -> Self {
        let locale = env::var("POPWORD_LOCALE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Config {
            translator: TranslatorConfig::new(),
            dictionary: DictionaryConfig::new(),
            router: RouterConfig::new(),

            locale,
        }
    }
}
