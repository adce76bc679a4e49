use std::env;

use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_client() -> String {
    "gtx".to_string()
}

fn default_data_type() -> String {
    "t".to_string()
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Value of the `client` query parameter
    #[serde(default = "default_client")]
    pub client: String,
    /// Value of the `dt` query parameter, `t` asks for plain translated segments
    #[serde(default = "default_data_type")]
    pub data_type: String,
    /// No timeout when unset
    pub request_timeout_secs: Option<u64>,
}

impl TranslatorConfig {
    pub fn new() -> Self {
        let api_url = env::var("POPWORD_TRANSLATE_URL").unwrap_or_else(|_| default_api_url());

        let request_timeout_secs = env::var("POPWORD_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok());

        Self {
            api_url,
            request_timeout_secs,
            ..Default::default()
        }
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            client: default_client(),
            data_type: default_data_type(),
            request_timeout_secs: None,
        }
    }
}
