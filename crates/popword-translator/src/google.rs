use std::time::Duration;

use async_trait::async_trait;
use popword_config::translator::TranslatorConfig;
use serde_json::Value;

use crate::{ProviderMetadata, TranslateError, Translation, Translator};

/// Client for the keyless Google Translate endpoint
#[derive(Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
    client_id: String,
    data_type: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslateError> {
        let mut builder = reqwest::Client::builder().user_agent("Mozilla/5.0");
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.clone(),
            client_id: config.client.clone(),
            data_type: config.data_type.clone(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> Result<Translation, TranslateError> {
        let params = [
            ("client", self.client_id.as_str()),
            ("sl", from),
            ("tl", to),
            ("dt", self.data_type.as_str()),
            ("q", text),
        ];

        let response = self.client.get(&self.api_url).query(&params).send().await?;

        if response.status() == 429 {
            return Err(TranslateError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            return Err(TranslateError::Status(response.status().as_u16()));
        }

        let json: Value = response.json().await.map_err(|e| {
            TranslateError::MalformedResponse(format!("Failed to parse response: {}", e))
        })?;

        let (text, detected) = parse_response(&json)?;
        tracing::debug!(
            "translated {} chars to '{}' (detected: {:?})",
            text.len(),
            to,
            detected
        );

        Ok(Translation {
            text,
            from: from.to_string(),
            to: to.to_string(),
            provider: "google".to_string(),
            detected,
        })
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "Google Translate".to_string(),
            requires_api_key: false,
        }
    }
}

/// Joins the translated segments of a response and picks up the detected
/// source language.
///
/// The body looks like `[[["xin chào", "hello", ...], ...], null, "en", ...]`.
/// Segments without a string in first position are skipped.
pub fn parse_response(json: &Value) -> Result<(String, Option<String>), TranslateError> {
    let segments = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::MalformedResponse("No segments in response".to_string()))?;

    let text = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect::<String>();

    let detected = json.get(2).and_then(Value::as_str).map(str::to_string);

    Ok((text, detected))
}
