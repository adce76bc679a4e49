use popword_config::Preferences;
use popword_core::LastRequest;
use popword_types::{RequestId, RouterRequest, TranslateFailure, TranslationResult};
use serde::{Deserialize, Serialize};

/// Requests the options page and popup make to the host itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostCommand {
    GetPreferences,
    SavePreferences { preferences: Preferences },
    /// Last text and result, for a popup opened after the fact
    GetState,
}

/// Any line the host accepts on its input
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    Router(RouterRequest),
    Host(HostCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum HostReply {
    #[serde(rename_all = "camelCase")]
    Accepted { request_id: RequestId },
    Preferences { preferences: Preferences },
    PreferencesSaved,
    State { state: Option<StateView> },
    Rejected { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateView {
    pub request_id: RequestId,
    pub original_text: String,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_result: Option<TranslationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TranslateFailure>,
}

impl From<LastRequest> for StateView {
    fn from(last: LastRequest) -> Self {
        let pending = last.is_pending();
        let (translation_result, error) = match last.outcome {
            Some(Ok(result)) => (Some(result), None),
            Some(Err(failure)) => (None, Some(failure)),
            None => (None, None),
        };

        Self {
            request_id: last.request_id,
            original_text: last.text,
            pending,
            translation_result,
            error,
        }
    }
}
