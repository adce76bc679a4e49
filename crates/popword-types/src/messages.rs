use serde::{Deserialize, Serialize};

use crate::types::{ErrorKind, RequestId, TranslateFailure, TranslationMode, TranslationResult};

/// Inbound message addressed to the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum RouterRequest {
    Translate {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<TranslationMode>,
    },
    /// Re-issue the last text under another mode
    #[serde(alias = "switchTranslationService")]
    SwitchMode { service: TranslationMode },
}

/// Outbound lifecycle notification pushed to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Notification {
    #[serde(rename = "translationStarted", rename_all = "camelCase")]
    Started {
        request_id: RequestId,
        service: TranslationMode,
    },
    #[serde(rename = "translationComplete", rename_all = "camelCase")]
    Completed {
        request_id: RequestId,
        result: TranslationResult,
    },
    #[serde(rename = "translationError", rename_all = "camelCase")]
    Failed {
        request_id: RequestId,
        error: String,
        kind: ErrorKind,
    },
}

impl Notification {
    pub fn failed(request_id: RequestId, failure: &TranslateFailure) -> Self {
        Notification::Failed {
            request_id,
            error: failure.message.clone(),
            kind: failure.kind,
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Notification::Started { request_id, .. }
            | Notification::Completed { request_id, .. }
            | Notification::Failed { request_id, .. } => *request_id,
        }
    }

    /// Completed or failed
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Started { .. })
    }
}
