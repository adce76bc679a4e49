use popword_types::{RequestId, TranslationOutcome};
use tokio::sync::RwLock;

/// Most recent request as seen by a presenter opening late
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRequest {
    pub request_id: RequestId,
    /// Selection text as received, before preprocessing
    pub text: String,
    /// `None` while the request is in flight
    pub outcome: Option<TranslationOutcome>,
}

impl LastRequest {
    pub fn is_pending(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Single-slot store for the latest dispatched request.
///
/// A slot only moves forward: an older request can neither replace the text
/// nor the outcome of a newer one, whatever order they finish in.
#[derive(Default)]
pub struct LastValueCache {
    slot: RwLock<Option<LastRequest>>,
}

impl LastValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the text of a newly dispatched request
    pub async fn record_dispatch(&self, request_id: RequestId, text: &str) -> bool {
        let mut slot = self.slot.write().await;

        if slot.as_ref().is_some_and(|last| last.request_id > request_id) {
            return false;
        }

        *slot = Some(LastRequest {
            request_id,
            text: text.to_string(),
            outcome: None,
        });
        true
    }

    /// Store an outcome if it belongs to the request currently in the slot
    pub async fn record_outcome(&self, request_id: RequestId, outcome: TranslationOutcome) -> bool {
        let mut slot = self.slot.write().await;

        match slot.as_mut() {
            Some(last) if last.request_id == request_id => {
                last.outcome = Some(outcome);
                true
            }
            Some(last) => {
                tracing::debug!(
                    "discarding outcome of {}, cache holds {}",
                    request_id,
                    last.request_id
                );
                false
            }
            None => false,
        }
    }

    pub async fn snapshot(&self) -> Option<LastRequest> {
        self.slot.read().await.clone()
    }

    pub async fn last_text(&self) -> Option<String> {
        self.slot.read().await.as_ref().map(|last| last.text.clone())
    }
}
