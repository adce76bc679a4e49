use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use kanal::{AsyncReceiver, AsyncSender};
use popword_config::Preferences;
use popword_config::router::{OverlapPolicy, RouterConfig};
use popword_types::{
    ErrorKind, Notification, RequestId, RouterRequest, TranslationMode, TranslationOutcome,
    TranslationRequest, TranslationResult,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::error;
use crate::state::{LastRequest, LastValueCache};
use crate::store::ConfigStore;

/// Live feed of router notifications for one subscriber
pub struct Subscription {
    pub id: Uuid,
    pub receiver: AsyncReceiver<Notification>,
}

#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("Nothing to translate")]
    EmptyText,

    #[error("No previous text to translate again")]
    NothingToSwitch,
}

/// Resolves the mode of each request, runs it on its own task and pushes
/// lifecycle notifications to subscribers.
///
/// Every request publishes `Started` followed by exactly one of `Completed`
/// or `Failed`.
#[derive(Clone)]
pub struct Router {
    inner: Arc<Inner>,
}

struct Inner {
    aggregator: Aggregator,
    store: Arc<dyn ConfigStore>,
    config: RouterConfig,
    next_id: AtomicU64,
    cache: LastValueCache,
    subscribers: Mutex<Vec<(Uuid, AsyncSender<Notification>)>>,
    in_flight: Mutex<Option<(RequestId, CancellationToken)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Router {
    pub fn new(aggregator: Aggregator, store: Arc<dyn ConfigStore>, config: RouterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                aggregator,
                store,
                config,
                next_id: AtomicU64::new(0),
                cache: LastValueCache::new(),
                subscribers: Mutex::new(Vec::new()),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.inner.store
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = kanal::unbounded_async();
        let id = Uuid::new_v4();
        lock(&self.inner.subscribers).push((id, tx));
        tracing::debug!("subscriber {} attached", id);

        Subscription { id, receiver: rx }
    }

    /// Subscribe and read the last known state in one go
    pub async fn subscribe_with_state(&self) -> (Subscription, Option<LastRequest>) {
        let subscription = self.subscribe();
        let state = self.inner.cache.snapshot().await;
        (subscription, state)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let mut subscribers = lock(&self.inner.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(subscriber, _)| *subscriber != id);
        before != subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }

    pub async fn last_state(&self) -> Option<LastRequest> {
        self.inner.cache.snapshot().await
    }

    pub async fn handle(&self, request: RouterRequest) -> Result<RequestId, RouterError> {
        match request {
            RouterRequest::Translate { text, service } => self.translate(&text, service).await,
            RouterRequest::SwitchMode { service } => self.switch_mode(service).await,
        }
    }

    /// Dispatch a translation and return without waiting for it.
    ///
    /// Without an explicit mode the stored default is used.
    pub async fn translate(
        &self,
        text: &str,
        mode: Option<TranslationMode>,
    ) -> Result<RequestId, RouterError> {
        if text.trim().is_empty() {
            return Err(RouterError::EmptyText);
        }

        let request_id = RequestId(self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.inner.cache.record_dispatch(request_id, text).await;
        let token = self.begin(request_id);

        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        tokio::spawn(async move { inner.run(request_id, text, mode, token).await });

        Ok(request_id)
    }

    /// Translate the last text again under another mode
    pub async fn switch_mode(&self, mode: TranslationMode) -> Result<RequestId, RouterError> {
        let Some(text) = self.inner.cache.last_text().await else {
            tracing::warn!("switch to {} requested with no previous text", mode);
            return Err(RouterError::NothingToSwitch);
        };

        self.translate(&text, Some(mode)).await
    }

    fn begin(&self, request_id: RequestId) -> CancellationToken {
        let token = CancellationToken::new();
        if self.inner.config.overlap_policy != OverlapPolicy::Supersede {
            return token;
        }

        let mut in_flight = lock(&self.inner.in_flight);

        // a newer request got here first
        if in_flight
            .as_ref()
            .is_some_and(|(current, _)| *current > request_id)
        {
            token.cancel();
            return token;
        }

        if let Some((previous, previous_token)) = in_flight.replace((request_id, token.clone())) {
            tracing::debug!("{} supersedes {}", request_id, previous);
            previous_token.cancel();
        }

        token
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl Inner {
    async fn run(
        self: Arc<Self>,
        request_id: RequestId,
        text: String,
        explicit_mode: Option<TranslationMode>,
        token: CancellationToken,
    ) {
        let preferences = match self.store.load().await {
            Ok(preferences) => preferences,
            Err(e) => {
                tracing::warn!("failed to load preferences, using defaults: {}", e);
                Preferences::default()
            }
        };

        let mode = explicit_mode.unwrap_or(preferences.default_mode);
        tracing::info!(
            "{} started: {} mode, target '{}'",
            request_id,
            mode,
            preferences.default_target_language
        );
        self.publish(Notification::Started {
            request_id,
            service: mode,
        });

        let request = TranslationRequest::new(text, preferences.default_target_language, mode);
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(error::failure(
                ErrorKind::Superseded,
                mode,
                self.aggregator.locale(),
                None,
            )),
            outcome = AssertUnwindSafe(self.aggregator.translate(&request)).catch_unwind() => {
                outcome.unwrap_or_else(|panic| {
                    tracing::error!("{} panicked: {}", request_id, panic_message(&*panic));
                    Err(error::failure(
                        ErrorKind::Internal,
                        mode,
                        self.aggregator.locale(),
                        None,
                    ))
                })
            }
        };
        let outcome = self.present(outcome);

        // cache before publishing so a subscriber reacting to the
        // notification reads the same outcome back
        self.cache.record_outcome(request_id, outcome.clone()).await;
        self.finish(request_id);

        let notification = match outcome {
            Ok(result) => {
                tracing::info!("{} completed ({})", request_id, result.source_mode);
                Notification::Completed { request_id, result }
            }
            Err(failure) => {
                tracing::warn!("{} failed: {}", request_id, failure);
                Notification::failed(request_id, &failure)
            }
        };
        self.publish(notification);
    }

    /// Applies the legacy inline-error setting
    fn present(&self, outcome: TranslationOutcome) -> TranslationOutcome {
        match outcome {
            Err(failure)
                if self.config.legacy_inline_errors && failure.kind != ErrorKind::Superseded =>
            {
                Ok(TranslationResult::fallback(&failure))
            }
            outcome => outcome,
        }
    }

    fn finish(&self, request_id: RequestId) {
        let mut in_flight = lock(&self.in_flight);
        if in_flight
            .as_ref()
            .is_some_and(|(current, _)| *current == request_id)
        {
            *in_flight = None;
        }
    }

    fn publish(&self, notification: Notification) {
        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|(id, sender)| match sender.try_send(notification.clone()) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("dropping subscriber {}: {}", id, e);
                false
            }
        });
    }
}
