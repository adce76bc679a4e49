//! JSON-lines bridge between the extension and the router.
//!
//! One JSON message per input line. Router notifications and replies to host
//! commands are written one per output line, in the order they are produced.
//! Once input closes, output stays open until every accepted request has
//! reported completion or failure.

use std::collections::HashSet;

use kanal::{AsyncReceiver, AsyncSender};
use popword_core::{ConfigStore, Router, Subscription};
use popword_types::{Notification, RequestId};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::messages::{HostCommand, HostReply, Inbound, StateView};

/// Runs until the input closes or `cancel` fires
pub async fn run_bridge<R, W>(
    router: Router,
    input: R,
    output: W,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (line_tx, line_rx) = kanal::bounded_async::<String>(256);
    let (accepted_tx, accepted_rx) = kanal::bounded_async::<Vec<RequestId>>(1);
    // subscribe before reading so no notification of ours is missed
    let subscription = router.subscribe();
    let mut tasks = JoinSet::new();

    tasks.spawn(write_lines(output, line_rx));
    tasks.spawn(forward_notifications(
        router.clone(),
        subscription,
        line_tx.clone(),
        accepted_rx,
        cancel.clone(),
    ));
    tasks.spawn(read_requests(router, input, line_tx, accepted_tx, cancel));

    let mut result = Ok(());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("bridge task failed: {e}");
                result = Err(e);
            }
            Err(e) => {
                tracing::error!("bridge task panicked: {e}");
                result = Err(e.into());
            }
        }
    }

    result
}

async fn write_lines<W>(mut output: W, lines: AsyncReceiver<String>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Ok(line) = lines.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    tracing::debug!("output closed");
    Ok(())
}

/// Writes notifications until cancelled, or until input has closed and the
/// requests accepted before that have all finished
async fn forward_notifications(
    router: Router,
    subscription: Subscription,
    lines: AsyncSender<String>,
    accepted: AsyncReceiver<Vec<RequestId>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut finished = HashSet::new();
    // `None` while input is still open
    let mut outstanding: Option<HashSet<RequestId>> = None;

    let result = loop {
        if outstanding.as_ref().is_some_and(HashSet::is_empty) {
            tracing::debug!("all accepted requests finished");
            break Ok(());
        }

        let notification: Notification = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            ids = accepted.recv(), if outstanding.is_none() => {
                match ids {
                    Ok(ids) => {
                        let waiting: HashSet<RequestId> = ids
                            .into_iter()
                            .filter(|id| !finished.contains(id))
                            .collect();
                        tracing::debug!("input closed, waiting on {} requests", waiting.len());
                        outstanding = Some(waiting);
                        continue;
                    }
                    Err(_) => break Ok(()),
                }
            }
            received = subscription.receiver.recv() => match received {
                Ok(notification) => notification,
                Err(_) => break Ok(()),
            },
        };

        if notification.is_terminal() {
            let request_id = notification.request_id();
            match outstanding.as_mut() {
                Some(waiting) => {
                    waiting.remove(&request_id);
                }
                None => {
                    finished.insert(request_id);
                }
            }
        }

        if let Err(e) = send(&lines, &notification).await {
            break Err(e);
        }
    };

    router.unsubscribe(subscription.id);
    result
}

async fn read_requests<R>(
    router: Router,
    input: R,
    lines: AsyncSender<String>,
    accepted_ids: AsyncSender<Vec<RequestId>>,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut input = BufReader::new(input).lines();
    let mut accepted = Vec::new();

    let result = loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break Ok(()),
            line = input.next_line() => line,
        };

        match line {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => {
                let reply = handle_line(&router, &line).await;
                if let Some(HostReply::Accepted { request_id }) = &reply {
                    accepted.push(*request_id);
                }
                if let Some(reply) = reply
                    && let Err(e) = send(&lines, &reply).await
                {
                    break Err(e);
                }
            }
            Ok(None) => {
                tracing::info!("input closed");
                break Ok(());
            }
            Err(e) => break Err(e.into()),
        }
    };

    match &result {
        // let the forwarder drain what is still in flight
        Ok(()) if !cancel.is_cancelled() => {
            if accepted_ids.send(accepted).await.is_err() {
                cancel.cancel();
            }
        }
        _ => cancel.cancel(),
    }
    result
}

async fn handle_line(router: &Router, line: &str) -> Option<HostReply> {
    let inbound = match serde_json::from_str::<Inbound>(line) {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!("unreadable message: {e}");
            return Some(HostReply::Rejected {
                error: format!("unreadable message: {e}"),
            });
        }
    };

    match inbound {
        Inbound::Router(request) => match router.handle(request).await {
            Ok(request_id) => Some(HostReply::Accepted { request_id }),
            Err(e) => Some(HostReply::Rejected {
                error: e.to_string(),
            }),
        },
        Inbound::Host(command) => Some(handle_command(router, command).await),
    }
}

async fn handle_command(router: &Router, command: HostCommand) -> HostReply {
    match command {
        HostCommand::GetPreferences => match router.store().load().await {
            Ok(preferences) => HostReply::Preferences { preferences },
            Err(e) => HostReply::Rejected {
                error: e.to_string(),
            },
        },
        HostCommand::SavePreferences { preferences } => {
            match router.store().save(&preferences).await {
                Ok(()) => HostReply::PreferencesSaved,
                Err(e) => {
                    tracing::error!("failed to save preferences: {e}");
                    HostReply::Rejected {
                        error: e.to_string(),
                    }
                }
            }
        }
        HostCommand::GetState => HostReply::State {
            state: router.last_state().await.map(StateView::from),
        },
    }
}

async fn send<T: Serialize>(lines: &AsyncSender<String>, message: &T) -> anyhow::Result<()> {
    let line = serde_json::to_string(message)?;
    lines.send(line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use popword_config::Locale;
    use popword_config::router::RouterConfig;
    use popword_core::aggregator::{Aggregator, EnrichmentSettings};
    use popword_core::MemoryConfigStore;
    use popword_translator::{ProviderMetadata, TranslateError, Translation, Translator};
    use serde_json::Value;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex};
    use tokio::time::timeout;

    use super::*;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(
            &self,
            text: &str,
            from: &str,
            to: &str,
        ) -> Result<Translation, TranslateError> {
            Ok(Translation {
                text: text.to_uppercase(),
                from: from.to_string(),
                to: to.to_string(),
                provider: "upper".to_string(),
                detected: None,
            })
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "upper".to_string(),
                requires_api_key: false,
            }
        }
    }

    /// Uppercases after a short delay
    struct SlowUpper;

    #[async_trait]
    impl Translator for SlowUpper {
        async fn translate(
            &self,
            text: &str,
            from: &str,
            to: &str,
        ) -> Result<Translation, TranslateError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Upper.translate(text, from, to).await
        }

        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                name: "slow upper".to_string(),
                requires_api_key: false,
            }
        }
    }

    fn router() -> Router {
        router_with(Arc::new(Upper))
    }

    fn router_with(translator: Arc<dyn Translator>) -> Router {
        let aggregator = Aggregator::with_settings(
            translator,
            None,
            EnrichmentSettings::default(),
            Locale::En,
        );
        Router::new(
            aggregator,
            Arc::new(MemoryConfigStore::default()),
            RouterConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_translate_round_trip_over_lines() {
        let (mut client_in, bridge_in) = duplex(4096);
        let (bridge_out, client_out) = duplex(4096);
        let cancel = CancellationToken::new();

        let bridge = tokio::spawn(run_bridge(router(), bridge_in, bridge_out, cancel));
        let mut replies = BufReader::new(client_out).lines();

        client_in
            .write_all(b"{\"action\":\"translate\",\"text\":\"cat\",\"service\":\"basic\"}\n")
            .await
            .unwrap();

        let mut actions = Vec::new();
        let result = timeout(Duration::from_secs(2), async {
            loop {
                let line = replies.next_line().await.unwrap().expect("output closed");
                let message: Value = serde_json::from_str(&line).unwrap();
                actions.push(message["action"].as_str().unwrap_or_default().to_string());
                if message["action"] == "translationComplete" {
                    return message;
                }
            }
        })
        .await
        .expect("Timeout - no translation on output");

        assert_eq!(result["result"]["mainTranslation"], "CAT");
        assert_eq!(result["result"]["sourceMode"], "basic");

        client_in
            .write_all(b"{\"action\":\"getState\"}\n")
            .await
            .unwrap();
        let state = timeout(Duration::from_secs(2), async {
            loop {
                let line = replies.next_line().await.unwrap().expect("output closed");
                let message: Value = serde_json::from_str(&line).unwrap();
                actions.push(message["action"].as_str().unwrap_or_default().to_string());
                if message["action"] == "state" {
                    return message;
                }
            }
        })
        .await
        .expect("Timeout - no state on output");

        assert_eq!(state["state"]["originalText"], "cat");
        assert_eq!(state["state"]["pending"], false);
        assert_eq!(state["state"]["translationResult"]["mainTranslation"], "CAT");
        assert!(actions.contains(&"accepted".to_string()));
        assert!(actions.contains(&"translationStarted".to_string()));

        drop(client_in);
        timeout(Duration::from_secs(2), bridge)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_input_still_gets_results() {
        let (mut client_in, bridge_in) = duplex(4096);
        let (bridge_out, client_out) = duplex(4096);

        let bridge = tokio::spawn(run_bridge(
            router_with(Arc::new(SlowUpper)),
            bridge_in,
            bridge_out,
            CancellationToken::new(),
        ));

        client_in
            .write_all(b"{\"action\":\"translate\",\"text\":\"cat\",\"service\":\"basic\"}\n")
            .await
            .unwrap();
        drop(client_in);

        let mut replies = BufReader::new(client_out).lines();
        let actions = timeout(Duration::from_secs(2), async {
            let mut actions = Vec::new();
            while let Some(line) = replies.next_line().await.unwrap() {
                let message: Value = serde_json::from_str(&line).unwrap();
                actions.push(message["action"].as_str().unwrap_or_default().to_string());
            }
            actions
        })
        .await
        .expect("Timeout - output never closed");

        assert!(actions.contains(&"accepted".to_string()));
        assert!(actions.contains(&"translationStarted".to_string()));
        assert_eq!(actions.last().map(String::as_str), Some("translationComplete"));

        timeout(Duration::from_secs(2), bridge)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_bad_lines_are_rejected() {
        let router = router();

        let reply = handle_line(&router, "not json").await.unwrap();
        assert!(matches!(reply, HostReply::Rejected { .. }));

        let reply = handle_line(&router, r#"{"action":"switchMode","service":"basic"}"#)
            .await
            .unwrap();
        assert_eq!(
            reply,
            HostReply::Rejected {
                error: "No previous text to translate again".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_preferences_commands() {
        let router = router();

        let reply = handle_line(
            &router,
            r#"{"action":"savePreferences","preferences":{"defaultTargetLanguage":"de","defaultTranslationService":"basic"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(reply, HostReply::PreferencesSaved);

        match handle_line(&router, r#"{"action":"getPreferences"}"#).await {
            Some(HostReply::Preferences { preferences }) => {
                assert_eq!(preferences.default_target_language, "de");
            }
            other => panic!("Wrong reply: {:?}", other),
        }
    }
}
