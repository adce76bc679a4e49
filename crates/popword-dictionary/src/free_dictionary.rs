use std::time::Duration;

use async_trait::async_trait;
use popword_config::dictionary::DictionaryConfig;
use reqwest::Url;

use crate::types::{DictEntry, Dictionary, LookupError};

/// Client for dictionaryapi.dev
#[derive(Clone)]
pub struct FreeDictionary {
    client: reqwest::Client,
    api_url: String,
    source_lang: String,
}

impl FreeDictionary {
    pub fn new(
        config: &DictionaryConfig,
        request_timeout_secs: Option<u64>,
    ) -> Result<Self, LookupError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.clone(),
            source_lang: config.source_lang.clone(),
        })
    }

    /// `{api_url}/{source_lang}/{term}` with the term percent-encoded
    fn entry_url(&self, term: &str) -> Result<Url, LookupError> {
        let mut url =
            Url::parse(&self.api_url).map_err(|e| LookupError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| LookupError::InvalidUrl(self.api_url.clone()))?
            .pop_if_empty()
            .push(&self.source_lang)
            .push(term);

        Ok(url)
    }
}

#[async_trait]
impl Dictionary for FreeDictionary {
    fn name(&self) -> &str {
        "Free Dictionary API"
    }

    async fn lookup(&self, term: &str) -> Result<Vec<DictEntry>, LookupError> {
        let url = self.entry_url(term)?;
        tracing::debug!("dictionary lookup: {}", url);

        let response = self.client.get(url).send().await?;

        if response.status() == 404 {
            return Err(LookupError::NotFound(term.to_string()));
        }

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let entries = response
            .json::<Vec<DictEntry>>()
            .await
            .map_err(|e| LookupError::InvalidFormat(e.to_string()))?;

        if entries.is_empty() {
            return Err(LookupError::NotFound(term.to_string()));
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Answers one HTTP request with `status` and `body`, yielding the
    /// request line it received
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/v2/entries", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (url, handle)
    }

    fn dictionary(api_url: &str) -> FreeDictionary {
        let config = DictionaryConfig {
            api_url: api_url.to_string(),
            ..Default::default()
        };
        FreeDictionary::new(&config, None).unwrap()
    }

    #[test]
    fn test_entry_url_encodes_phrase() {
        let dict = dictionary("https://api.dictionaryapi.dev/api/v2/entries");
        let url = dict.entry_url("give up").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.dictionaryapi.dev/api/v2/entries/en/give%20up"
        );
    }

    #[test]
    fn test_entry_url_tolerates_trailing_slash() {
        let dict = dictionary("http://localhost:8080/entries/");
        let url = dict.entry_url("cat").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/entries/en/cat");
    }

    #[test]
    fn test_entry_url_rejects_garbage() {
        let dict = dictionary("not a url");
        assert!(matches!(
            dict.entry_url("cat"),
            Err(LookupError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_parses_entries() {
        let (url, server) = serve_once(
            200,
            r#"[{"word":"cat","meanings":[{"partOfSpeech":"noun","definitions":[{"definition":"a feline"}]}]}]"#,
        )
        .await;

        let entries = dictionary(&url).lookup("cat").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "cat");
        assert_eq!(entries[0].meanings[0].definitions[0].definition, "a feline");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /api/v2/entries/en/cat "));
    }

    #[tokio::test]
    async fn test_lookup_missing_word() {
        let (url, _server) = serve_once(404, r#"{"title":"No Definitions Found"}"#).await;
        let err = dictionary(&url).lookup("zzxq").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(term) if term == "zzxq"));
    }

    #[tokio::test]
    async fn test_lookup_empty_result() {
        let (url, _server) = serve_once(200, "[]").await;
        let err = dictionary(&url).lookup("cat").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lookup_error_status() {
        let (url, _server) = serve_once(500, "").await;
        let err = dictionary(&url).lookup("cat").await.unwrap_err();
        assert!(matches!(err, LookupError::Status(500)));
    }

    #[tokio::test]
    async fn test_lookup_unreadable_body() {
        let (url, _server) = serve_once(200, "{\"oops\": true}").await;
        let err = dictionary(&url).lookup("cat").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidFormat(_)));
    }
}
