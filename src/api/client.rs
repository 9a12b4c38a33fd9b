use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::models::ClientConfig;
use crate::domain::Credentials;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {code}: {reason}")]
    Status { code: u16, reason: String },

    #[error("HTTP request failed: {0}")]
    RequestError(reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Response body, delivered chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Transport capability used by the batch fetcher.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Authenticated GET. Fails on connection errors, timeouts and non-2xx statuses.
    async fn fetch(&self, url: &str, credentials: &Credentials) -> Result<ByteStream>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if !config.verify_tls {
            warn!("TLS certificate verification is disabled");
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::RequestError(e)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, credentials: &Credentials) -> Result<ByteStream> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!(url, "Starting fetch");

        let response = self
            .client
            .get(target)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        debug!(url, content_length = ?response.content_length(), "Response received");

        Ok(response.bytes_stream().map_err(classify).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("alice", "secret")
    }

    async fn read_body(stream: ByteStream) -> Vec<u8> {
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_fetch_sends_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/page.html")
            .match_header("authorization", "Basic YWxpY2U6c2VjcmV0")
            .with_status(200)
            .with_body("<html>hello</html>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(ClientConfig::default()).unwrap();
        let url = format!("{}/page.html", server.url());
        let stream = fetcher.fetch(&url, &credentials()).await.unwrap();

        assert_eq!(read_body(stream).await, b"<html>hello</html>".to_vec());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_fails_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(ClientConfig::default()).unwrap();
        let url = format!("{}/missing", server.url());
        match fetcher.fetch(&url, &credentials()).await {
            Err(FetchError::Status { code, .. }) => assert_eq!(code, 404),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("expected a status error"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_unparsable_url() {
        let fetcher = HttpFetcher::new(ClientConfig::default()).unwrap();
        let result = fetcher.fetch("no scheme here", &credentials()).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let fetcher = HttpFetcher::new(ClientConfig::default()).unwrap();
        let url = format!("http://127.0.0.1:{}/page.html", port);
        let result = fetcher.fetch(&url, &credentials()).await;
        assert!(matches!(result, Err(FetchError::Connect(_))));
    }

    #[tokio::test]
    async fn test_silent_server_is_timeout() {
        // accepts the connection but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            drop(socket);
        });

        let config = ClientConfig {
            request_timeout_secs: 1,
            ..ClientConfig::default()
        };
        let fetcher = HttpFetcher::new(config).unwrap();
        let url = format!("http://{}/slow.html", addr);
        let result = fetcher.fetch(&url, &credentials()).await;

        assert!(matches!(result, Err(FetchError::Timeout)));
        server.abort();
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert!(config.verify_tls);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.user_agent.starts_with("simple-html-downloader/"));
    }

    #[test]
    fn test_insecure_client_builds() {
        let config = ClientConfig {
            verify_tls: false,
            ..ClientConfig::default()
        };
        assert!(HttpFetcher::new(config).is_ok());
    }
}
