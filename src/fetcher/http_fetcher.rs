use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};

use crate::app::Result;
use crate::config::FetchConfig;
use crate::fetcher::{parse_document, FetchError, Fetcher, RssDocument};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Self::client_builder(config).build()?;
        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client. The caller is responsible for its timeout.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client_builder(config: &FetchConfig) -> ClientBuilder {
        Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
    }

    fn network_error(url: &str, source: reqwest::Error) -> FetchError {
        FetchError::Network {
            url: url.to_string(),
            source: Box::new(source),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<RssDocument, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(url, e))?;

        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        parse_document(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const FEED: &str = r#"<rss version="2.0"><channel><title>Local</title>
<item><title>One</title><link>https://example.com/1</link></item>
</channel></rss>"#;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/rss+xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{}/feed.xml", addr), rx)
    }

    fn local_fetcher(timeout_secs: u64) -> HttpFetcher {
        let config = FetchConfig {
            timeout_secs,
            user_agent: "brook-test/1.0".into(),
        };
        let client = HttpFetcher::client_builder(&config)
            .no_proxy()
            .build()
            .unwrap();
        HttpFetcher::with_client(client)
    }

    #[test]
    fn test_new_builds_from_config() {
        assert!(HttpFetcher::new(&FetchConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_parses_document_and_identifies_itself() {
        let (url, request) = serve_once("200 OK", FEED).await;
        let fetcher = local_fetcher(5);

        let doc = fetcher.fetch(&url).await.unwrap();
        assert_eq!(doc.channel.title, "Local");
        assert_eq!(doc.channel.items.len(), 1);

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /feed.xml"));
        assert!(request.contains("user-agent: brook-test/1.0"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let (url, _request) = serve_once("404 Not Found", "").await;
        let fetcher = local_fetcher(5);

        let err = fetcher.fetch(&url).await.unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let (url, _request) = serve_once("200 OK", "<rss><channel>").await;
        let fetcher = local_fetcher(5);

        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = local_fetcher(5);
        let err = fetcher
            .fetch(&format!("http://{}/feed.xml", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let fetcher = local_fetcher(1);
        let err = fetcher
            .fetch(&format!("http://{}/feed.xml", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }
}
