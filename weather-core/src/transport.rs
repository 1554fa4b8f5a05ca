use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::{fmt::Debug, time::Duration};

use crate::error::ProviderError;

/// Applied to every provider request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes a single GET against the provider and hands back the JSON body.
///
/// The client builds URLs and query strings; implementations only move bytes.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<Value, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<Value, ProviderError> {
        tracing::debug!(url, "sending provider request");

        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "provider request failed");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serve one canned HTTP response on a local port; returns the URL.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/weather")
    }

    fn local_transport() -> HttpTransport {
        let http = Client::builder().no_proxy().timeout(REQUEST_TIMEOUT).build().unwrap();
        HttpTransport { http }
    }

    #[tokio::test]
    async fn non_success_status_becomes_status_error() {
        let body = format!("city not found {}", "x".repeat(300));
        let url = serve_once("404 Not Found", body).await;

        let err = local_transport()
            .get(&url, &[("q", "Atlantis".to_string())])
            .await
            .unwrap_err();

        let (status, body) = match err {
            ProviderError::Status { status, body } => (status, body),
            other => panic!("expected status error, got {other:?}"),
        };
        assert_eq!(status, 404);
        assert!(body.starts_with("city not found"));
        assert!(body.ends_with("..."));
        assert_eq!(body.chars().count(), 203);
    }

    #[tokio::test]
    async fn non_json_body_becomes_malformed_error() {
        let url = serve_once("200 OK", "not json".to_string()).await;

        let err = local_transport().get(&url, &[]).await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn json_body_is_returned() {
        let url = serve_once("200 OK", r#"{"name":"London"}"#.to_string()).await;

        let value = local_transport().get(&url, &[("appid", "KEY".to_string())]).await.unwrap();
        assert_eq!(value, json!({ "name": "London" }));
    }

    #[test]
    fn short_body_is_kept() {
        assert_eq!(truncate_body("city not found"), "city not found");
    }

    #[test]
    fn long_body_is_cut_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn builds_with_default_timeout() {
        assert!(HttpTransport::new().is_ok());
    }
}
