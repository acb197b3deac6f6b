//! HTTP backend client
//!
//! JSON over HTTP(S). Every request carries the session's link token in the
//! header named by `api.link_token_header`. Any non-success status collapses
//! into [`ApiError::Status`]; no structured error body is parsed.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use synclink_core::api::{
    ApiError, ApiResult, ConnectApi, CreateSourceRequest, FinalizeSyncRequest, SourceDescriptor,
    SyncDescriptor,
};
use synclink_core::config::ApiConfig;

use crate::error::Result;

/// Backend client speaking JSON over HTTP
#[derive(Clone)]
pub struct HttpConnectApi {
    client: reqwest::Client,
    config: ApiConfig,
    link_token: Option<String>,
}

impl std::fmt::Debug for HttpConnectApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnectApi")
            .field("base_url", &self.config.base_url)
            .field("link_token", &self.link_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpConnectApi {
    /// Create a client for `config`, authenticating with `link_token`
    pub fn new(config: ApiConfig, link_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            link_token,
        })
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn token(&self) -> ApiResult<&str> {
        self.link_token
            .as_deref()
            .ok_or(ApiError::MissingLinkToken)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ApiResult<T> {
        let token = self.token()?;
        let response = request
            .header(self.config.link_token_header.as_str(), token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "backend returned error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ConnectApi for HttpConnectApi {
    async fn create_source(&self, request: CreateSourceRequest) -> ApiResult<SourceDescriptor> {
        let url = self.url(&self.config.paths.create_source);
        tracing::debug!(%url, "POST create source");
        self.send(self.client.post(url).json(&request)).await
    }

    async fn list_sources(&self) -> ApiResult<Vec<SourceDescriptor>> {
        let url = self.url(&self.config.paths.list_sources);
        tracing::debug!(%url, "GET list sources");
        self.send(self.client.get(url)).await
    }

    async fn finalize_sync(&self, request: FinalizeSyncRequest) -> ApiResult<SyncDescriptor> {
        let url = self.url(&self.config.paths.finalize_sync);
        tracing::debug!(%url, "POST finalize sync");
        self.send(self.client.post(url).json(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};
    use synclink_core::connection::{BigQueryConfig, ConnectionType, SourceCredentials};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response and capture the raw request
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, Arc<Mutex<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Arc::new(Mutex::new(String::new()));
        let sink = captured.clone();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let content_length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + content_length {
                        break;
                    }
                }
            }
            *sink.lock().unwrap() = String::from_utf8_lossy(&raw).to_string();

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{}", addr), captured)
    }

    fn client(base_url: String, token: Option<&str>) -> HttpConnectApi {
        let config = ApiConfig {
            base_url,
            ..Default::default()
        };
        HttpConnectApi::new(config, token.map(str::to_string)).unwrap()
    }

    fn bigquery_request() -> CreateSourceRequest {
        CreateSourceRequest {
            display_name: "My Source".to_string(),
            credentials: SourceCredentials::BigQuery(BigQueryConfig {
                credentials: "{}".to_string(),
            }),
        }
    }

    #[rstest]
    #[case(
        "https://api.example.com",
        "/connect/sources",
        "https://api.example.com/connect/sources"
    )]
    #[case(
        "https://api.example.com/",
        "/connect/sources",
        "https://api.example.com/connect/sources"
    )]
    #[case("https://api.example.com/v1/", "syncs", "https://api.example.com/v1/syncs")]
    fn test_url_joining(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        let api = client(base.to_string(), None);
        assert_eq!(api.url(path), expected);
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = client("https://api.example.com".to_string(), Some("lt_secret"));
        let debug = format!("{:?}", api);
        assert!(!debug.contains("lt_secret"));
        assert!(debug.contains("redacted"));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_sending() {
        let api = client("http://127.0.0.1:1".to_string(), None);
        let err = api.list_sources().await.unwrap_err();
        assert_eq!(err, ApiError::MissingLinkToken);
    }

    #[tokio::test]
    async fn test_create_source_sends_token_and_payload() {
        let (base_url, captured) = serve_once(
            "HTTP/1.1 201 Created",
            r#"{"id":"src_1","display_name":"My Source","connection_type":"bigquery"}"#,
        )
        .await;
        let api = client(base_url, Some("lt_123"));

        let source = api.create_source(bigquery_request()).await.unwrap();

        assert_eq!(source.id, "src_1");
        assert_eq!(source.connection_type, ConnectionType::BigQuery);
        let raw = captured.lock().unwrap().to_ascii_lowercase();
        assert!(raw.starts_with("post /connect/sources"));
        assert!(raw.contains("x-link-token: lt_123"));
        assert!(raw.contains("\"display_name\":\"my source\""));
    }

    #[tokio::test]
    async fn test_error_status_is_collapsed() {
        let (base_url, _) = serve_once("HTTP/1.1 403 Forbidden", r#"{"error":"bad token"}"#).await;
        let api = client(base_url, Some("lt_123"));

        let err = api.list_sources().await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("bad token"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_body_is_decode_error() {
        let (base_url, _) = serve_once("HTTP/1.1 200 OK", r#"{"not":"a list"}"#).await;
        let api = client(base_url, Some("lt_123"));

        let err = api.list_sources().await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }
}
