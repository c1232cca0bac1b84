//! HTTP client factory and the single-request fetcher.

use anyhow::Context;
use encoding_rs::Encoding;
use rquest::{redirect, Client};
use rquest_util::Emulation;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Redirect chains longer than this are treated as a fetch failure.
pub const MAX_REDIRECTS: usize = 10;

/// Response bodies are truncated-rejected past this size to cap memory.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy)]
pub enum ClientType {
    Standard,
    HeavyEmulation,
}

/// Factory for creating an HTTP client based on the desired level of
/// stealth/performance.
pub fn create_client(
    client_type: ClientType,
    user_agent: &str,
    timeout: Duration,
) -> anyhow::Result<Client> {
    let builder = Client::builder()
        .timeout(timeout)
        .redirect(redirect::Policy::limited(MAX_REDIRECTS))
        .cookie_store(true);

    match client_type {
        ClientType::HeavyEmulation => {
            // Full browser impersonation for sites that reject bot traffic.
            builder
                .emulation(Emulation::Firefox136)
                .build()
                .context("Failed to build heavy impersonated rquest client")
        }
        ClientType::Standard => builder
            .user_agent(user_agent)
            .build()
            .context("Failed to build standard rquest client"),
    }
}

/// Typed fetch failures. Non-2xx statuses are results, not failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection failed: {0}")]
    ConnectFailed(String),
    #[error("Redirect chain exceeded {MAX_REDIRECTS} hops")]
    TooManyRedirects,
    #[error("Response body exceeded {limit} bytes")]
    ContentTooLarge { limit: usize },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    fn classify(err: rquest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectFailed(err.to_string())
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else {
            Self::InvalidResponse(err.to_string())
        }
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub final_url: String,
    /// Header names lowercased; duplicate headers keep the first value.
    pub headers: HashMap<String, String>,
    pub body: String,
    pub load_time_ms: u64,
}

impl FetchedResponse {
    pub fn content_type(&self) -> &str {
        self.headers.get("content-type").map(String::as_str).unwrap_or("")
    }

    pub fn is_html(&self) -> bool {
        self.content_type().to_ascii_lowercase().contains("text/html")
    }
}

/// Issues one request with redirect following and a bounded body read.
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Fetch a URL, following up to `MAX_REDIRECTS` redirects.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedResponse, FetchError> {
        let start = Instant::now();
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::classify)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = header_map(&response);

        let mut body_bytes: Vec<u8> = Vec::new();
        let mut response = response;
        while let Some(chunk) = response.chunk().await.map_err(FetchError::classify)? {
            if body_bytes.len() + chunk.len() > self.max_body_bytes {
                return Err(FetchError::ContentTooLarge {
                    limit: self.max_body_bytes,
                });
            }
            body_bytes.extend_from_slice(&chunk);
        }

        let body = decode_body(&body_bytes, headers.get("content-type").map(String::as_str));

        Ok(FetchedResponse {
            status,
            final_url,
            headers,
            body,
            load_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// HEAD request used for start-URL resolution. Returns status and the
    /// redirect-resolved final URL.
    pub async fn head(&self, url: &Url) -> Result<(u16, String), FetchError> {
        let response = self
            .client
            .head(url.as_str())
            .send()
            .await
            .map_err(FetchError::classify)?;
        Ok((response.status().as_u16(), response.url().to_string()))
    }
}

fn header_map(response: &rquest::Response) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .or_insert_with(|| value.to_string());
        }
    }
    headers
}

/// Decode a response body using the charset from the Content-Type header,
/// defaulting to lossy UTF-8.
fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let charset = content_type
        .and_then(|ct| ct.split(';').find_map(|part| part.trim().strip_prefix("charset=")))
        .map(|cs| cs.trim_matches('"'));

    if let Some(encoding) = charset.and_then(|cs| Encoding::for_label(cs.as_bytes())) {
        let (text, _, _) = encoding.decode(bytes);
        text.into_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;

    fn fetcher() -> HttpFetcher {
        let client = create_client(
            ClientType::Standard,
            DEFAULT_USER_AGENT,
            Duration::from_secs(5),
        )
        .unwrap();
        HttpFetcher::new(client)
    }

    #[tokio::test]
    async fn fetch_returns_body_and_lowercased_headers() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("Content-Type", "text/html; charset=utf-8")
            .with_header("X-Custom", "abc")
            .with_body("<html><body>hi</body></html>")
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap();
        let resp = fetcher().fetch(&url).await.unwrap();

        assert_eq!(resp.status, 200);
        assert!(resp.is_html());
        assert_eq!(resp.headers.get("x-custom").map(String::as_str), Some("abc"));
        assert!(resp.body.contains("hi"));
    }

    #[tokio::test]
    async fn non_2xx_is_a_result_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("gone")
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap().join("/missing").unwrap();
        let resp = fetcher().fetch(&url).await.unwrap();
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/big")
            .with_status(200)
            .with_body("x".repeat(4096))
            .create_async()
            .await;

        let url = Url::parse(&server.url()).unwrap().join("/big").unwrap();
        let result = fetcher().with_max_body_bytes(1024).fetch(&url).await;
        assert!(matches!(result, Err(FetchError::ContentTooLarge { .. })));
    }

    #[test]
    fn decode_body_honors_charset_label() {
        // "café" in ISO-8859-1
        let bytes = [0x63, 0x61, 0x66, 0xE9];
        let text = decode_body(&bytes, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(text, "café");
    }
}
