use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, info};

/// Default request timeout for catalog downloads.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for downloading catalog payloads
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a new fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a new fetcher with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gsx/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Downloads and decodes the catalog at `url`
    ///
    /// Only the transport and JSON decoding can fail here; the shape of the
    /// document is left to the parser.
    pub async fn fetch_catalog(&self, url: &str) -> Result<FetchedCatalog> {
        validate_url(url)?;
        debug!("Fetching catalog from {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!(
                    "Catalog not found at '{url}'. Check the configured catalog URL"
                )));
            }
            return Err(Error::Other(format!(
                "Failed to download catalog ({})",
                status.as_u16()
            )));
        }

        let bytes = response.bytes().await?;
        let sha256 = calculate_sha256(&bytes);
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Parse(format!("Catalog response is not valid JSON: {e}")))?;

        info!("Fetched {} bytes from {}", bytes.len(), url);

        Ok(FetchedCatalog {
            payload,
            sha256,
            bytes: bytes.len(),
        })
    }
}

/// A downloaded catalog payload
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedCatalog {
    /// Decoded JSON document
    pub payload: Value,
    /// Base64 encoded SHA-256 of the raw response body
    pub sha256: String,
    /// Size of the raw response body
    pub bytes: usize,
}

/// Accept only absolute `http`/`https` URLs.
pub fn validate_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::InvalidUrl(format!(
            "{raw}: unsupported scheme '{other}'"
        ))),
    }
}

/// Base64 encoded SHA-256 of `content`.
pub fn calculate_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    STANDARD.encode(result)
}

// Note: Default is not implemented as Fetcher::new() can fail.
// Use Fetcher::new() directly and handle the Result.

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[test]
    fn test_fetcher_creation() {
        assert!(Fetcher::new().is_ok(), "Fetcher creation should succeed");
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.org/catalog.json").is_ok());
        assert!(validate_url("http://localhost:8080/c.json").is_ok());
        assert!(matches!(
            validate_url("ftp://example.org/c.json"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(validate_url("not a url"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_sha256_is_stable() {
        let first = calculate_sha256(b"{\"catalog\":{}}");
        let second = calculate_sha256(b"{\"catalog\":{}}");
        assert_eq!(first, second);
        assert_ne!(first, calculate_sha256(b"{}"));
        assert_eq!(first.len(), 44);
    }

    #[tokio::test]
    async fn test_fetch_catalog_success() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        let body = json!({"catalog": {"controls": [{"id": "A"}]}});
        Mock::given(method("GET"))
            .and(path("/catalog.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new()?;
        let fetched = fetcher
            .fetch_catalog(&format!("{}/catalog.json", server.uri()))
            .await?;

        assert_eq!(fetched.payload, body);
        assert!(fetched.bytes > 0);
        assert!(!fetched.sha256.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_catalog_not_found() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = Fetcher::new()?
            .fetch_catalog(&format!("{}/missing.json", server.uri()))
            .await;
        match result {
            Err(Error::NotFound(msg)) => assert!(msg.contains("missing.json")),
            other => panic!("expected NotFound, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_catalog_server_error() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = Fetcher::new()?
            .fetch_catalog(&format!("{}/c.json", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to download catalog (503)");
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_catalog_invalid_json() -> anyhow::Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = Fetcher::new()?
            .fetch_catalog(&format!("{}/c.json", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "parse");
        Ok(())
    }
}
