//! Device metadata retrieval.
//!
//! The TV describes itself at `http://<ip>:8001/api/v2/`. The document
//! carries the device id used as the token cache key and the capabilities
//! that select the protocol variant.

// ============================================================================
// Imports
// ============================================================================

use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{DeviceMetadata, ProtocolProfile};

// ============================================================================
// MetadataFetcher
// ============================================================================

/// One-shot HTTP client for the metadata document.
///
/// Certificate validation is disabled so the `https` variant works against
/// the TV's self-signed certificate.
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: Client,
}

impl MetadataFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetches the metadata of the TV at `host` using the endpoint of
    /// `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataFetch`] on any failure. See
    /// [`fetch_url`](Self::fetch_url).
    pub async fn fetch(&self, host: &str, profile: &ProtocolProfile) -> Result<DeviceMetadata> {
        self.fetch_url(&profile.metadata_url(host)).await
    }

    /// Fetches the metadata document at `url`.
    ///
    /// Makes a single attempt.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MetadataFetch`] if the request fails, the status is
    /// not 200, or the body is not a metadata document.
    pub async fn fetch_url(&self, url: &str) -> Result<DeviceMetadata> {
        debug!(url = %url, "Fetching device metadata");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::metadata_fetch(format!("Request error: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::metadata_fetch(format!("Request status {status}")));
        }

        let metadata: DeviceMetadata = response
            .json()
            .await
            .map_err(|e| Error::metadata_fetch(format!("Invalid metadata document: {e}")))?;

        debug!(
            device_id = %metadata.id,
            model = %metadata.device.model_name,
            token_auth = metadata.supports_token_auth(),
            "Device metadata received"
        );

        Ok(metadata)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn profile_for(server: &MockServer) -> ProtocolProfile {
        ProtocolProfile {
            metadata_port: server.address().port(),
            ..ProtocolProfile::token_auth()
        }
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "uuid:1234",
                "name": "[TV] Samsung Q60",
                "device": {"modelName": "QE55Q60", "TokenAuthSupport": "true"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = MetadataFetcher::new().expect("fetcher");
        let metadata = fetcher
            .fetch("127.0.0.1", &profile_for(&server))
            .await
            .expect("metadata");

        assert_eq!(metadata.id.as_str(), "uuid:1234");
        assert_eq!(metadata.device.model_name, "QE55Q60");
        assert!(metadata.supports_token_auth());
    }

    #[tokio::test]
    async fn test_fetch_non_200_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = MetadataFetcher::new().expect("fetcher");
        let err = fetcher
            .fetch("127.0.0.1", &profile_for(&server))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MetadataFetch { .. }));
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(text.contains("IP address"));
    }

    #[tokio::test]
    async fn test_fetch_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let fetcher = MetadataFetcher::new().expect("fetcher");
        let result = fetcher.fetch("127.0.0.1", &profile_for(&server)).await;

        assert!(matches!(result, Err(Error::MetadataFetch { .. })));
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };

        let fetcher = MetadataFetcher::new().expect("fetcher");
        let result = fetcher
            .fetch_url(&format!("http://127.0.0.1:{port}/api/v2/"))
            .await;

        assert!(matches!(result, Err(Error::MetadataFetch { .. })));
    }
}
