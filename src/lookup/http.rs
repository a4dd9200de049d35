// HTTP link service backed by reqwest

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::config::ClientConfig;
use super::errors::LookupError;
use super::models::{DownloadLinks, ErrorPayload, LookupRequest, ServiceInfo, VideoMetadata};
use super::traits::LinkService;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const VIDEO_INFO_PATH: &str = "/api/video-info";
pub const DOWNLOAD_LINKS_PATH: &str = "/api/download-links";

pub struct HttpLinkService {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpLinkService {
    pub fn new(config: ClientConfig) -> Result<Self, LookupError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| LookupError::Config("API key contains invalid header characters".to_string()))?;
        headers.insert(API_KEY_HEADER, key);

        let mut builder = reqwest::Client::builder().default_headers(headers);

        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(u64::from(seconds)));
        }

        // Only the configured proxy is used, never HTTP_PROXY & co.
        match config.proxy.as_deref() {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
                    LookupError::Config(format!("Invalid proxy URL {}: {}", proxy_url, e))
                })?;
                debug!(proxy = proxy_url, "Using proxy for link service");
                builder = builder.proxy(proxy);
            }
            None => builder = builder.no_proxy(),
        }

        let client = builder
            .build()
            .map_err(|e| LookupError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Backend name and version from the root endpoint
    pub async fn service_info(&self) -> Result<ServiceInfo, LookupError> {
        let url = self.config.endpoint("/");
        debug!(%url, "GET service info");
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &LookupRequest,
    ) -> Result<T, LookupError> {
        let url = self.config.endpoint(path);
        debug!(%url, target_url = request.url(), "POST");

        let response = self.client.post(&url).json(request).send().await.map_err(|e| {
            warn!(%url, error = %e, "Request failed without a response");
            LookupError::from(e)
        })?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, LookupError> {
        let status = response.status();

        if !status.is_success() {
            // Body may be empty or not JSON at all
            let body = response.text().await.unwrap_or_default();
            let payload: ErrorPayload = serde_json::from_str(&body).unwrap_or_default();
            warn!(status = status.as_u16(), message = ?payload.error, "Backend returned an error");
            return Err(LookupError::Remote {
                status: status.as_u16(),
                message: payload.error,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LinkService for HttpLinkService {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_video_info(&self, request: &LookupRequest) -> Result<VideoMetadata, LookupError> {
        self.post_json(VIDEO_INFO_PATH, request).await
    }

    async fn fetch_download_links(
        &self,
        request: &LookupRequest,
    ) -> Result<DownloadLinks, LookupError> {
        self.post_json(DOWNLOAD_LINKS_PATH, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_proxy_rejected() {
        let config = ClientConfig::default().with_proxy(Some("ftp://127.0.0.1:21".to_string()));
        assert!(matches!(HttpLinkService::new(config), Err(LookupError::Config(_))));
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let config = ClientConfig::default().with_api_key("line\nbreak");
        assert!(matches!(HttpLinkService::new(config), Err(LookupError::Config(_))));
    }

    #[test]
    fn test_socks_proxy_accepted() {
        let config = ClientConfig::default()
            .with_api_key("k")
            .with_proxy(Some("socks5h://127.0.0.1:1080".to_string()));
        let service = HttpLinkService::new(config).unwrap();
        assert_eq!(service.name(), "http");
        assert_eq!(service.config().api_key, "k");
    }
}
