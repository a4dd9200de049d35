// Link service trait definition

use async_trait::async_trait;

use super::errors::LookupError;
use super::models::{DownloadLinks, LookupRequest, VideoMetadata};

/// Remote extraction service used by a lookup session
#[async_trait]
pub trait LinkService: Send + Sync {
    /// Name of the service (for logging)
    fn name(&self) -> &'static str;

    /// Fetch title, thumbnail and stats for the URL
    async fn fetch_video_info(&self, request: &LookupRequest) -> Result<VideoMetadata, LookupError>;

    /// Fetch downloadable formats for the URL
    async fn fetch_download_links(
        &self,
        request: &LookupRequest,
    ) -> Result<DownloadLinks, LookupError>;
}
