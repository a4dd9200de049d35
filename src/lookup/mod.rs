// Lookup module - fetch video details and categorized download links
//
// Flow: submit URL -> video-info -> download-links -> classify -> display.
// Either remote call failing ends the lookup with an error message.

pub mod config;
pub mod errors;
pub mod format_classifier;
pub mod http;
pub mod models;
pub mod render;
pub mod session;
pub mod traits;

pub use config::ClientConfig;
pub use errors::LookupError;
pub use format_classifier::{bucket_for, classify, FormatBucket};
pub use http::HttpLinkService;
pub use models::{
    CategorizedFormats, DownloadLinks, LookupRequest, MediaFormat, RemoteFormat, ServiceInfo,
    VideoMetadata,
};
pub use session::{LookupOutcome, LookupSession, SessionSnapshot, SessionStatus, SubmitOutcome};
pub use traits::LinkService;
