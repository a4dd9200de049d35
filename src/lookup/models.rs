// Common data models for the lookup pipeline

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::LookupError;
use super::format_classifier::FormatBucket;

/// A validated lookup request. Also the JSON body of both backend calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupRequest {
    url: String,
}

impl LookupRequest {
    /// Trim the raw input and reject empty URLs
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let url = raw.trim();
        if url.is_empty() {
            return Err(LookupError::Validation);
        }
        Ok(Self {
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Video details returned by `/api/video-info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "non_empty_text")]
    pub thumbnail: Option<String>,
    /// Display text, e.g. "0:03:25"
    #[serde(default, deserialize_with = "duration_text")]
    pub duration: String,
    /// Display text, e.g. "1.2M views"
    #[serde(default, deserialize_with = "view_count_text")]
    pub view_count: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub uploader: String,
}

/// One downloadable variant of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub format_id: Option<String>,
    /// Quality label (e.g., "1080p", "128kbps")
    pub quality: String,
    /// Container extension (mp4, webm, m4a)
    pub ext: String,
    /// Direct download URL
    pub url: String,
    pub has_video: bool,
    pub has_audio: bool,
    /// Human-readable size (e.g., "12.3 MB")
    pub filesize_formatted: Option<String>,
    pub height: Option<u32>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
}

#[cfg(test)]
impl MediaFormat {
    pub fn new(quality: &str, ext: &str, url: &str, has_video: bool, has_audio: bool) -> Self {
        Self {
            format_id: None,
            quality: quality.to_string(),
            ext: ext.to_string(),
            url: url.to_string(),
            has_video,
            has_audio,
            filesize_formatted: None,
            height: None,
            abr: None,
        }
    }

    pub fn with_format_id(mut self, format_id: &str) -> Self {
        self.format_id = Some(format_id.to_string());
        self
    }

    pub fn with_filesize(mut self, formatted: &str) -> Self {
        self.filesize_formatted = Some(formatted.to_string());
        self
    }
}

/// Formats grouped into the three display buckets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizedFormats {
    pub video_with_audio: Vec<MediaFormat>,
    pub video_only: Vec<MediaFormat>,
    pub audio_only: Vec<MediaFormat>,
}

impl CategorizedFormats {
    pub fn len(&self) -> usize {
        self.video_with_audio.len() + self.video_only.len() + self.audio_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All formats in bucket order: video+audio, video-only, audio-only
    pub fn iter(&self) -> impl Iterator<Item = &MediaFormat> {
        self.video_with_audio
            .iter()
            .chain(self.video_only.iter())
            .chain(self.audio_only.iter())
    }
}

/// Format as sent by the backend. Capability flags may be explicit,
/// implied by codecs, or implied by the bucket the format arrived in.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_formatted: Option<String>,
    #[serde(default)]
    pub format_note: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub has_video: Option<bool>,
    #[serde(default)]
    pub has_audio: Option<bool>,
}

impl RemoteFormat {
    /// Resolve flags and labels. `hint` is the bucket the server used, if any.
    pub fn into_media_format(self, hint: Option<FormatBucket>) -> MediaFormat {
        let (hint_video, hint_audio) = hint.map(FormatBucket::flags).unwrap_or((false, false));

        let has_video = self
            .has_video
            .or_else(|| codec_present(self.vcodec.as_deref()))
            .unwrap_or(hint_video);
        let has_audio = self
            .has_audio
            .or_else(|| codec_present(self.acodec.as_deref()))
            .unwrap_or(hint_audio);

        let quality = match self.quality.filter(|q| !q.trim().is_empty()) {
            Some(q) => q,
            None => derive_quality(has_video, self.height, self.abr, self.format_note.as_deref()),
        };

        let filesize_formatted = self
            .filesize_formatted
            .or_else(|| self.filesize.map(format_megabytes));

        MediaFormat {
            format_id: self.format_id,
            quality,
            ext: self.ext.unwrap_or_else(|| "mp4".to_string()),
            url: self.url,
            has_video,
            has_audio,
            filesize_formatted,
            height: self.height,
            abr: self.abr,
        }
    }
}

/// `/api/download-links` body. The reference backend pre-buckets formats;
/// other backends may return a flat list that still needs classifying.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DownloadLinks {
    Bucketed(BucketedLinks),
    Listed { formats: Vec<RemoteFormat> },
    Flat(Vec<RemoteFormat>),
}

/// Pre-bucketed body. Empty buckets may be left out, but at least one
/// bucket key must be present.
#[derive(Debug, Clone, Default)]
pub struct BucketedLinks {
    pub video_with_audio: Vec<RemoteFormat>,
    pub video_only: Vec<RemoteFormat>,
    pub audio_only: Vec<RemoteFormat>,
}

#[derive(Deserialize)]
struct RawBucketedLinks {
    #[serde(default)]
    video_with_audio: Option<Vec<RemoteFormat>>,
    #[serde(default)]
    video_only: Option<Vec<RemoteFormat>>,
    #[serde(default)]
    audio_only: Option<Vec<RemoteFormat>>,
}

impl<'de> Deserialize<'de> for BucketedLinks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawBucketedLinks::deserialize(deserializer)?;
        if raw.video_with_audio.is_none() && raw.video_only.is_none() && raw.audio_only.is_none() {
            return Err(serde::de::Error::custom("no format buckets in response"));
        }
        Ok(Self {
            video_with_audio: raw.video_with_audio.unwrap_or_default(),
            video_only: raw.video_only.unwrap_or_default(),
            audio_only: raw.audio_only.unwrap_or_default(),
        })
    }
}

impl DownloadLinks {
    /// Flatten to a single ordered list (bucket order for bucketed bodies)
    pub fn into_formats(self) -> Vec<MediaFormat> {
        match self {
            Self::Bucketed(BucketedLinks {
                video_with_audio,
                video_only,
                audio_only,
            }) => {
                let tagged = video_with_audio
                    .into_iter()
                    .map(|f| f.into_media_format(Some(FormatBucket::VideoWithAudio)))
                    .chain(
                        video_only
                            .into_iter()
                            .map(|f| f.into_media_format(Some(FormatBucket::VideoOnly))),
                    )
                    .chain(
                        audio_only
                            .into_iter()
                            .map(|f| f.into_media_format(Some(FormatBucket::AudioOnly))),
                    );
                tagged.collect()
            }
            Self::Listed { formats } | Self::Flat(formats) => formats
                .into_iter()
                .map(|f| f.into_media_format(None))
                .collect(),
        }
    }
}

/// Backend root endpoint (`GET /`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// Error payload of a non-2xx response
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
}

/// `Some(false)` for the literal "none" codec, `None` when unknown
fn codec_present(codec: Option<&str>) -> Option<bool> {
    codec
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| c != "none")
}

fn derive_quality(has_video: bool, height: Option<u32>, abr: Option<f64>, note: Option<&str>) -> String {
    if has_video {
        if let Some(h) = height.filter(|h| *h > 0) {
            return format!("{}p", h);
        }
    } else if let Some(abr) = abr.filter(|a| *a > 0.0) {
        // Debug keeps the trailing ".0" the backend prints for whole bitrates
        return format!("{:?}kbps", abr);
    }

    note.filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown quality".to_string())
}

fn format_megabytes(bytes: u64) -> String {
    format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// Seconds as `H:MM:SS`, with a day prefix for long streams
pub fn format_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let clock = format!("{}:{:02}:{:02}", hours, minutes, seconds);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

pub fn format_views(views: u64) -> String {
    if views >= 1_000_000 {
        format!("{:.1}M views", views as f64 / 1_000_000.0)
    } else if views >= 1_000 {
        format!("{:.1}K views", views as f64 / 1_000.0)
    } else {
        format!("{} views", views)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(f64),
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

fn duration_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(secs)) => format_duration(secs.max(0.0) as u64),
        None => String::new(),
    })
}

fn view_count_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(views)) => format_views(views.max(0.0) as u64),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_trimmed() {
        let req = LookupRequest::parse("  https://youtu.be/abc \n").unwrap();
        assert_eq!(req.url(), "https://youtu.be/abc");
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"url":"https://youtu.be/abc"}"#
        );
    }

    #[test]
    fn test_blank_request_rejected() {
        assert!(matches!(LookupRequest::parse(""), Err(LookupError::Validation)));
        assert!(matches!(LookupRequest::parse("   \t"), Err(LookupError::Validation)));
    }

    #[test]
    fn test_metadata_from_backend_body() {
        let body = r#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
            "duration": "0:03:33",
            "view_count": "1.5M views",
            "uploader": null,
            "formats": [{"format_id": "18"}]
        }"#;
        let meta: VideoMetadata = serde_json::from_str(body).unwrap();
        assert_eq!(meta.title, "Never Gonna Give You Up");
        assert_eq!(meta.duration, "0:03:33");
        assert_eq!(meta.view_count, "1.5M views");
        assert_eq!(meta.uploader, "");
        assert!(meta.thumbnail.is_some());
    }

    #[test]
    fn test_metadata_raw_numbers_are_formatted() {
        let body = r#"{"title": "t", "duration": 205, "view_count": 12345, "thumbnail": ""}"#;
        let meta: VideoMetadata = serde_json::from_str(body).unwrap();
        assert_eq!(meta.duration, "0:03:25");
        assert_eq!(meta.view_count, "12.3K views");
        assert_eq!(meta.thumbnail, None);
    }

    #[test]
    fn test_format_views() {
        assert_eq!(format_views(999), "999 views");
        assert_eq!(format_views(1_500), "1.5K views");
        assert_eq!(format_views(2_340_000), "2.3M views");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(3_725), "1:02:05");
        assert_eq!(format_duration(90_000), "1 day, 1:00:00");
    }

    #[test]
    fn test_bucketed_links_take_flags_from_bucket() {
        let body = r#"{
            "video_with_audio": [{"format_id": "18", "ext": "mp4", "height": 360, "quality": "360p", "url": "https://cdn/18"}],
            "video_only": [{"format_id": "137", "ext": "mp4", "height": 1080, "url": "https://cdn/137", "filesize": 10485760}],
            "audio_only": [{"format_id": "140", "ext": "m4a", "abr": 129.5, "url": "https://cdn/140"}]
        }"#;
        let links: DownloadLinks = serde_json::from_str(body).unwrap();
        let formats = links.into_formats();

        assert_eq!(formats.len(), 3);
        assert!(formats[0].has_video && formats[0].has_audio);
        assert!(formats[1].has_video && !formats[1].has_audio);
        assert_eq!(formats[1].quality, "1080p");
        assert_eq!(formats[1].filesize_formatted.as_deref(), Some("10.0 MB"));
        assert!(!formats[2].has_video && formats[2].has_audio);
        assert_eq!(formats[2].quality, "129.5kbps");
    }

    #[test]
    fn test_flat_links_use_codecs() {
        let body = r#"[
            {"format_id": "22", "ext": "mp4", "height": 720, "vcodec": "avc1.64001F", "acodec": "mp4a.40.2", "url": "u1"},
            {"format_id": "sb0", "ext": "mhtml", "vcodec": "none", "acodec": "none", "url": "u2"},
            {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "url": "u3"}
        ]"#;
        let formats = serde_json::from_str::<DownloadLinks>(body).unwrap().into_formats();

        assert!(formats[0].has_video && formats[0].has_audio);
        assert!(!formats[1].has_video && !formats[1].has_audio);
        assert!(!formats[2].has_video && formats[2].has_audio);
        assert_eq!(formats[2].quality, "Unknown quality");
    }

    #[test]
    fn test_bucketed_links_with_missing_bucket() {
        let body = r#"{
            "video_with_audio": [{"format_id": "18", "ext": "mp4", "quality": "360p", "url": "https://cdn/18"}],
            "video_only": []
        }"#;
        let links: DownloadLinks = serde_json::from_str(body).unwrap();
        assert!(matches!(links, DownloadLinks::Bucketed(_)));

        let formats = links.into_formats();
        assert_eq!(formats.len(), 1);
        assert!(formats[0].has_video && formats[0].has_audio);
    }

    #[test]
    fn test_body_without_buckets_is_not_bucketed() {
        let listed: DownloadLinks = serde_json::from_str(r#"{"formats": []}"#).unwrap();
        assert!(matches!(listed, DownloadLinks::Listed { .. }));
        assert!(serde_json::from_str::<DownloadLinks>(r#"{"unexpected": true}"#).is_err());
    }

    #[test]
    fn test_whole_audio_bitrate_keeps_decimal() {
        let body = r#"[{"ext": "m4a", "abr": 128.0, "vcodec": "none", "acodec": "mp4a.40.2", "url": "u"}]"#;
        let formats = serde_json::from_str::<DownloadLinks>(body).unwrap().into_formats();
        assert_eq!(formats[0].quality, "128.0kbps");
    }

    #[test]
    fn test_listed_links_with_explicit_flags() {
        let body = r#"{"formats": [{"quality": "480p", "ext": "webm", "url": "u", "has_video": true, "has_audio": false}]}"#;
        let formats = serde_json::from_str::<DownloadLinks>(body).unwrap().into_formats();
        assert_eq!(formats.len(), 1);
        assert!(formats[0].has_video);
        assert!(!formats[0].has_audio);
        assert_eq!(formats[0].quality, "480p");
    }
}
