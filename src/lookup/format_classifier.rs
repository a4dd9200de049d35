// Format classifier - groups formats into display buckets
//
// Three mutually exclusive buckets, decided only by capability flags:
// - video + audio
// - video only
// - audio only
// Formats with neither capability belong to no bucket and are dropped.
// Input order is preserved inside every bucket.

use tracing::warn;

use super::models::{CategorizedFormats, MediaFormat};

/// Display bucket a format belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatBucket {
    VideoWithAudio,
    VideoOnly,
    AudioOnly,
}

impl FormatBucket {
    /// `(has_video, has_audio)` implied by the bucket
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::VideoWithAudio => (true, true),
            Self::VideoOnly => (true, false),
            Self::AudioOnly => (false, true),
        }
    }

    /// Section heading used by the presentation layer
    pub fn title(self) -> &'static str {
        match self {
            Self::VideoWithAudio => "Video with Audio",
            Self::VideoOnly => "Video Only (No Audio)",
            Self::AudioOnly => "Audio Only",
        }
    }
}

/// Bucket for a single format, `None` if it has neither video nor audio
pub fn bucket_for(format: &MediaFormat) -> Option<FormatBucket> {
    match (format.has_video, format.has_audio) {
        (true, true) => Some(FormatBucket::VideoWithAudio),
        (true, false) => Some(FormatBucket::VideoOnly),
        (false, true) => Some(FormatBucket::AudioOnly),
        (false, false) => None,
    }
}

/// Stable partition of `formats` into the three buckets
pub fn classify(formats: &[MediaFormat]) -> CategorizedFormats {
    let mut buckets = CategorizedFormats::default();

    for format in formats {
        match bucket_for(format) {
            Some(FormatBucket::VideoWithAudio) => buckets.video_with_audio.push(format.clone()),
            Some(FormatBucket::VideoOnly) => buckets.video_only.push(format.clone()),
            Some(FormatBucket::AudioOnly) => buckets.audio_only.push(format.clone()),
            None => {
                warn!(
                    format_id = format.format_id.as_deref().unwrap_or("?"),
                    url = %format.url,
                    "Dropping format with neither video nor audio"
                );
            }
        }
    }

    buckets
}

impl CategorizedFormats {
    /// Formats of one bucket
    pub fn bucket(&self, bucket: FormatBucket) -> &[MediaFormat] {
        match bucket {
            FormatBucket::VideoWithAudio => &self.video_with_audio,
            FormatBucket::VideoOnly => &self.video_only,
            FormatBucket::AudioOnly => &self.audio_only,
        }
    }
}
