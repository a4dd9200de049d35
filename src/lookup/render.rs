// Plain-text presentation of a session snapshot

use std::fmt::Write;

use super::format_classifier::FormatBucket;
use super::models::{CategorizedFormats, MediaFormat, VideoMetadata};
use super::session::{SessionSnapshot, SessionStatus};

const BUCKET_ORDER: [FormatBucket; 3] = [
    FormatBucket::VideoWithAudio,
    FormatBucket::VideoOnly,
    FormatBucket::AudioOnly,
];

/// Link text, e.g. "1080p MP4 - 12.3 MB" or "Audio 128kbps M4A"
pub fn format_label(format: &MediaFormat, bucket: FormatBucket) -> String {
    let mut label = String::new();
    if bucket == FormatBucket::AudioOnly {
        label.push_str("Audio ");
    }
    label.push_str(&format.quality);
    label.push(' ');
    label.push_str(&format.ext.to_uppercase());
    if let Some(size) = format.filesize_formatted.as_deref().filter(|s| !s.is_empty()) {
        label.push_str(" - ");
        label.push_str(size);
    }
    label
}

pub fn render_metadata(metadata: &VideoMetadata) -> String {
    let mut out = String::from("Video Details\n");
    let _ = writeln!(out, "  {}", metadata.title);
    let _ = writeln!(out, "  Duration: {}", metadata.duration);
    let _ = writeln!(out, "  Views: {}", metadata.view_count);
    let _ = writeln!(out, "  Uploader: {}", metadata.uploader);
    if let Some(thumbnail) = &metadata.thumbnail {
        let _ = writeln!(out, "  Thumbnail: {}", thumbnail);
    }
    out
}

/// "Download Options" with one section per non-empty bucket
pub fn render_formats(formats: &CategorizedFormats) -> String {
    let mut out = String::from("Download Options\n");
    for bucket in BUCKET_ORDER {
        let items = formats.bucket(bucket);
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n  {}", bucket.title());
        for format in items {
            let _ = writeln!(out, "    {}  {}", format_label(format, bucket), format.url);
        }
    }
    out
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut sections = Vec::new();

    match &snapshot.status {
        SessionStatus::Idle => {}
        SessionStatus::Loading => sections.push("Loading...\n".to_string()),
        SessionStatus::Success => {}
        SessionStatus::Error(msg) => sections.push(format!("Error: {}\n", msg)),
    }
    if let Some(metadata) = &snapshot.metadata {
        sections.push(render_metadata(metadata));
    }
    if let Some(formats) = &snapshot.formats {
        sections.push(render_formats(formats));
    }

    sections.join("\n")
}
