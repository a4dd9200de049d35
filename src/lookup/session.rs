// Lookup session - state machine for one user-driven lookup
//
// Idle -> Loading -> Success | Error, and Success/Error -> Loading on the
// next valid submission. Metadata is fetched first; formats are fetched
// only after metadata succeeded. A submission while Loading is ignored.

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::errors::LookupError;
use super::format_classifier::classify;
use super::models::{CategorizedFormats, LookupRequest, VideoMetadata};
use super::traits::LinkService;

/// Status shown to the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Everything a presentation layer needs to draw the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub metadata: Option<VideoMetadata>,
    pub formats: Option<CategorizedFormats>,
}

impl SessionSnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SessionStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Result of a `submit` call
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another lookup was in flight; nothing changed
    Ignored,
    /// The submission ran to a terminal state
    Finished(SessionSnapshot),
}

/// Typed result of the two-step pipeline
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Complete {
        metadata: VideoMetadata,
        formats: CategorizedFormats,
    },
    MetadataFailed(LookupError),
    /// Metadata arrived but the format fetch failed
    LinksFailed {
        metadata: VideoMetadata,
        error: LookupError,
    },
}

/// Fetch metadata, then formats, then classify.
/// `on_metadata` runs between the two calls.
pub async fn run_lookup<S, F>(service: &S, request: &LookupRequest, mut on_metadata: F) -> LookupOutcome
where
    S: LinkService + ?Sized,
    F: FnMut(&VideoMetadata) + Send,
{
    let metadata = match service.fetch_video_info(request).await {
        Ok(metadata) => metadata,
        Err(err) => return LookupOutcome::MetadataFailed(err),
    };
    debug!(title = %metadata.title, "Metadata received");
    on_metadata(&metadata);

    match service.fetch_download_links(request).await {
        Ok(links) => {
            let formats = classify(&links.into_formats());
            LookupOutcome::Complete { metadata, formats }
        }
        Err(error) => LookupOutcome::LinksFailed { metadata, error },
    }
}

pub struct LookupSession<S> {
    service: S,
    state: watch::Sender<SessionSnapshot>,
}

impl<S: LinkService> LookupSession<S> {
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::default());
        Self { service, state }
    }

    #[cfg(test)]
    pub(crate) fn service(&self) -> &S {
        &self.service
    }

    /// Current state (cloned)
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that sees every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Back to Idle with nothing displayed. Returns false while Loading.
    pub fn reset(&self) -> bool {
        self.state.send_if_modified(|snap| {
            if snap.is_loading() {
                return false;
            }
            *snap = SessionSnapshot::default();
            true
        })
    }

    /// Submit a URL typed by the user
    pub async fn submit(&self, raw_url: &str) -> SubmitOutcome {
        let request = LookupRequest::parse(raw_url);

        // Check-and-set in one step so two callers cannot both start
        let accepted = self.state.send_if_modified(|snap| {
            if snap.is_loading() {
                return false;
            }
            match &request {
                // Previous results stay on screen next to the message
                Err(err) => snap.status = SessionStatus::Error(err.user_message()),
                Ok(_) => {
                    snap.status = SessionStatus::Loading;
                    snap.metadata = None;
                    snap.formats = None;
                }
            }
            true
        });

        if !accepted {
            debug!("Lookup already in progress, submission ignored");
            return SubmitOutcome::Ignored;
        }

        let request = match request {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "Rejected submission");
                return SubmitOutcome::Finished(self.snapshot());
            }
        };

        info!(url = request.url(), service = self.service.name(), "Lookup started");
        let mut guard = LoadingGuard::new(&self.state);

        let outcome = run_lookup(&self.service, &request, |metadata| {
            self.state
                .send_modify(|snap| snap.metadata = Some(metadata.clone()));
        })
        .await;

        guard.disarm();
        self.apply(outcome);
        SubmitOutcome::Finished(self.snapshot())
    }

    fn apply(&self, outcome: LookupOutcome) {
        match outcome {
            LookupOutcome::Complete { metadata, formats } => {
                info!(
                    video_with_audio = formats.video_with_audio.len(),
                    video_only = formats.video_only.len(),
                    audio_only = formats.audio_only.len(),
                    "Lookup succeeded"
                );
                self.state.send_modify(|snap| {
                    snap.status = SessionStatus::Success;
                    snap.metadata = Some(metadata);
                    snap.formats = Some(formats);
                });
            }
            LookupOutcome::MetadataFailed(err) => {
                warn!(error = %err, "Metadata fetch failed");
                self.state
                    .send_modify(|snap| snap.status = SessionStatus::Error(err.user_message()));
            }
            LookupOutcome::LinksFailed { metadata, error } => {
                // Metadata is kept; only the formats are missing
                warn!(error = %error, "Format fetch failed");
                self.state.send_modify(|snap| {
                    snap.status = SessionStatus::Error(error.user_message());
                    snap.metadata = Some(metadata);
                });
            }
        }
    }
}

/// Returns the session to Idle if a submit future is dropped mid-flight
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionSnapshot>,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<SessionSnapshot>) -> Self {
        Self { state, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Lookup dropped before completion");
        self.state.send_if_modified(|snap| {
            if !snap.is_loading() {
                return false;
            }
            *snap = SessionSnapshot::default();
            true
        });
    }
}
