pub mod logging;
pub mod lookup;

pub use logging::init_tracing;
pub use lookup::{
    classify, CategorizedFormats, ClientConfig, HttpLinkService, LinkService, LookupError,
    LookupSession, MediaFormat, SessionSnapshot, SessionStatus, SubmitOutcome, VideoMetadata,
};
