use clap::Parser;
use std::process::ExitCode;

use video_links_lib::init_tracing;
use video_links_lib::lookup::render::render_snapshot;
use video_links_lib::lookup::{
    ClientConfig, HttpLinkService, LookupError, LookupSession, SubmitOutcome,
};

#[derive(Parser)]
#[command(name = "video-links")]
#[command(about = "Fetch categorized download links for a video URL", long_about = None)]
#[command(version)]
struct Cli {
    /// Video page URL
    url: Option<String>,

    /// Backend base URL (overrides config and VIDEO_DOWNLOADER_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long)]
    api_key: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long)]
    timeout: Option<u32>,

    /// HTTP or SOCKS5 proxy URL
    #[arg(long)]
    proxy: Option<String>,

    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Only query the backend's root endpoint
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, LookupError> {
    let mut config = ClientConfig::load()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    if let Some(key) = cli.api_key {
        config = config.with_api_key(key);
    }
    if let Some(seconds) = cli.timeout {
        config = config.with_timeout((seconds > 0).then_some(seconds));
    }
    if cli.proxy.is_some() {
        config = config.with_proxy(cli.proxy);
    }

    let service = HttpLinkService::new(config)?;

    if cli.check {
        let info = service.service_info().await?;
        println!("{} {} at {}", info.name, info.version, service.config().api_url);
        if !info.description.is_empty() {
            println!("{}", info.description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let session = LookupSession::new(service);
    let snapshot = match session.submit(cli.url.as_deref().unwrap_or_default()).await {
        SubmitOutcome::Finished(snapshot) => snapshot,
        SubmitOutcome::Ignored => session.snapshot(),
    };

    println!("{}", render_snapshot(&snapshot));

    Ok(if snapshot.error_message().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
