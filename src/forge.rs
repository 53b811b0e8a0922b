//! High-level pipeline: scrape listing → resolve frames → download → bake GIF.
//!
//! # Responsibilities
//! - Fail-fast orchestration: any stage error ends the run and is returned as-is
//! - Owns the workspace for the run (kept `frames_dir` or an auto-removed temp dir)
//! - Logs every milestone so a run can be followed from the tracing output
//!
//! # Callable From
//! - The CLI ([`crate::cli::run`]) with an [`HttpTransport`]
//! - Tests, with any [`Transport`] (mock, instrumented, or HTTP against a local server)

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{error, info};
use url::Url;

use crate::assemble::{assemble, AssembleConfig};
use crate::config::ForgeConfig;
use crate::contract::Transport;
use crate::download::{fetch_all, fetch_listing, HttpSettings, HttpTransport};
use crate::error::{ForgeError, ForgeResult};
use crate::listing::{resolve, ListingRules};

/// Directory that holds the downloaded frames for one run.
#[derive(Debug)]
pub enum Workspace {
    /// Kept after the run.
    Persistent(PathBuf),
    /// Removed when dropped.
    Temporary(TempDir),
}

impl Workspace {
    pub fn prepare(config: &ForgeConfig) -> ForgeResult<Self> {
        if config.keep {
            std::fs::create_dir_all(&config.frames_dir).map_err(|e| {
                error!(error = ?e, path = %config.frames_dir.display(), "Failed to create frames directory");
                ForgeError::io(&config.frames_dir, e)
            })?;
            Ok(Self::Persistent(config.frames_dir.clone()))
        } else {
            let dir = tempfile::Builder::new()
                .prefix("suvi-forge-")
                .tempdir()
                .map_err(|e| ForgeError::io(std::env::temp_dir(), e))?;
            Ok(Self::Temporary(dir))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Persistent(path) => path,
            Self::Temporary(dir) => dir.path(),
        }
    }

    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ForgeReport {
    pub listing_url: String,
    pub frame_count: usize,
    pub delay_ms: u32,
    pub output: PathBuf,
    pub bytes: u64,
    /// Set when the frames were kept.
    pub frames_dir: Option<PathBuf>,
}

/// Run the whole pipeline with the given transport.
pub async fn forge<T>(config: &ForgeConfig, transport: &T) -> ForgeResult<ForgeReport>
where
    T: Transport + ?Sized,
{
    config.validate()?;
    let base_url = Url::parse(&config.listing_url)
        .map_err(|e| ForgeError::config(format!("listing_url {}: {e}", config.listing_url)))?;

    info!(listing_url = %base_url, "[FORGE] Starting run");
    let listing = fetch_listing(transport, &base_url).await?;
    let urls = resolve(&listing, &base_url, &ListingRules::from(config))?;
    info!(frames = urls.len(), "[FORGE] Found frames");

    let workspace = Workspace::prepare(config)?;
    let frames = fetch_all(
        transport,
        &urls,
        workspace.path(),
        config.concurrency,
        &config.extension,
    )
    .await?;
    info!(path = %workspace.path().display(), kept = workspace.is_kept(), "[FORGE] Frames stored");

    let summary = assemble(&frames, &config.output, &AssembleConfig::from(config))?;
    info!(output = %summary.output.display(), "[FORGE] GIF created");

    Ok(ForgeReport {
        listing_url: base_url.to_string(),
        frame_count: summary.frame_count,
        delay_ms: summary.delay_ms,
        output: summary.output,
        bytes: summary.bytes,
        frames_dir: workspace.is_kept().then(|| workspace.path().to_path_buf()),
    })
}

/// Run the pipeline over real HTTP using the config's request policy.
pub async fn forge_http(config: &ForgeConfig) -> ForgeResult<ForgeReport> {
    let transport = HttpTransport::new(&HttpSettings::from(config))?;
    forge(config, &transport).await
}
