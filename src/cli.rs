//! CLI glue: argument parsing, config merging and the programmatic entrypoint.
//!
//! All pipeline logic lives in [`crate::forge`]; this module only turns flags (and an
//! optional YAML file) into a [`ForgeConfig`] and reports the outcome.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::ForgeConfig;
use crate::forge::{forge_http, ForgeReport};
use crate::load_config::load_config;

/// CLI for suvi-forge: scrape a frame directory and bake an animated GIF.
#[derive(Parser, Debug)]
#[clap(
    name = "suvi-forge",
    version,
    about = "Live-scrape SUVI 284 Å frames and build an animated GIF"
)]
pub struct Cli {
    /// Optional YAML config file; flags override its values
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Directory listing to scrape (default: SUVI 284 primary)
    #[clap(long)]
    pub dir_url: Option<String>,

    /// Output GIF filename
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Max simultaneous downloads
    #[clap(long)]
    pub concurrency: Option<NonZeroUsize>,

    /// Frames per second in the final GIF
    #[clap(long)]
    pub fps: Option<NonZeroU32>,

    /// Per-request timeout in seconds
    #[clap(long)]
    pub timeout: Option<u64>,

    /// Retain downloaded frames (otherwise a temporary directory is used)
    #[clap(long)]
    pub keep: bool,

    /// Where kept frames are stored
    #[clap(long)]
    pub frames_dir: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[clap(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    pub fn resolve_config(&self) -> Result<ForgeConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ForgeConfig::default(),
        };
        if let Some(url) = &self.dir_url {
            config.listing_url = url.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if self.keep {
            config.keep = true;
        }
        if let Some(dir) = &self.frames_dir {
            config.frames_dir = dir.clone();
        }
        config.validate().context("Invalid command-line options")?;
        Ok(config)
    }
}

/// Install the global subscriber. Logs go to stderr so stdout carries only the report.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<ForgeReport> {
    let config = cli.resolve_config()?;
    config.trace_loaded();

    match forge_http(&config).await {
        Ok(report) => {
            tracing::info!(frames = report.frame_count, "Forge complete");
            Ok(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "Forge failed");
            Err(anyhow::Error::new(e))
        }
    }
}
