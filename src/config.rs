// suvi-forge/src/config.rs

use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ForgeError, ForgeResult};

pub const DEFAULT_LISTING_URL: &str =
    "https://services.swpc.noaa.gov/images/animations/suvi/primary/284/";
pub const DEFAULT_REFERER: &str = "https://www.swpc.noaa.gov/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (+suvi-forge)";

/// Every knob of a forge run. All fields have defaults so a YAML file only needs the
/// values it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Directory index to scrape.
    pub listing_url: String,
    /// Where the finished GIF is written.
    pub output: PathBuf,
    /// Maximum simultaneous frame downloads.
    pub concurrency: NonZeroUsize,
    pub fps: NonZeroU32,
    pub timeout_secs: u64,
    pub referer: String,
    pub user_agent: String,
    /// Frame file extension, without the dot.
    pub extension: String,
    /// Listing entry that duplicates the newest frame.
    pub alias: String,
    /// Retain downloaded frames in `frames_dir` instead of a temporary directory.
    pub keep: bool,
    pub frames_dir: PathBuf,
    /// NeuQuant sampling speed, 1 (best) to 30 (fastest).
    pub quantizer_speed: i32,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            output: PathBuf::from("suvi_284_live.gif"),
            concurrency: NonZeroUsize::new(8).unwrap_or(NonZeroUsize::MIN),
            fps: NonZeroU32::new(4).unwrap_or(NonZeroU32::MIN),
            timeout_secs: 30,
            referer: DEFAULT_REFERER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extension: "png".to_string(),
            alias: "latest.png".to_string(),
            keep: false,
            frames_dir: PathBuf::from("frames"),
            quantizer_speed: 10,
        }
    }
}

impl ForgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject values that would make a component misbehave rather than fail loudly.
    pub fn validate(&self) -> ForgeResult<()> {
        if url::Url::parse(&self.listing_url).is_err() {
            return Err(ForgeError::config(format!(
                "listing_url is not an absolute URL: {}",
                self.listing_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ForgeError::config("timeout_secs must be at least 1"));
        }
        if !(1..=30).contains(&self.quantizer_speed) {
            return Err(ForgeError::config(format!(
                "quantizer_speed must be within 1..=30, got {}",
                self.quantizer_speed
            )));
        }
        if self.extension.is_empty() || self.extension.contains('.') {
            return Err(ForgeError::config(
                "extension must be non-empty and given without a dot",
            ));
        }
        if self.alias.is_empty() {
            return Err(ForgeError::config("alias must not be empty"));
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            listing_url = %self.listing_url,
            output = %self.output.display(),
            concurrency = self.concurrency.get(),
            fps = self.fps.get(),
            keep = self.keep,
            "Loaded ForgeConfig"
        );
        debug!(?self, "ForgeConfig loaded (full debug)");
    }
}
