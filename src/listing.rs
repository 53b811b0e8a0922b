//! Listing resolver: turns a directory-index page into the set of frame URLs to fetch.
//!
//! The index is scanned for `href="…"` attributes ending in the frame extension. Each
//! reference is joined onto the listing's base URL, the alias entry (a duplicate of the
//! newest frame under a fixed name) is dropped, and the survivors are deduplicated and
//! sorted by their string form.

use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::ForgeConfig;
use crate::contract::FrameUrl;
use crate::error::{ForgeError, ForgeResult};

/// What counts as a frame reference in a listing.
#[derive(Debug, Clone)]
pub struct ListingRules {
    /// Extension without the dot, matched case-insensitively.
    pub extension: String,
    /// Terminal path segment that marks the alias entry.
    pub alias: String,
}

impl ListingRules {
    pub fn new(extension: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            alias: alias.into(),
        }
    }

    fn href_pattern(&self) -> ForgeResult<Regex> {
        let pattern = format!(r#"href="([^"]+\.{})""#, regex::escape(&self.extension));
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ForgeError::config(format!("bad extension {:?}: {e}", self.extension)))
    }
}

impl Default for ListingRules {
    fn default() -> Self {
        Self::new("png", "latest.png")
    }
}

impl From<&ForgeConfig> for ListingRules {
    fn from(config: &ForgeConfig) -> Self {
        Self::new(config.extension.clone(), config.alias.clone())
    }
}

/// Resolve every frame reference in `content` against `base_url`.
///
/// Fails with [`ForgeError::EmptyListing`] when nothing usable remains.
pub fn resolve(content: &str, base_url: &Url, rules: &ListingRules) -> ForgeResult<Vec<FrameUrl>> {
    let href = rules.href_pattern()?;
    let mut urls = BTreeSet::new();

    for caps in href.captures_iter(content) {
        let reference = &caps[1];
        let resolved = match base_url.join(reference) {
            Ok(url) => FrameUrl::from(url),
            Err(e) => {
                warn!(reference, error = %e, "Skipping unresolvable href");
                continue;
            }
        };
        if is_alias(&resolved, &rules.alias) {
            debug!(url = %resolved, "Dropping alias entry");
            continue;
        }
        urls.insert(resolved);
    }

    if urls.is_empty() {
        error!(base_url = %base_url, "Listing contained no frame links");
        return Err(ForgeError::EmptyListing {
            base_url: base_url.to_string(),
        });
    }

    info!(count = urls.len(), base_url = %base_url, "Resolved frame URLs from listing");
    Ok(urls.into_iter().collect())
}

fn is_alias(url: &FrameUrl, alias: &str) -> bool {
    url.file_name().map(|name| name == alias).unwrap_or(false)
}
