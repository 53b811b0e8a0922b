//! # contract: shared data model and the network seam
//!
//! This module defines the types that flow between the pipeline stages and the single
//! trait ([`Transport`]) through which every HTTP GET is issued.
//!
//! ## Types
//! - [`FrameUrl`]: an absolute frame URL, ordered and compared by its string form.
//! - [`FrameFile`]: a frame stored in the workspace, named after its URL's last segment.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall` so tests can inject failing or slow transports
//!   without a network. Production code uses [`crate::download::HttpTransport`].

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
#[allow(unused_imports)]
use mockall::{automock, predicate::*};
use url::Url;

use crate::error::{ForgeError, TransportError};

/// An absolute URL identifying one remote frame.
///
/// Equality and ordering follow the exact serialized string, so sorting a set of
/// `FrameUrl`s is a plain lexicographic sort of the URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameUrl(Url);

impl FrameUrl {
    /// Parse an absolute URL.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Final path segment, used as the local file name.
    pub fn file_name(&self) -> Result<&str, ForgeError> {
        self.0
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .ok_or_else(|| ForgeError::InvalidFrameUrl {
                url: self.0.to_string(),
            })
    }
}

impl From<Url> for FrameUrl {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl Ord for FrameUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for FrameUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FrameUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame stored in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFile {
    pub path: PathBuf,
    pub size: u64,
}

impl FrameFile {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Issues one HTTP GET and returns the full response body.
///
/// Implementations own the static request policy (headers, timeout, redirects);
/// callers only decide *which* URLs to fetch and how many at once.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`. Any non-success status must be reported as an error.
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;
}
