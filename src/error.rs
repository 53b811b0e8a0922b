//! Error taxonomy shared by the resolver, fetcher and assembler.
//!
//! Every variant carries the failing identifier (URL or path) so the operator can
//! see exactly which frame aborted the run.

use std::path::PathBuf;

/// Convenience result type used across the forge pipeline.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Failure of a single HTTP GET issued through a [`crate::contract::Transport`].
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS, redirect or body read failure.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Top-level error returned by the forge pipeline.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// The listing contained no usable frame references.
    #[error("no frame links found in listing at {base_url} (did the page format change?)")]
    EmptyListing { base_url: String },

    /// A single frame (or the listing itself) could not be fetched; aborts the batch.
    #[error("failed to fetch {url}: {source}")]
    FetchFailure {
        url: String,
        #[source]
        source: TransportError,
    },

    /// The assembler was handed zero frames.
    #[error("cannot assemble an animation from zero frames")]
    NoFrames,

    /// A downloaded file is not a decodable image.
    #[error("failed to decode frame {}: {source}", .path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A frame's size differs from the first frame's.
    #[error("frame {} has dimensions {found:?}, expected {expected:?}", .path.display())]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        found: (u32, u32),
    },

    /// The URL has no final path segment to name the local file after.
    #[error("frame URL {url} has no file name")]
    InvalidFrameUrl { url: String },

    /// Two URLs would be stored under the same workspace file name.
    #[error("frame name {name} is shared by more than one URL")]
    DuplicateFrameName { name: String },

    #[error("failed to encode animation to {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ForgeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
