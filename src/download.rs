//! Bounded fetcher: downloads every frame into the workspace under a concurrency cap.
//!
//! # Responsibilities
//! - At most `concurrency` requests are in flight (`buffer_unordered` over one stream)
//! - Fail-fast: the first failed fetch ends the batch; the remaining in-flight futures are
//!   dropped with the stream, which cancels their requests
//! - Each body is written to a temp file in the workspace and renamed into place
//! - After the batch, the workspace is re-listed and sorted by file name; that listing,
//!   not completion order, is the result
//!
//! Files written before a failure stay in the workspace.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::{redirect, Client};
use tracing::{debug, error, info};
use url::Url;

use crate::config::ForgeConfig;
use crate::contract::{FrameFile, FrameUrl, Transport};
use crate::error::{ForgeError, ForgeResult, TransportError};

/// Static request policy applied to every GET.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub referer: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Upper bound on idle pooled connections per host.
    pub max_connections: usize,
}

impl From<&ForgeConfig> for HttpSettings {
    fn from(config: &ForgeConfig) -> Self {
        Self {
            referer: config.referer.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            max_connections: config.concurrency.get(),
        }
    }
}

/// reqwest-backed [`Transport`]: fixed headers, per-request timeout, follows redirects.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &HttpSettings) -> ForgeResult<Self> {
        let referer = HeaderValue::from_str(&settings.referer)
            .map_err(|e| ForgeError::config(format!("invalid referer header: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, referer);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .redirect(redirect::Policy::limited(10))
            .pool_max_idle_per_host(settings.max_connections)
            .build()
            .map_err(|e| ForgeError::config(format!("failed to build HTTP client: {e}")))?;

        debug!(
            referer = %settings.referer,
            user_agent = %settings.user_agent,
            timeout = ?settings.timeout,
            "Built HTTP transport"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(classify)?;
        Ok(body.to_vec())
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(e)
    }
}

/// Fetch the listing page as text.
pub async fn fetch_listing<T>(transport: &T, url: &Url) -> ForgeResult<String>
where
    T: Transport + ?Sized,
{
    info!(url = %url, "[FETCH] Scraping listing");
    let body = transport.get(url).await.map_err(|source| {
        error!(url = %url, error = %source, "[FETCH][ERROR] Listing request failed");
        ForgeError::FetchFailure {
            url: url.to_string(),
            source,
        }
    })?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Download every URL into `workspace` and return the stored frames sorted by file name.
pub async fn fetch_all<T>(
    transport: &T,
    urls: &[FrameUrl],
    workspace: &Path,
    concurrency: NonZeroUsize,
    extension: &str,
) -> ForgeResult<Vec<FrameFile>>
where
    T: Transport + ?Sized,
{
    fs::create_dir_all(workspace).map_err(|e| {
        error!(error = ?e, path = %workspace.display(), "Failed to create workspace");
        ForgeError::io(workspace, e)
    })?;

    // Name every destination before the first request so a bad URL costs no traffic.
    let jobs = plan_destinations(urls, workspace)?;
    let total = jobs.len();
    let completed = AtomicUsize::new(0);
    info!(
        total,
        concurrency = concurrency.get(),
        workspace = %workspace.display(),
        "[FETCH] Downloading frames"
    );

    let sizes: Vec<u64> = stream::iter(jobs)
        .map(|(url, dest)| {
            let completed = &completed;
            async move {
                let size = fetch_one(transport, url, &dest).await?;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(url = %url, done, total, size, "[FETCH] Frame stored");
                Ok::<u64, ForgeError>(size)
            }
        })
        .buffer_unordered(concurrency.get())
        .try_collect()
        .await?;

    info!(
        frames = sizes.len(),
        bytes = sizes.iter().sum::<u64>(),
        "[FETCH] All frames downloaded"
    );

    list_frames(workspace, extension)
}

fn plan_destinations<'a>(
    urls: &'a [FrameUrl],
    workspace: &Path,
) -> ForgeResult<Vec<(&'a FrameUrl, PathBuf)>> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(urls.len());
    for url in urls {
        let name = url.file_name()?;
        if !seen.insert(name) {
            error!(name, url = %url, "Two frame URLs share a file name");
            return Err(ForgeError::DuplicateFrameName {
                name: name.to_string(),
            });
        }
        jobs.push((url, workspace.join(name)));
    }
    Ok(jobs)
}

async fn fetch_one<T>(transport: &T, url: &FrameUrl, dest: &Path) -> ForgeResult<u64>
where
    T: Transport + ?Sized,
{
    let body = transport.get(url.as_url()).await.map_err(|source| {
        error!(url = %url, error = %source, "[FETCH][ERROR] Frame request failed");
        ForgeError::FetchFailure {
            url: url.to_string(),
            source,
        }
    })?;
    write_atomic(dest, &body)?;
    Ok(body.len() as u64)
}

/// Write `bytes` next to `dest` and rename into place, so a reader never sees a torn frame.
pub(crate) fn write_atomic(dest: &Path, bytes: &[u8]) -> ForgeResult<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ForgeError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| ForgeError::io(tmp.path(), e))?;
    tmp.persist(dest).map_err(|e| {
        error!(error = ?e.error, path = %dest.display(), "Failed to move file into place");
        ForgeError::io(dest, e.error)
    })?;
    Ok(())
}

/// Every file in `workspace` with the given extension (case-insensitive), sorted by name.
pub fn list_frames(workspace: &Path, extension: &str) -> ForgeResult<Vec<FrameFile>> {
    let entries = fs::read_dir(workspace).map_err(|e| ForgeError::io(workspace, e))?;
    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ForgeError::io(workspace, e))?;
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        let metadata = entry.metadata().map_err(|e| ForgeError::io(&path, e))?;
        if !metadata.is_file() {
            continue;
        }
        frames.push(FrameFile {
            path,
            size: metadata.len(),
        });
    }
    frames.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    debug!(count = frames.len(), workspace = %workspace.display(), "Reconciled workspace listing");
    Ok(frames)
}
