#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use suvi_forge::contract::{FrameUrl, Transport};
use suvi_forge::TransportError;
use url::Url;

/// A solid-colour PNG.
pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png)
        .expect("encode test PNG");
    cursor.into_inner()
}

pub fn frame_urls(base: &str, names: &[&str]) -> Vec<FrameUrl> {
    names
        .iter()
        .map(|n| FrameUrl::parse(&format!("{base}{n}")).expect("valid test URL"))
        .collect()
}

/// Transport that serves canned bodies after a per-URL delay and records how many
/// requests were outstanding at once.
#[derive(Default)]
pub struct ProbeTransport {
    bodies: HashMap<String, Vec<u8>>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    started: AtomicUsize,
}

impl ProbeTransport {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            default_delay,
            ..Self::default()
        }
    }

    pub fn serve(mut self, url: &FrameUrl, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    pub fn delay(mut self, url: &FrameUrl, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Fail `url` with HTTP 500, immediately.
    pub fn fail(mut self, url: &FrameUrl) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ProbeTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url.as_str()) {
            return Err(TransportError::Status { status: 500 });
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let delay = self
            .delays
            .get(url.as_str())
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.bodies
            .get(url.as_str())
            .cloned()
            .ok_or(TransportError::Status { status: 404 })
    }
}
