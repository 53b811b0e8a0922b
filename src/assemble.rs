//! Frame assembler: decodes the reconciled frame list and bakes one looping GIF.
//!
//! Frames are quantised to an adaptive 256-colour palette (NeuQuant, as performed by the
//! `image` GIF encoder) and written in input order with a fixed per-frame delay. No
//! size-optimisation pass runs after encoding.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageError, ImageReader, RgbaImage};
use tracing::{debug, error, info};

use crate::config::ForgeConfig;
use crate::contract::FrameFile;
use crate::download::write_atomic;
use crate::error::{ForgeError, ForgeResult};

#[derive(Debug, Clone, Copy)]
pub struct AssembleConfig {
    pub fps: NonZeroU32,
    /// NeuQuant sampling speed, 1..=30.
    pub quantizer_speed: i32,
}

impl Default for AssembleConfig {
    fn default() -> Self {
        Self {
            fps: NonZeroU32::new(4).unwrap_or(NonZeroU32::MIN),
            quantizer_speed: 10,
        }
    }
}

impl From<&ForgeConfig> for AssembleConfig {
    fn from(config: &ForgeConfig) -> Self {
        Self {
            fps: config.fps,
            quantizer_speed: config.quantizer_speed,
        }
    }
}

/// `round(1000 / fps)` milliseconds.
pub fn frame_delay_ms(fps: NonZeroU32) -> u32 {
    let fps = u64::from(fps.get());
    // At most 1000, so the narrowing is lossless.
    ((2000 + fps) / (2 * fps)) as u32
}

fn check_quantizer_speed(speed: i32) -> ForgeResult<()> {
    if (1..=30).contains(&speed) {
        return Ok(());
    }
    error!(speed, "[ASSEMBLE][ERROR] Quantizer speed out of range");
    Err(ForgeError::config(format!(
        "quantizer_speed must be within 1..=30, got {speed}"
    )))
}

/// Decoded frames plus timing, ready to be written once.
#[derive(Debug)]
pub struct AssembledAnimation {
    pub frames: Vec<RgbaImage>,
    pub delay_ms: u32,
    pub repeat: Repeat,
}

/// What was written by [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationSummary {
    pub output: PathBuf,
    pub frame_count: usize,
    pub delay_ms: u32,
    pub bytes: u64,
}

impl AssembledAnimation {
    /// Decode every frame in order. The first frame fixes the canvas size.
    pub fn decode(frames: &[FrameFile], fps: NonZeroU32) -> ForgeResult<Self> {
        let (first, rest) = frames.split_first().ok_or_else(|| {
            error!("[ASSEMBLE][ERROR] Assembler called with no frames");
            ForgeError::NoFrames
        })?;

        let base = decode_frame(&first.path)?;
        let expected = base.dimensions();
        let mut images = Vec::with_capacity(frames.len());
        images.push(base);

        for frame in rest {
            let image = decode_frame(&frame.path)?;
            if image.dimensions() != expected {
                error!(
                    path = %frame.path.display(),
                    ?expected,
                    found = ?image.dimensions(),
                    "[ASSEMBLE][ERROR] Frame size differs from base frame"
                );
                return Err(ForgeError::DimensionMismatch {
                    path: frame.path.clone(),
                    expected,
                    found: image.dimensions(),
                });
            }
            images.push(image);
        }

        Ok(Self {
            frames: images,
            delay_ms: frame_delay_ms(fps),
            repeat: Repeat::Infinite,
        })
    }

    /// Encode to GIF and write `output`, replacing any existing file.
    pub fn write_gif(self, output: &Path, quantizer_speed: i32) -> ForgeResult<AnimationSummary> {
        check_quantizer_speed(quantizer_speed)?;
        let frame_count = self.frames.len();
        let delay_ms = self.delay_ms;
        let encode_err = |source: ImageError| {
            error!(error = %source, path = %output.display(), "[ASSEMBLE][ERROR] GIF encoding failed");
            ForgeError::Encode {
                path: output.to_path_buf(),
                source,
            }
        };

        let mut buf = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut buf, quantizer_speed);
            encoder.set_repeat(self.repeat).map_err(encode_err)?;
            let delay = Delay::from_numer_denom_ms(delay_ms, 1);
            encoder
                .encode_frames(
                    self.frames
                        .into_iter()
                        .map(|image| Frame::from_parts(image, 0, 0, delay)),
                )
                .map_err(encode_err)?;
        }

        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir).map_err(|e| ForgeError::io(dir, e))?;
        write_atomic(output, &buf)?;

        Ok(AnimationSummary {
            output: output.to_path_buf(),
            frame_count,
            delay_ms,
            bytes: buf.len() as u64,
        })
    }
}

/// Decode `frames` in order and write them as an infinitely looping GIF at `output`.
pub fn assemble(
    frames: &[FrameFile],
    output: &Path,
    config: &AssembleConfig,
) -> ForgeResult<AnimationSummary> {
    info!(
        frames = frames.len(),
        fps = config.fps.get(),
        output = %output.display(),
        "[ASSEMBLE] Building GIF"
    );
    check_quantizer_speed(config.quantizer_speed)?;
    let animation = AssembledAnimation::decode(frames, config.fps)?;
    let summary = animation.write_gif(output, config.quantizer_speed)?;
    info!(
        frames = summary.frame_count,
        delay_ms = summary.delay_ms,
        bytes = summary.bytes,
        output = %summary.output.display(),
        "[ASSEMBLE] GIF written"
    );
    Ok(summary)
}

fn decode_frame(path: &Path) -> ForgeResult<RgbaImage> {
    let decode_err = |source: ImageError| {
        error!(error = %source, path = %path.display(), "[ASSEMBLE][ERROR] Failed to decode frame");
        ForgeError::DecodeFailure {
            path: path.to_path_buf(),
            source,
        }
    };
    let image = ImageReader::open(path)
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)?;
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Decoded frame");
    Ok(image.into_rgba8())
}
