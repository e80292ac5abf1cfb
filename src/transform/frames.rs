//! Frame normalization for animated-image assembly.
//!
//! Decodes a list of sources and stretches every raster to one uniform size,
//! producing a [`FrameSet`] ready for an external
//! [`FrameEncoder`](super::codec::FrameEncoder). No bitstream work happens
//! here.
//!
//! Frame resampling is a direct stretch to the target box — deliberately
//! *not* aspect-preserving, unlike the conversion path. Mixed-size inputs
//! must all land on identical dimensions for the animation to assemble, and
//! distortion is the accepted trade. Frame order equals input order;
//! reordering is the caller's job before calling in.

use super::TransformError;
use super::codec::ImageCodec;
use super::params::SourceImage;
use image::RgbaImage;
use image::imageops::FilterType;

/// Target geometry and timing for a frame set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOptions {
    pub width: u32,
    pub height: u32,
    /// Delay between frames, in seconds.
    pub interval: f32,
}

/// An ordered set of uniformly sized frames plus their timing.
#[derive(Debug, Clone)]
pub struct FrameSet {
    pub frames: Vec<RgbaImage>,
    pub width: u32,
    pub height: u32,
    /// Delay between frames, in seconds.
    pub interval: f32,
}

impl FrameSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Decode every input and stretch each raster to exactly
/// `(options.width, options.height)`.
///
/// # Errors
/// - [`TransformError::InvalidDimension`] for a zero target dimension or a
///   non-positive interval (checked before any decode).
/// - [`TransformError::Codec`] when any input fails to decode.
pub fn prepare(
    codec: &impl ImageCodec,
    inputs: &[SourceImage],
    options: &FrameOptions,
) -> Result<FrameSet, TransformError> {
    if options.width == 0 || options.height == 0 {
        return Err(TransformError::InvalidDimension(
            "frame dimensions must be at least 1 pixel".to_string(),
        ));
    }
    if !(options.interval > 0.0) {
        return Err(TransformError::InvalidDimension(
            "frame interval must be positive".to_string(),
        ));
    }

    let mut frames = Vec::with_capacity(inputs.len());
    for source in inputs {
        let raster = codec.decode(source.data(), source.mime())?;
        let frame = if raster.dimensions() == (options.width, options.height) {
            raster
        } else {
            image::imageops::resize(&raster, options.width, options.height, FilterType::Lanczos3)
        };
        frames.push(frame);
    }

    Ok(FrameSet {
        frames,
        width: options.width,
        height: options.height,
        interval: options.interval,
    })
}
