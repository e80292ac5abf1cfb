//! Image codec trait and shared error types.
//!
//! The [`ImageCodec`] trait defines the two capabilities every codec must
//! support: decode encoded bytes into an RGBA raster, and encode a raster
//! into one of the supported output formats.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec) — pure in-memory, backed by
//! the `image` crate plus libwebp for lossy WebP. Every operation in this
//! crate is codec-agnostic: tests swap in a recording mock.

use super::params::{OutputFormat, Quality};
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    /// The input bytes could not be read as an image (corrupt or unsupported).
    #[error("decode failed: {0}")]
    Decode(String),
    /// The codec could not produce output for the requested format.
    #[error("encode failed: {0}")]
    Encode(String),
    /// The requested output format is not available in this codec.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Trait for image codecs.
///
/// Every codec must implement both operations — decode and encode — so the
/// rest of the crate is codec-agnostic. Rasters are row-major RGBA8 with a
/// full alpha channel; formats without alpha handle flattening at encode
/// time (see the codec implementation for its documented fill policy).
pub trait ImageCodec {
    /// Decode encoded bytes (with their declared mime type) into a raster.
    fn decode(&self, data: &[u8], mime: &str) -> Result<RgbaImage, CodecError>;

    /// Encode a raster at the given format and quality.
    ///
    /// Quality is ignored for lossless formats.
    fn encode(
        &self,
        raster: &RgbaImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;
}

/// Trait for animated-frame encoders consuming a prepared
/// [`FrameSet`](super::frames::FrameSet).
///
/// This crate only normalizes frames; the bitstream itself is produced by an
/// external collaborator implementing this trait.
pub trait FrameEncoder {
    fn encode(&self, frames: &super::frames::FrameSet) -> Result<Vec<u8>, CodecError>;
}
