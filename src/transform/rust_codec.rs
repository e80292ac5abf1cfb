//! Pure in-memory image codec.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless, quality ignored) |
//! | Encode → WebP | `webp` crate (libwebp; the `image` crate's WebP encoder is lossless-only) |
//!
//! ## Alpha policy
//!
//! Working rasters are RGBA8. PNG and WebP carry the alpha channel through
//! unchanged. JPEG has no alpha: rasters are flattened onto an opaque white
//! background before encoding, so fully transparent pixels come out white
//! rather than black.

use super::codec::{CodecError, ImageCodec};
use super::params::{OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage, RgbaImage};

/// In-memory codec using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping and the
/// alpha flattening policy.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a declared mime type to a decoder format, if we recognize it.
fn decode_format(mime: &str) -> Option<ImageFormat> {
    match mime {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Flatten an RGBA raster onto an opaque white background.
///
/// Used for JPEG output, which has no alpha channel. Plain channel dropping
/// would render transparent regions black; compositing keeps them white.
fn flatten_onto_white(raster: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(raster.width(), raster.height(), |x, y| {
        let [r, g, b, a] = raster.get_pixel(x, y).0;
        let alpha = a as u16;
        let blend = |c: u8| ((c as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Scale a `[0.0, 1.0]` quality to the 1–100 range lossy encoders expect.
fn scale_quality(quality: Quality) -> u8 {
    ((quality.value() * 100.0).round() as u8).clamp(1, 100)
}

impl ImageCodec for RustCodec {
    fn decode(&self, data: &[u8], mime: &str) -> Result<RgbaImage, CodecError> {
        // Unknown mime types fall back to magic-byte detection, so a
        // misdeclared but well-formed input still decodes.
        let decoded = match decode_format(mime) {
            Some(format) => image::load_from_memory_with_format(data, format),
            None => image::load_from_memory(data),
        };
        decoded
            .map(|img| img.into_rgba8())
            .map_err(|e| CodecError::Decode(format!("{mime}: {e}")))
    }

    fn encode(
        &self,
        raster: &RgbaImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        let (width, height) = raster.dimensions();
        match format {
            OutputFormat::Jpeg => {
                let rgb = flatten_onto_white(raster);
                let mut buf = Vec::new();
                JpegEncoder::new_with_quality(&mut buf, scale_quality(quality))
                    .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                    .map_err(|e| CodecError::Encode(format!("jpeg: {e}")))?;
                Ok(buf)
            }
            OutputFormat::Png => {
                // Lossless: the quality argument is deliberately unused.
                let mut buf = Vec::new();
                PngEncoder::new(&mut buf)
                    .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                    .map_err(|e| CodecError::Encode(format!("png: {e}")))?;
                Ok(buf)
            }
            OutputFormat::WebP => {
                let encoder = webp::Encoder::from_rgba(raster.as_raw(), width, height);
                let memory = encoder.encode(quality.value() * 100.0);
                Ok(memory.to_vec())
            }
        }
    }
}
