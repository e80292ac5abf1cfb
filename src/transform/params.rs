//! Request and result types for image transformations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level operation modules (which decide sizes,
//! qualities, and stage order) and the [`codec`](super::codec) (which does the
//! actual decode/encode work). This separation allows swapping codecs
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`OutputFormat`] — Target encoding (JPEG, PNG, WebP) with mime/extension mappings.
//! - [`Quality`] — Lossy encoding quality in `[0.0, 1.0]`. Clamped on construction.
//! - [`SourceImage`] — An encoded input: byte buffer plus declared mime type.
//! - [`ConversionRequest`] — Full specification for a transcode: format, quality, target dimensions.
//! - [`ConversionResult`] — Encoded output bytes plus the resolved format and dimensions.
//! - [`EditRequest`] / [`CropRect`] — Geometric edit parameters (rotate, flip, crop).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target encoding for conversion output.
///
/// PNG is lossless: the quality parameter is accepted but has no effect on
/// PNG output. This is a documented exception, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    /// The canonical mime type for this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    /// The preferred file extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// All file extensions commonly used for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            OutputFormat::Jpeg => &["jpg", "jpeg"],
            OutputFormat::Png => &["png"],
            OutputFormat::WebP => &["webp"],
        }
    }

    /// Whether this format encodes without loss (quality is a no-op).
    pub fn is_lossless(self) -> bool {
        matches!(self, OutputFormat::Png)
    }

    /// Map a mime type to a format, if recognized.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" | "image/jpg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }

    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OutputFormat::from_extension(s).ok_or_else(|| format!("unknown image format: {s}"))
    }
}

/// Quality setting for lossy image encoding, in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.92)
    }
}

impl From<f32> for Quality {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(quality: Quality) -> f32 {
        quality.0
    }
}

/// An encoded input image: the original bytes plus the declared mime type.
///
/// Rasters are decoded from this per-operation; no operation mutates the
/// source, and every transform produces a new buffer.
#[derive(Debug, Clone)]
pub struct SourceImage {
    data: Vec<u8>,
    mime: String,
}

impl SourceImage {
    pub fn new(data: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            data,
            mime: mime.into(),
        }
    }

    /// The encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The declared mime type (e.g. `image/jpeg`).
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Byte length of the encoded input.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Parameters for a format conversion.
///
/// Width and height are optional; when both are absent the original size is
/// kept. See [`resolve`](super::dimensions::resolve) for the aspect-ratio
/// policy when one or both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub format: OutputFormat,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default = "default_maintain_aspect_ratio")]
    pub maintain_aspect_ratio: bool,
}

fn default_maintain_aspect_ratio() -> bool {
    true
}

impl ConversionRequest {
    /// A request for `format` at the default quality, keeping the original
    /// size and aspect ratio.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            quality: Quality::default(),
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }

    /// Check the request invariants before any codec work is done.
    ///
    /// Requested dimensions must be at least 1 pixel. (The unsigned type
    /// already rules out negatives; zero is the remaining degenerate case.)
    pub fn validate(&self) -> Result<(), super::TransformError> {
        if self.width == Some(0) || self.height == Some(0) {
            return Err(super::TransformError::InvalidDimension(
                "requested dimensions must be at least 1 pixel".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a conversion: the encoded bytes plus what they actually are.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl ConversionResult {
    /// Byte length of the encoded output.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A crop rectangle in pixel units of the raster *as it exists after
/// rotate and flip have been applied*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Parameters for a geometric edit. Stages apply in fixed order:
/// rotate, then flip, then crop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditRequest {
    /// Rotation in degrees, clockwise. Any integer; normalized mod 360.
    pub rotation: i32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub crop: Option<CropRect>,
}

impl EditRequest {
    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> u32 {
        self.rotation.rem_euclid(360) as u32
    }

    /// True when every stage is an identity and `apply` will pass the
    /// raster through untouched.
    pub fn is_identity(&self) -> bool {
        self.normalized_rotation() == 0
            && !self.flip_horizontal
            && !self.flip_vertical
            && self.crop.is_none()
    }
}
