//! Content-aware compression settings ("smart compress").
//!
//! A small sample of the raster drives a recommendation: transparency pushes
//! output to PNG (the only supported format that keeps alpha lossless), and
//! per-pixel color spread picks a quality tier — flat graphics tolerate
//! heavier compression than detailed photos.
//!
//! The module is split the same way as dimension handling: [`analyze`] is a
//! pure measurement pass, [`recommend`] is a pure decision table over the
//! measurement, and [`smart_compress`] wires both to the transcoder.

use super::codec::ImageCodec;
use super::params::{ConversionRequest, ConversionResult, OutputFormat, Quality, SourceImage};
use super::transcode::convert;
use super::TransformError;
use image::RgbaImage;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Sampling never reads more than this many pixels per axis.
pub const MAX_SAMPLE_EDGE: u32 = 100;

/// Tunable decision bounds for [`recommend`].
///
/// These are empirical constants, not derived from a model; they live in the
/// `[classifier]` section of the config file so deployments can adjust them
/// without a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierThresholds {
    /// Fraction of non-opaque sampled pixels above which output switches to
    /// PNG to preserve transparency.
    pub transparency_threshold: f32,
    /// Mean color spread below which an image counts as flat (solid fills,
    /// screenshots, diagrams).
    pub flat_variance: f32,
    /// Mean color spread below which an image counts as moderately detailed.
    pub moderate_variance: f32,
    /// Quality for flat content.
    pub flat_quality: f32,
    /// Quality for moderately detailed content.
    pub moderate_quality: f32,
    /// Quality for detailed content (photos, noise, texture).
    pub detailed_quality: f32,
    /// Quality used alongside the PNG switch for transparent content.
    pub transparent_quality: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            transparency_threshold: 0.1,
            flat_variance: 30.0,
            moderate_variance: 60.0,
            flat_quality: 0.70,
            moderate_quality: 0.85,
            detailed_quality: 0.92,
            transparent_quality: 1.0,
        }
    }
}

/// Measured properties of a sampled raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentProfile {
    /// Fraction of sampled pixels with alpha below 255.
    pub transparency_ratio: f32,
    /// Mean over sampled pixels of `|R-avg| + |G-avg| + |B-avg|` where
    /// `avg = (R+G+B)/3`. Measures per-pixel color spread, not spatial
    /// frequency: grayscale content scores 0 regardless of detail.
    pub avg_variance: f32,
}

/// Measure transparency and color spread over a bounded sample.
///
/// The raster is stretch-downsampled so each axis is at most
/// [`MAX_SAMPLE_EDGE`] pixels (axes clamp independently; aspect ratio is not
/// preserved for sampling), bounding cost regardless of input size.
pub fn analyze(raster: &RgbaImage) -> ContentProfile {
    let sample_w = raster.width().min(MAX_SAMPLE_EDGE);
    let sample_h = raster.height().min(MAX_SAMPLE_EDGE);

    let sampled_storage;
    let sampled = if (sample_w, sample_h) != raster.dimensions() {
        sampled_storage = image::imageops::resize(raster, sample_w, sample_h, FilterType::Triangle);
        &sampled_storage
    } else {
        raster
    };

    let mut total_variance = 0.0f64;
    let mut transparent = 0usize;
    for pixel in sampled.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < 255 {
            transparent += 1;
        }
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let avg = (r + g + b) / 3.0;
        total_variance += (r - avg).abs() + (g - avg).abs() + (b - avg).abs();
    }

    let count = (sampled.width() * sampled.height()) as f64;
    ContentProfile {
        transparency_ratio: (transparent as f64 / count) as f32,
        avg_variance: (total_variance / count) as f32,
    }
}

/// Turn a measured profile into a concrete request. First match wins:
/// transparency forces PNG; otherwise color spread picks the quality tier.
/// All other request fields are copied from `request` unchanged.
pub fn recommend(
    profile: &ContentProfile,
    request: &ConversionRequest,
    thresholds: &ClassifierThresholds,
) -> ConversionRequest {
    let mut recommended = request.clone();

    if profile.transparency_ratio > thresholds.transparency_threshold {
        recommended.format = OutputFormat::Png;
        recommended.quality = Quality::new(thresholds.transparent_quality);
    } else if profile.avg_variance < thresholds.flat_variance {
        recommended.quality = Quality::new(thresholds.flat_quality);
    } else if profile.avg_variance < thresholds.moderate_variance {
        recommended.quality = Quality::new(thresholds.moderate_quality);
    } else {
        recommended.quality = Quality::new(thresholds.detailed_quality);
    }

    recommended
}

/// Analyze the source and convert it with the recommended settings.
///
/// The analysis pass decodes the source once for sampling; the conversion
/// decodes it again, like every other transcoder entry point.
pub fn smart_compress(
    codec: &impl ImageCodec,
    source: &SourceImage,
    request: &ConversionRequest,
    thresholds: &ClassifierThresholds,
) -> Result<ConversionResult, TransformError> {
    request.validate()?;
    let raster = codec.decode(source.data(), source.mime())?;
    let profile = analyze(&raster);
    let recommended = recommend(&profile, request, thresholds);
    convert(codec, source, &recommended)
}
