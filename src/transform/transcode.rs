//! Format conversion: decode, resample, encode.
//!
//! This is the workhorse operation the rest of the crate composes: the
//! target-size search re-runs it per evaluation, the batch coordinator runs
//! it per input, and smart compression runs it with a recommended request.

use super::codec::ImageCodec;
use super::params::{ConversionRequest, ConversionResult, SourceImage};
use super::{TransformError, dimensions};
use image::imageops::FilterType;

/// Convert a source image to the requested format, quality, and size.
///
/// Request invariants are checked before the codec is touched, so an invalid
/// request costs no decode. The source is never modified; resampling (when
/// the resolved size differs from the decoded size) uses Lanczos3.
///
/// # Errors
/// - [`TransformError::InvalidDimension`] for a zero requested dimension.
/// - [`TransformError::Codec`] when decode or encode fails.
pub fn convert(
    codec: &impl ImageCodec,
    source: &SourceImage,
    request: &ConversionRequest,
) -> Result<ConversionResult, TransformError> {
    request.validate()?;

    let raster = codec.decode(source.data(), source.mime())?;
    let (width, height) = dimensions::resolve(raster.width(), raster.height(), request)?;

    let raster = if (width, height) != raster.dimensions() {
        image::imageops::resize(&raster, width, height, FilterType::Lanczos3)
    } else {
        raster
    };

    let bytes = codec.encode(&raster, request.format, request.quality)?;

    Ok(ConversionResult {
        bytes,
        format: request.format,
        width,
        height,
    })
}
