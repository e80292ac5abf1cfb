//! Target-size compression via bounded binary search over quality.

use super::codec::ImageCodec;
use super::params::{ConversionRequest, ConversionResult, Quality, SourceImage};
use super::transcode::convert;
use super::TransformError;

/// Hard cap on transcoder evaluations per search. Each evaluation re-runs
/// the full decode → resample → encode pipeline, so this bounds worst-case
/// cost.
pub const MAX_EVALUATIONS: usize = 10;

/// Lower edge of the quality range the search will consider.
const QUALITY_FLOOR: f32 = 0.1;

/// Upper edge of the quality range the search will consider.
const QUALITY_CEILING: f32 = 1.0;

/// A result is accepted once its size lands in
/// `[target * UNDERSHOOT_BAND, target]`. Overshooting the target is never
/// accepted directly; it always narrows the range for another iteration.
const UNDERSHOOT_BAND: f64 = 0.95;

/// Search for the quality whose encoded size best approaches `target_bytes`.
///
/// The format, dimensions, and aspect policy come from `base_request`; only
/// quality varies. The best evaluation so far (by absolute distance from the
/// target) is always kept, and is returned after the loop exits — whether by
/// landing in the accepted band or by hitting the evaluation cap. There is
/// no "exact match" guarantee: callers that need the target honored must
/// inspect [`ConversionResult::size`] themselves.
///
/// For a lossless base format every evaluation produces the same size, so
/// the search degenerates to returning that size; it still terminates within
/// the cap.
///
/// # Errors
/// Only transcoder failures propagate. A missed target is not an error.
pub fn compress_to_target_size(
    codec: &impl ImageCodec,
    source: &SourceImage,
    target_bytes: usize,
    base_request: &ConversionRequest,
) -> Result<ConversionResult, TransformError> {
    let mut min_quality = QUALITY_FLOOR;
    let mut max_quality = QUALITY_CEILING;
    let mut best: Option<ConversionResult> = None;

    for _ in 0..MAX_EVALUATIONS {
        let quality = (min_quality + max_quality) / 2.0;
        let request = ConversionRequest {
            quality: Quality::new(quality),
            ..base_request.clone()
        };

        let result = convert(codec, source, &request)?;
        let size = result.size();

        let improves = best
            .as_ref()
            .is_none_or(|b| size.abs_diff(target_bytes) < b.size().abs_diff(target_bytes));
        if improves {
            best = Some(result);
        }

        if size > target_bytes {
            max_quality = quality;
        } else if (size as f64) < target_bytes as f64 * UNDERSHOOT_BAND {
            min_quality = quality;
        } else {
            break;
        }
    }

    match best {
        Some(result) => Ok(result),
        // MAX_EVALUATIONS >= 1, so at least one conversion ran, and its
        // error would already have propagated.
        None => unreachable!("search performs at least one evaluation"),
    }
}
