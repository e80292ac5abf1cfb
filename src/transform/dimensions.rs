//! Pure calculation functions for target dimensions.
//!
//! All functions here are pure and testable without any codec or pixel work.

use super::TransformError;
use super::params::ConversionRequest;

/// Resolve the output dimensions for a conversion.
///
/// Policy, in order:
/// - Neither width nor height requested → the original size.
/// - `maintain_aspect_ratio = false` → the requested dimensions, each axis
///   independently falling back to the original (the ratio may distort).
/// - Aspect-preserving with one dimension → the other is derived from the
///   source ratio and rounded.
/// - Aspect-preserving with both dimensions → fit-inside (letterbox): the
///   result never exceeds the requested box on either axis.
///
/// Extreme ratios can round a derived dimension to zero; outputs are floored
/// at 1 pixel.
///
/// # Errors
/// [`TransformError::InvalidDimension`] when a requested dimension is zero,
/// or when the source raster has zero area.
pub fn resolve(
    orig_w: u32,
    orig_h: u32,
    request: &ConversionRequest,
) -> Result<(u32, u32), TransformError> {
    request.validate()?;
    if orig_w == 0 || orig_h == 0 {
        return Err(TransformError::InvalidDimension(
            "source raster has zero area".to_string(),
        ));
    }

    let resolved = match (request.width, request.height) {
        (None, None) => (orig_w, orig_h),
        _ if !request.maintain_aspect_ratio => (
            request.width.unwrap_or(orig_w),
            request.height.unwrap_or(orig_h),
        ),
        (Some(w), None) => {
            let ratio = orig_w as f64 / orig_h as f64;
            (w, round_dim(w as f64 / ratio))
        }
        (None, Some(h)) => {
            let ratio = orig_w as f64 / orig_h as f64;
            (round_dim(h as f64 * ratio), h)
        }
        (Some(w), Some(h)) => {
            let ratio = orig_w as f64 / orig_h as f64;
            let target_ratio = w as f64 / h as f64;
            if ratio > target_ratio {
                // Source is wider than the box: width pins, height shrinks
                (w, round_dim(w as f64 / ratio))
            } else {
                // Source is taller (or equal): height pins, width shrinks
                (round_dim(h as f64 * ratio), h)
            }
        }
    };

    Ok(resolved)
}

/// Shrink `(orig_w, orig_h)` to fit within a bounding box by sequential
/// clamping: width is clamped first (rescaling height), then height.
///
/// This is the frame-suggestion heuristic, kept distinct from the letterbox
/// path in [`resolve`]: when both axes exceed the box the two can disagree,
/// and frame sizing follows the sequential behavior.
pub fn fit_within(orig_w: u32, orig_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let mut w = orig_w as f64;
    let mut h = orig_h as f64;

    if w > max_w as f64 {
        h = h * max_w as f64 / w;
        w = max_w as f64;
    }
    if h > max_h as f64 {
        w = w * max_h as f64 / h;
        h = max_h as f64;
    }

    (round_dim(w), round_dim(h))
}

fn round_dim(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::params::OutputFormat;

    fn request(
        width: Option<u32>,
        height: Option<u32>,
        maintain_aspect_ratio: bool,
    ) -> ConversionRequest {
        ConversionRequest {
            width,
            height,
            maintain_aspect_ratio,
            ..ConversionRequest::new(OutputFormat::Jpeg)
        }
    }

    // =========================================================================
    // resolve tests
    // =========================================================================

    #[test]
    fn no_dimensions_keeps_original() {
        assert_eq!(
            resolve(1920, 1080, &request(None, None, true)).unwrap(),
            (1920, 1080)
        );
        assert_eq!(
            resolve(1920, 1080, &request(None, None, false)).unwrap(),
            (1920, 1080)
        );
    }

    #[test]
    fn free_resize_distorts_independently() {
        // 800x600 → 400x500 with no aspect constraint: both dims exact
        assert_eq!(
            resolve(800, 600, &request(Some(400), Some(500), false)).unwrap(),
            (400, 500)
        );
    }

    #[test]
    fn free_resize_falls_back_per_axis() {
        assert_eq!(
            resolve(800, 600, &request(Some(400), None, false)).unwrap(),
            (400, 600)
        );
        assert_eq!(
            resolve(800, 600, &request(None, Some(300), false)).unwrap(),
            (800, 300)
        );
    }

    #[test]
    fn width_only_derives_height() {
        // 1000x500 (2:1), width 500 → height = round(500 / 2) = 250
        assert_eq!(
            resolve(1000, 500, &request(Some(500), None, true)).unwrap(),
            (500, 250)
        );
    }

    #[test]
    fn height_only_derives_width() {
        // 1000x500 (2:1), height 200 → width = round(200 * 2) = 400
        assert_eq!(
            resolve(1000, 500, &request(None, Some(200), true)).unwrap(),
            (400, 200)
        );
    }

    #[test]
    fn derived_dimension_rounds() {
        // 640x480 (4:3), width 333 → height = round(333 * 3/4) = round(249.75) = 250
        assert_eq!(
            resolve(640, 480, &request(Some(333), None, true)).unwrap(),
            (333, 250)
        );
    }

    #[test]
    fn fit_inside_wider_source_pins_width() {
        // 1600x900 (16:9) into 800x800: width pins, height = round(800 / (16/9)) = 450
        assert_eq!(
            resolve(1600, 900, &request(Some(800), Some(800), true)).unwrap(),
            (800, 450)
        );
    }

    #[test]
    fn fit_inside_taller_source_pins_height() {
        // 900x1600 into 800x800: height pins, width = round(800 * 9/16) = 450
        assert_eq!(
            resolve(900, 1600, &request(Some(800), Some(800), true)).unwrap(),
            (450, 800)
        );
    }

    #[test]
    fn fit_inside_never_exceeds_box() {
        let cases = [
            (800u32, 600u32, 400u32, 500u32),
            (600, 800, 500, 400),
            (3000, 1000, 640, 480),
            (1000, 3000, 640, 480),
            (50, 50, 640, 480),
        ];
        for (ow, oh, bw, bh) in cases {
            let (w, h) = resolve(ow, oh, &request(Some(bw), Some(bh), true)).unwrap();
            assert!(w <= bw, "{ow}x{oh} into {bw}x{bh} gave width {w}");
            assert!(h <= bh, "{ow}x{oh} into {bw}x{bh} gave height {h}");

            // Aspect is preserved within rounding tolerance
            let orig_ratio = ow as f64 / oh as f64;
            let new_ratio = w as f64 / h as f64;
            assert!(
                (orig_ratio - new_ratio).abs() / orig_ratio < 0.05,
                "{ow}x{oh} into {bw}x{bh} distorted to {w}x{h}"
            );
        }
    }

    #[test]
    fn fit_inside_matching_ratio_fills_box() {
        assert_eq!(
            resolve(800, 600, &request(Some(400), Some(300), true)).unwrap(),
            (400, 300)
        );
    }

    #[test]
    fn extreme_ratio_floors_at_one_pixel() {
        // 1000x1 strip at width 1 would round height to 0
        assert_eq!(
            resolve(1000, 1, &request(Some(1), None, true)).unwrap(),
            (1, 1)
        );
    }

    #[test]
    fn zero_requested_dimension_is_rejected() {
        assert!(matches!(
            resolve(800, 600, &request(Some(0), None, true)),
            Err(TransformError::InvalidDimension(_))
        ));
        assert!(matches!(
            resolve(800, 600, &request(Some(100), Some(0), false)),
            Err(TransformError::InvalidDimension(_))
        ));
    }

    #[test]
    fn zero_area_source_is_rejected() {
        assert!(matches!(
            resolve(0, 600, &request(None, None, true)),
            Err(TransformError::InvalidDimension(_))
        ));
    }

    // =========================================================================
    // fit_within tests
    // =========================================================================

    #[test]
    fn fit_within_small_image_unchanged() {
        assert_eq!(fit_within(640, 480, 800, 600), (640, 480));
    }

    #[test]
    fn fit_within_clamps_width_first() {
        // 1600x900 into 800x600: width clamp → 800x450, height already fits
        assert_eq!(fit_within(1600, 900, 800, 600), (800, 450));
    }

    #[test]
    fn fit_within_clamps_height_after_width() {
        // 1000x2000 into 800x600: width clamp → 800x1600, then height clamp → 300x600
        assert_eq!(fit_within(1000, 2000, 800, 600), (300, 600));
    }

    #[test]
    fn fit_within_tall_image_height_only() {
        // 400x1200 into 800x600: width fits, height clamp → 200x600
        assert_eq!(fit_within(400, 1200, 800, 600), (200, 600));
    }
}
