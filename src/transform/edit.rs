//! Geometric edits: rotate, flip, crop.
//!
//! Stages compose in a fixed order — rotate, then flip, then crop — and each
//! stage is skipped entirely when its parameters are an identity, so a no-op
//! request passes the input raster through without allocating.
//!
//! The crop rectangle addresses the raster *as it exists after rotate and
//! flip*, not the original, and is validated against those bounds.
//!
//! ## Fill policy
//!
//! Rotation by a non-right angle grows the canvas to the rotated bounding
//! box; pixels outside the original footprint are fully transparent
//! (`rgba(0,0,0,0)`). Working rasters always carry alpha — encoding to an
//! alpha-less format later flattens onto opaque white (see
//! [`rust_codec`](super::rust_codec)).

use super::TransformError;
use super::codec::{CodecError, ImageCodec};
use super::params::{ConversionResult, CropRect, EditRequest, OutputFormat, Quality, SourceImage};
use image::{Rgba, RgbaImage, imageops};
use std::borrow::Cow;

/// Apply an edit request to a raster.
///
/// Returns `Cow::Borrowed` when the request is a complete identity; any
/// actual work yields a new owned raster, leaving the input untouched.
///
/// # Errors
/// - [`TransformError::InvalidDimension`] for a zero-sized crop rectangle
///   (checked before any pixel work).
/// - [`TransformError::CropOutOfBounds`] when the rectangle extends past the
///   post-rotate/flip bounds. No partial result is produced.
pub fn apply<'a>(
    raster: &'a RgbaImage,
    request: &EditRequest,
) -> Result<Cow<'a, RgbaImage>, TransformError> {
    validate_edit(request)?;

    let mut current: Cow<'a, RgbaImage> = Cow::Borrowed(raster);

    current = match request.normalized_rotation() {
        0 => current,
        // Right angles are exact pixel remaps
        90 => Cow::Owned(imageops::rotate90(current.as_ref())),
        180 => Cow::Owned(imageops::rotate180(current.as_ref())),
        270 => Cow::Owned(imageops::rotate270(current.as_ref())),
        degrees => Cow::Owned(rotate_arbitrary(current.as_ref(), degrees as f32)),
    };

    if request.flip_horizontal {
        current = Cow::Owned(imageops::flip_horizontal(current.as_ref()));
    }
    if request.flip_vertical {
        current = Cow::Owned(imageops::flip_vertical(current.as_ref()));
    }

    if let Some(rect) = &request.crop {
        let (width, height) = (current.width(), current.height());
        validate_crop_bounds(rect, width, height)?;
        current = Cow::Owned(
            imageops::crop_imm(current.as_ref(), rect.x, rect.y, rect.width, rect.height)
                .to_image(),
        );
    }

    Ok(current)
}

/// Decode a source, apply the edit, and re-encode in the source's own format
/// at the default quality.
///
/// # Errors
/// In addition to [`apply`]'s errors, a source whose mime type does not map
/// to a supported output format fails with
/// [`CodecError::UnsupportedFormat`] before any decode work.
pub fn apply_encoded(
    codec: &impl ImageCodec,
    source: &SourceImage,
    request: &EditRequest,
) -> Result<ConversionResult, TransformError> {
    validate_edit(request)?;
    let format = OutputFormat::from_mime(source.mime())
        .ok_or_else(|| CodecError::UnsupportedFormat(source.mime().to_string()))?;

    let raster = codec.decode(source.data(), source.mime())?;
    let edited = apply(&raster, request)?;
    let (width, height) = (edited.width(), edited.height());
    let bytes = codec.encode(edited.as_ref(), format, Quality::default())?;

    Ok(ConversionResult {
        bytes,
        format,
        width,
        height,
    })
}

/// Parameter checks that need no raster: a degenerate crop rectangle fails
/// here, before any decode or pixel work.
fn validate_edit(request: &EditRequest) -> Result<(), TransformError> {
    if let Some(rect) = &request.crop {
        if rect.width == 0 || rect.height == 0 {
            return Err(TransformError::InvalidDimension(
                "crop rectangle must be at least 1x1".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_crop_bounds(rect: &CropRect, width: u32, height: u32) -> Result<(), TransformError> {
    let right = rect.x.checked_add(rect.width);
    let bottom = rect.y.checked_add(rect.height);
    match (right, bottom) {
        (Some(r), Some(b)) if r <= width && b <= height => Ok(()),
        _ => Err(TransformError::CropOutOfBounds {
            rect: *rect,
            width,
            height,
        }),
    }
}

/// Rotate by an arbitrary angle (degrees, clockwise).
///
/// The output canvas is the rotated bounding box
/// `(h·|sin θ| + w·|cos θ|, h·|cos θ| + w·|sin θ|)`, rounded; the source is
/// centered in it. Each destination pixel center is mapped back through the
/// inverse rotation and bilinearly sampled; samples outside the source
/// contribute transparent black.
fn rotate_arbitrary(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    let (w, h) = (src.width() as f32, src.height() as f32);

    let new_w = (h * sin.abs() + w * cos.abs()).round().max(1.0) as u32;
    let new_h = (h * cos.abs() + w * sin.abs()).round().max(1.0) as u32;

    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ncx, ncy) = (new_w as f32 / 2.0, new_h as f32 / 2.0);

    RgbaImage::from_fn(new_w, new_h, |x, y| {
        let dx = x as f32 + 0.5 - ncx;
        let dy = y as f32 + 0.5 - ncy;
        // Inverse rotation (y-down coordinates, clockwise angle)
        let sx = dx * cos + dy * sin + cx;
        let sy = -dx * sin + dy * cos + cy;
        bilinear(src, sx - 0.5, sy - 0.5)
    })
}

/// Bilinear sample at fractional pixel coordinates. Neighbors outside the
/// raster count as transparent black, which fades edges out cleanly instead
/// of smearing border pixels.
fn bilinear(src: &RgbaImage, fx: f32, fy: f32) -> Rgba<u8> {
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let weights = [
        (0i64, 0i64, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ];

    let mut acc = [0.0f32; 4];
    for (dx, dy, weight) in weights {
        let px = x0 as i64 + dx;
        let py = y0 as i64 + dy;
        if px >= 0 && py >= 0 && px < src.width() as i64 && py < src.height() as i64 {
            let channels = src.get_pixel(px as u32, py as u32).0;
            for (a, c) in acc.iter_mut().zip(channels) {
                *a += weight * c as f32;
            }
        }
    }

    Rgba(acc.map(|c| c.round().clamp(0.0, 255.0) as u8))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::codec::tests::{MockCodec, RecordedOp};

    /// A raster with a single red marker pixel on a white field.
    fn marked(width: u32, height: u32, mx: u32, my: u32) -> RgbaImage {
        let mut raster = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        raster.put_pixel(mx, my, Rgba([255, 0, 0, 255]));
        raster
    }

    fn is_red(pixel: &Rgba<u8>) -> bool {
        pixel.0 == [255, 0, 0, 255]
    }

    #[test]
    fn identity_request_borrows_without_allocating() {
        let raster = marked(10, 10, 0, 0);
        let result = apply(&raster, &EditRequest::default()).unwrap();
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn full_turn_rotation_is_identity() {
        let raster = marked(10, 10, 0, 0);
        let request = EditRequest {
            rotation: 360,
            ..EditRequest::default()
        };
        assert!(matches!(apply(&raster, &request).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn rotate_90_swaps_dimensions() {
        let raster = marked(3, 2, 0, 0);
        let request = EditRequest {
            rotation: 90,
            ..EditRequest::default()
        };

        let rotated = apply(&raster, &request).unwrap();
        assert_eq!(rotated.dimensions(), (2, 3));
        // Clockwise: top-left corner lands at the top-right
        assert!(is_red(rotated.get_pixel(1, 0)));
    }

    #[test]
    fn rotate_negative_quarter_equals_270() {
        let raster = marked(3, 2, 0, 0);
        let negative = EditRequest {
            rotation: -90,
            ..EditRequest::default()
        };
        let positive = EditRequest {
            rotation: 270,
            ..EditRequest::default()
        };

        assert_eq!(
            apply(&raster, &negative).unwrap().as_ref(),
            apply(&raster, &positive).unwrap().as_ref()
        );
    }

    #[test]
    fn rotate_180_keeps_dimensions_and_mirrors_both_axes() {
        let raster = marked(4, 3, 0, 0);
        let request = EditRequest {
            rotation: 180,
            ..EditRequest::default()
        };

        let rotated = apply(&raster, &request).unwrap();
        assert_eq!(rotated.dimensions(), (4, 3));
        assert!(is_red(rotated.get_pixel(3, 2)));
    }

    #[test]
    fn rotate_45_grows_to_bounding_box_with_transparent_corners() {
        let raster = RgbaImage::from_pixel(100, 100, Rgba([0, 128, 255, 255]));
        let request = EditRequest {
            rotation: 45,
            ..EditRequest::default()
        };

        let rotated = apply(&raster, &request).unwrap();
        // 100 * (sin 45 + cos 45) = 141.42 → 141 on both axes
        assert_eq!(rotated.dimensions(), (141, 141));

        // Corners fall outside the rotated footprint
        assert_eq!(rotated.get_pixel(0, 0).0[3], 0);
        assert_eq!(rotated.get_pixel(140, 140).0[3], 0);
        // The center is solidly inside it
        assert_eq!(rotated.get_pixel(70, 70).0, [0, 128, 255, 255]);
    }

    #[test]
    fn flip_horizontal_mirrors_x() {
        let raster = marked(4, 3, 0, 1);
        let request = EditRequest {
            flip_horizontal: true,
            ..EditRequest::default()
        };

        let flipped = apply(&raster, &request).unwrap();
        assert_eq!(flipped.dimensions(), (4, 3));
        assert!(is_red(flipped.get_pixel(3, 1)));
    }

    #[test]
    fn double_flip_restores_original_pixels() {
        let raster = marked(5, 4, 2, 1);
        let request = EditRequest {
            flip_horizontal: true,
            ..EditRequest::default()
        };

        let once = apply(&raster, &request).unwrap().into_owned();
        let twice = apply(&once, &request).unwrap().into_owned();
        assert_eq!(twice, raster);
    }

    #[test]
    fn crop_extracts_sub_raster() {
        let raster = marked(10, 10, 2, 3);
        let request = EditRequest {
            crop: Some(CropRect {
                x: 2,
                y: 3,
                width: 4,
                height: 5,
            }),
            ..EditRequest::default()
        };

        let cropped = apply(&raster, &request).unwrap();
        assert_eq!(cropped.dimensions(), (4, 5));
        assert!(is_red(cropped.get_pixel(0, 0)));
    }

    #[test]
    fn crop_validates_against_post_rotation_bounds() {
        // 200x100 source becomes 100x200 after a quarter turn
        let raster = RgbaImage::from_pixel(200, 100, Rgba([10, 10, 10, 255]));

        let too_wide = EditRequest {
            rotation: 90,
            crop: Some(CropRect {
                x: 0,
                y: 0,
                width: 150,
                height: 50,
            }),
            ..EditRequest::default()
        };
        assert!(matches!(
            apply(&raster, &too_wide),
            Err(TransformError::CropOutOfBounds { .. })
        ));

        // The same rectangle transposed fits the rotated raster
        let fits = EditRequest {
            rotation: 90,
            crop: Some(CropRect {
                x: 0,
                y: 0,
                width: 50,
                height: 150,
            }),
            ..EditRequest::default()
        };
        assert_eq!(apply(&raster, &fits).unwrap().dimensions(), (50, 150));
    }

    #[test]
    fn crop_out_of_bounds_is_rejected() {
        let raster = marked(10, 10, 0, 0);
        let request = EditRequest {
            crop: Some(CropRect {
                x: 5,
                y: 5,
                width: 6,
                height: 6,
            }),
            ..EditRequest::default()
        };
        assert!(matches!(
            apply(&raster, &request),
            Err(TransformError::CropOutOfBounds { .. })
        ));
    }

    #[test]
    fn crop_with_huge_offsets_does_not_overflow() {
        let raster = marked(10, 10, 0, 0);
        let request = EditRequest {
            crop: Some(CropRect {
                x: u32::MAX,
                y: 0,
                width: 2,
                height: 2,
            }),
            ..EditRequest::default()
        };
        assert!(matches!(
            apply(&raster, &request),
            Err(TransformError::CropOutOfBounds { .. })
        ));
    }

    #[test]
    fn zero_size_crop_is_invalid_dimension() {
        let raster = marked(10, 10, 0, 0);
        let request = EditRequest {
            crop: Some(CropRect {
                x: 0,
                y: 0,
                width: 0,
                height: 5,
            }),
            ..EditRequest::default()
        };
        assert!(matches!(
            apply(&raster, &request),
            Err(TransformError::InvalidDimension(_))
        ));
    }

    #[test]
    fn stages_compose_rotate_flip_crop() {
        // Marker at (0,0) of a 4x2 raster.
        // rotate90 → 2x4, marker at (1,0); flip_h → marker at (0,0);
        // crop the top-left 2x2 → marker survives at (0,0).
        let raster = marked(4, 2, 0, 0);
        let request = EditRequest {
            rotation: 90,
            flip_horizontal: true,
            crop: Some(CropRect {
                x: 0,
                y: 0,
                width: 2,
                height: 2,
            }),
            ..EditRequest::default()
        };

        let result = apply(&raster, &request).unwrap();
        assert_eq!(result.dimensions(), (2, 2));
        assert!(is_red(result.get_pixel(0, 0)));
    }

    // =========================================================================
    // apply_encoded tests
    // =========================================================================

    #[test]
    fn apply_encoded_re_encodes_in_source_format() {
        let codec = MockCodec::new(40, 20);
        let source = SourceImage::new(vec![0u8; 8], "image/webp");
        let request = EditRequest {
            rotation: 90,
            ..EditRequest::default()
        };

        let result = apply_encoded(&codec, &source, &request).unwrap();
        assert_eq!(result.format, OutputFormat::WebP);
        assert_eq!((result.width, result.height), (20, 40));

        let ops = codec.ops();
        assert!(matches!(
            ops.last(),
            Some(RecordedOp::Encode {
                format: OutputFormat::WebP,
                width: 20,
                height: 40,
                ..
            })
        ));
    }

    #[test]
    fn apply_encoded_rejects_unmappable_mime_before_decode() {
        let codec = MockCodec::new(40, 20);
        let source = SourceImage::new(vec![0u8; 8], "image/tiff");

        let result = apply_encoded(&codec, &source, &EditRequest::default());
        assert!(matches!(
            result,
            Err(TransformError::Codec(CodecError::UnsupportedFormat(_)))
        ));
        assert!(codec.ops().is_empty());
    }
}
