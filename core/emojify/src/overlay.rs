use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, RgbaImage};

use crate::error::EmojifyError;
use crate::face_detector::DetectedFace;

/// Default overlay width relative to the face width.
pub const EMOJI_SCALE_FACTOR: f32 = 1.2;

/// Largest scaled overlay edge, as a multiple of the matching background edge.
pub const MAX_OVERLAY_SPAN: u64 = 4;

/// Where and how large an overlay is drawn, in background pixel coordinates.
///
/// `x` and `y` may be negative or past the background edges; the draw clips them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPlacement {
    /// Left edge of the scaled overlay.
    pub x: i64,
    /// Top edge of the scaled overlay.
    pub y: i64,
    /// Scaled overlay width.
    pub width: u32,
    /// Scaled overlay height.
    pub height: u32,
}

pub(crate) fn validate_scale_factor(scale_factor: f32) -> Result<(), EmojifyError> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(EmojifyError::InvalidScaleFactor(scale_factor));
    }
    Ok(())
}

/// Compute the scaled size and position of an overlay for `face`.
///
/// The width follows the face: `face.width × scale_factor`. The height uses the
/// overlay's integer aspect ratio (`height / width`, floored), so any overlay
/// wider than it is tall collapses to a 1 pixel strip. The overlay is centered
/// horizontally on the face and sits a third of its height above the face center.
pub fn overlay_placement(
    overlay_width: u32,
    overlay_height: u32,
    face: &DetectedFace,
    scale_factor: f32,
) -> Result<OverlayPlacement, EmojifyError> {
    if overlay_width == 0 || overlay_height == 0 {
        return Err(EmojifyError::ZeroDimensions);
    }
    validate_scale_factor(scale_factor)?;
    face.validate()?;

    let aspect_ratio = overlay_height / overlay_width;
    let width = (face.width * scale_factor) as u32;
    if width == 0 {
        return Err(EmojifyError::InvalidFace(format!(
            "face width {} is too small for an overlay",
            face.width
        )));
    }
    let native_height = u64::from(overlay_height) * u64::from(aspect_ratio);
    let height = ((native_height as f32 * scale_factor) as u32).saturating_add(1);

    let x = face.x + face.width / 2.0 - (width / 2) as f32;
    let y = face.y + face.height / 2.0 - (height / 3) as f32;

    Ok(OverlayPlacement {
        x: x.round() as i64,
        y: y.round() as i64,
        width,
        height,
    })
}

/// Draw `emoji` over `face` on a copy of `background`.
///
/// The background is never modified; the returned canvas has its exact dimensions.
/// The emoji is resized with nearest-neighbour sampling and alpha-blended.
pub fn overlay(
    background: &RgbaImage,
    emoji: &RgbaImage,
    face: &DetectedFace,
    scale_factor: f32,
) -> Result<RgbaImage, EmojifyError> {
    if background.width() == 0 || background.height() == 0 {
        return Err(EmojifyError::ZeroDimensions);
    }
    let placement = overlay_placement(emoji.width(), emoji.height(), face, scale_factor)?;
    draw_scaled(background, emoji, &placement)
}

/// Reject placements whose scaled overlay would dwarf the background.
///
/// The resize allocates the full scaled overlay before the draw clips it, so
/// each edge is capped at [`MAX_OVERLAY_SPAN`] times the matching background edge.
pub(crate) fn check_overlay_fits(
    placement: &OverlayPlacement,
    background_width: u32,
    background_height: u32,
) -> Result<(), EmojifyError> {
    let max_width = u64::from(background_width) * MAX_OVERLAY_SPAN;
    let max_height = u64::from(background_height) * MAX_OVERLAY_SPAN;
    if u64::from(placement.width) > max_width || u64::from(placement.height) > max_height {
        return Err(EmojifyError::InvalidFace(format!(
            "overlay {}x{} is out of proportion to the {}x{} image",
            placement.width, placement.height, background_width, background_height
        )));
    }
    Ok(())
}

/// Draw `emoji`, scaled to `placement`, on a fresh copy of `background`.
///
/// Generic over the pixel type so 16-bit and float photos are composited
/// without going through 8 bits per channel.
pub(crate) fn draw_scaled<P>(
    background: &ImageBuffer<P, Vec<P::Subpixel>>,
    emoji: &ImageBuffer<P, Vec<P::Subpixel>>,
    placement: &OverlayPlacement,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>, EmojifyError>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    check_overlay_fits(placement, background.width(), background.height())?;
    tracing::trace!(?placement, "placing overlay");

    let scaled = imageops::resize(emoji, placement.width, placement.height, FilterType::Nearest);

    let mut canvas = ImageBuffer::new(background.width(), background.height());
    imageops::replace(&mut canvas, background, 0, 0);
    imageops::overlay(&mut canvas, &scaled, placement.x, placement.y);

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn face_at(x: f32, y: f32, width: f32, height: f32) -> DetectedFace {
        DetectedFace {
            x,
            y,
            width,
            height,
            smiling_probability: 1.0,
            left_eye_open_probability: 1.0,
            right_eye_open_probability: 1.0,
        }
    }

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn wide_overlay_collapses_to_one_pixel() {
        // 100x50 overlay: aspect floor(50 / 100) = 0, so height = 0 * 1.2 + 1
        let face = face_at(50.0, 50.0, 200.0, 200.0);
        let placement = overlay_placement(100, 50, &face, 1.2).unwrap();
        assert_eq!(placement.width, 240);
        assert_eq!(placement.height, 1);
        assert_eq!(placement.x, 30); // 50 + 100 - 120
        assert_eq!(placement.y, 150); // 50 + 100 - 0
    }

    #[test]
    fn square_overlay_uses_native_height() {
        // 64x64 overlay: aspect 1, height = 64 * 1 * 1.2 + 1 = 77
        let face = face_at(0.0, 0.0, 100.0, 100.0);
        let placement = overlay_placement(64, 64, &face, EMOJI_SCALE_FACTOR).unwrap();
        assert_eq!(placement.width, 120);
        assert_eq!(placement.height, 77);
        assert_eq!(placement.x, -10); // 0 + 50 - 60
        assert_eq!(placement.y, 25); // 0 + 50 - 77 / 3
    }

    #[test]
    fn tall_overlay_multiplies_by_aspect() {
        // 10x25 overlay: aspect 2, height = 25 * 2 * 1.0 + 1
        let face = face_at(0.0, 0.0, 10.0, 10.0);
        let placement = overlay_placement(10, 25, &face, 1.0).unwrap();
        assert_eq!(placement.width, 10);
        assert_eq!(placement.height, 51);
    }

    #[test]
    fn output_matches_background_dimensions() {
        let background = solid(120, 80, [0, 0, 255, 255]);
        let emoji = solid(16, 16, [255, 0, 0, 255]);
        let face = face_at(30.0, 20.0, 40.0, 40.0);
        let result = overlay(&background, &emoji, &face, EMOJI_SCALE_FACTOR).unwrap();
        assert_eq!(result.dimensions(), background.dimensions());
    }

    #[test]
    fn background_is_not_mutated() {
        let background = solid(64, 64, [10, 20, 30, 255]);
        let snapshot = background.clone();
        let emoji = solid(8, 8, [255, 255, 0, 255]);
        let face = face_at(16.0, 16.0, 32.0, 32.0);
        let result = overlay(&background, &emoji, &face, EMOJI_SCALE_FACTOR).unwrap();
        assert_eq!(background, snapshot);
        assert_ne!(result, snapshot);
    }

    #[test]
    fn overlay_pixels_land_on_face() {
        let background = solid(100, 100, [0, 0, 0, 255]);
        let emoji = solid(10, 10, [255, 0, 0, 255]);
        let face = face_at(40.0, 40.0, 20.0, 20.0);
        // width 24, height 13, x = 50 - 12 = 38, y = 50 - 4 = 46
        let result = overlay(&background, &emoji, &face, EMOJI_SCALE_FACTOR).unwrap();
        assert_eq!(result.get_pixel(50, 50), &Rgba([255, 0, 0, 255]));
        assert_eq!(result.get_pixel(38, 46), &Rgba([255, 0, 0, 255]));
        assert_eq!(result.get_pixel(37, 46), &Rgba([0, 0, 0, 255]));
        assert_eq!(result.get_pixel(50, 45), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn transparent_overlay_pixels_keep_background() {
        let background = solid(50, 50, [0, 128, 0, 255]);
        let emoji = solid(10, 10, [255, 0, 0, 0]);
        let face = face_at(10.0, 10.0, 30.0, 30.0);
        let result = overlay(&background, &emoji, &face, EMOJI_SCALE_FACTOR).unwrap();
        assert_eq!(result, background);
    }

    #[test]
    fn out_of_bounds_overlay_is_clipped() {
        let background = solid(20, 20, [0, 0, 0, 255]);
        let emoji = solid(10, 10, [255, 255, 255, 255]);
        let face = face_at(-15.0, -15.0, 20.0, 20.0);
        let result = overlay(&background, &emoji, &face, EMOJI_SCALE_FACTOR).unwrap();
        assert_eq!(result.dimensions(), (20, 20));
        assert_eq!(result.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(result.get_pixel(19, 19), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let face = face_at(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            overlay_placement(0, 10, &face, 1.2),
            Err(EmojifyError::ZeroDimensions)
        ));
        assert!(matches!(
            overlay_placement(10, 10, &face, 0.0),
            Err(EmojifyError::InvalidScaleFactor(_))
        ));
        assert!(matches!(
            overlay_placement(10, 10, &face_at(0.0, 0.0, 0.5, 10.0), 1.2),
            Err(EmojifyError::InvalidFace(_))
        ));
        assert!(matches!(
            overlay(&RgbaImage::new(0, 0), &solid(4, 4, [0; 4]), &face, 1.2),
            Err(EmojifyError::ZeroDimensions)
        ));
    }

    #[test]
    fn oversized_overlay_is_rejected_before_resizing() {
        let background = solid(100, 100, [0, 0, 0, 255]);
        let emoji = solid(64, 64, [255, 255, 0, 255]);
        let face = face_at(10.0, 10.0, 4.0e9, 40.0);
        assert!(matches!(
            overlay(&background, &emoji, &face, EMOJI_SCALE_FACTOR),
            Err(EmojifyError::InvalidFace(_))
        ));
    }

    #[test]
    fn overlay_up_to_the_span_limit_is_drawn() {
        let placement = OverlayPlacement {
            x: -150,
            y: 0,
            width: 400,
            height: 1,
        };
        assert!(check_overlay_fits(&placement, 100, 100).is_ok());
        let wider = OverlayPlacement {
            width: 401,
            ..placement
        };
        assert!(check_overlay_fits(&wider, 100, 100).is_err());
        let taller = OverlayPlacement {
            height: 401,
            ..placement
        };
        assert!(check_overlay_fits(&taller, 100, 100).is_err());
    }

    #[test]
    fn sixteen_bit_canvas_keeps_full_precision() {
        let background: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(40, 40, Rgba([12_345, 23_456, 34_567, 65_535]));
        let emoji: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(8, 8, Rgba([65_535, 0, 0, 65_535]));
        let placement = overlay_placement(8, 8, &face_at(10.0, 10.0, 20.0, 20.0), 1.2).unwrap();
        let result = draw_scaled(&background, &emoji, &placement).unwrap();
        assert_eq!(result.get_pixel(0, 0), background.get_pixel(0, 0));
        assert_eq!(result.get_pixel(20, 20), &Rgba([65_535, 0, 0, 65_535]));
    }
}
