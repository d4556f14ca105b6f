use image::{ColorType, DynamicImage, ImageBuffer, Rgba, Rgba32FImage, RgbaImage};

use crate::assets::AssetStore;
use crate::classify::{ExpressionCategory, Thresholds};
use crate::error::EmojifyError;
use crate::face_detector::{DetectedFace, DetectionEngine, DetectorOptions, DetectorSession};
use crate::notify::{Notifier, NO_FACE_MESSAGE};
use crate::overlay::{draw_scaled, overlay_placement, validate_scale_factor, OverlayPlacement};
use crate::{AppliedOverlay, EmojifiedPhoto, SkippedFace};

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, EmojifyError> {
    image::load_from_memory(input).map_err(|e| EmojifyError::DecodeError(e.to_string()))
}

/// Working canvas, kept at the bit depth of the input photo.
pub(crate) enum Canvas {
    Rgba8(RgbaImage),
    Rgba16(ImageBuffer<Rgba<u16>, Vec<u16>>),
    Rgba32F(Rgba32FImage),
}

impl Canvas {
    pub(crate) fn from_picture(picture: &DynamicImage) -> Self {
        match picture.color() {
            ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
                Canvas::Rgba16(picture.to_rgba16())
            }
            ColorType::Rgb32F | ColorType::Rgba32F => Canvas::Rgba32F(picture.to_rgba32f()),
            _ => Canvas::Rgba8(picture.to_rgba8()),
        }
    }

    /// Draw `emoji` at `placement` on a fresh canvas of the same depth.
    pub(crate) fn draw(
        &self,
        emoji: &RgbaImage,
        placement: &OverlayPlacement,
    ) -> Result<Canvas, EmojifyError> {
        Ok(match self {
            Canvas::Rgba8(background) => {
                Canvas::Rgba8(draw_scaled(background, emoji, placement)?)
            }
            Canvas::Rgba16(background) => {
                let emoji = DynamicImage::ImageRgba8(emoji.clone()).to_rgba16();
                Canvas::Rgba16(draw_scaled(background, &emoji, placement)?)
            }
            Canvas::Rgba32F(background) => {
                let emoji = DynamicImage::ImageRgba8(emoji.clone()).to_rgba32f();
                Canvas::Rgba32F(draw_scaled(background, &emoji, placement)?)
            }
        })
    }

    /// Convert back to the color type of the input photo.
    pub(crate) fn restore_color(self, color: ColorType) -> DynamicImage {
        let canvas = match self {
            Canvas::Rgba8(image) => DynamicImage::ImageRgba8(image),
            Canvas::Rgba16(image) => DynamicImage::ImageRgba16(image),
            Canvas::Rgba32F(image) => DynamicImage::ImageRgba32F(image),
        };
        match color {
            ColorType::L8 => DynamicImage::ImageLuma8(canvas.to_luma8()),
            ColorType::La8 => DynamicImage::ImageLumaA8(canvas.to_luma_alpha8()),
            ColorType::Rgb8 => DynamicImage::ImageRgb8(canvas.to_rgb8()),
            ColorType::L16 => DynamicImage::ImageLuma16(canvas.to_luma16()),
            ColorType::La16 => DynamicImage::ImageLumaA16(canvas.to_luma_alpha16()),
            ColorType::Rgb16 => DynamicImage::ImageRgb16(canvas.to_rgb16()),
            ColorType::Rgba16 => DynamicImage::ImageRgba16(canvas.to_rgba16()),
            ColorType::Rgb32F => DynamicImage::ImageRgb32F(canvas.to_rgb32f()),
            ColorType::Rgba32F => DynamicImage::ImageRgba32F(canvas.to_rgba32f()),
            _ => canvas,
        }
    }
}

/// Load the emoji for `category` and draw it over `face`.
fn apply_emoji(
    background: &Canvas,
    face: &DetectedFace,
    category: ExpressionCategory,
    scale_factor: f32,
    assets: &dyn AssetStore,
) -> Result<(Canvas, OverlayPlacement), EmojifyError> {
    let emoji = assets.load(category)?;
    let placement = overlay_placement(emoji.width(), emoji.height(), face, scale_factor)?;
    let canvas = background.draw(&emoji, &placement)?;
    Ok((canvas, placement))
}

/// Full pipeline: detect → classify each face → overlay its emoji in detection order.
///
/// The detector is released when this returns, on every path.
pub(crate) fn emojify_pipeline(
    picture: &DynamicImage,
    thresholds: &Thresholds,
    scale_factor: f32,
    options: &DetectorOptions,
    engine: &dyn DetectionEngine,
    assets: &dyn AssetStore,
    notifier: &dyn Notifier,
) -> Result<EmojifiedPhoto, EmojifyError> {
    if picture.width() == 0 || picture.height() == 0 {
        return Err(EmojifyError::ZeroDimensions);
    }
    thresholds.validate()?;
    validate_scale_factor(scale_factor)?;

    let mut detector = DetectorSession::open(engine, options)?;
    let faces = detector.detect(picture)?;
    tracing::debug!("number of detected faces: {}", faces.len());

    if faces.is_empty() {
        notifier.notify(NO_FACE_MESSAGE);
        return Ok(EmojifiedPhoto {
            image: picture.clone(),
            faces_detected: 0,
            overlays: Vec::new(),
            skipped: Vec::new(),
        });
    }

    let mut result = Canvas::from_picture(picture);
    let mut overlays = Vec::with_capacity(faces.len());
    let mut skipped = Vec::new();

    for (face_index, face) in faces.iter().enumerate() {
        let category = thresholds.classify_face(face);
        tracing::debug!(
            face_index,
            smiling = face.smiling_probability,
            left_eye_open = face.left_eye_open_probability,
            right_eye_open = face.right_eye_open_probability,
            ?category,
            "classified face"
        );

        match apply_emoji(&result, face, category, scale_factor, assets) {
            Ok((canvas, placement)) => {
                result = canvas;
                overlays.push(AppliedOverlay {
                    face_index,
                    category,
                    placement,
                });
            }
            Err(error) => {
                tracing::warn!(face_index, %error, "skipping face");
                skipped.push(SkippedFace {
                    face_index,
                    category,
                    reason: error.to_string(),
                });
            }
        }
    }

    // Nothing drawn: hand back the input untouched rather than a color round-trip.
    let image = if overlays.is_empty() {
        picture.clone()
    } else {
        result.restore_color(picture.color())
    };

    Ok(EmojifiedPhoto {
        image,
        faces_detected: faces.len(),
        overlays,
        skipped,
    })
}
