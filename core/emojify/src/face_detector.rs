use image::DynamicImage;

use crate::error::EmojifyError;

/// A face reported by a detection engine, with its expression probabilities.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "recorded", derive(serde::Serialize, serde::Deserialize))]
pub struct DetectedFace {
    /// X coordinate of the top-left corner (pixels).
    pub x: f32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f32,
    /// Width of the bounding box (pixels).
    pub width: f32,
    /// Height of the bounding box (pixels).
    pub height: f32,
    /// Probability that the face is smiling, in `[0.0, 1.0]`.
    pub smiling_probability: f32,
    /// Probability that the left eye is open, in `[0.0, 1.0]`.
    pub left_eye_open_probability: f32,
    /// Probability that the right eye is open, in `[0.0, 1.0]`.
    pub right_eye_open_probability: f32,
}

impl DetectedFace {
    pub(crate) fn validate(&self) -> Result<(), EmojifyError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(EmojifyError::InvalidFace(format!(
                "position ({}, {}) is not finite",
                self.x, self.y
            )));
        }
        if !(self.width.is_finite() && self.width > 0.0)
            || !(self.height.is_finite() && self.height > 0.0)
        {
            return Err(EmojifyError::InvalidFace(format!(
                "size {}x{} must be finite and positive",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Which expression classifiers the engine should run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Classification {
    /// Smiling and eye-open probabilities.
    #[default]
    All,
    /// Bounding boxes only. Probabilities are left at zero.
    None,
}

/// Settings handed to a [`DetectionEngine`] when a detector is opened.
///
/// Detection is single-shot: each photo is processed on its own, with no face
/// tracking across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorOptions {
    /// Expression classifiers to run (default: all).
    pub classification: Classification,
    /// Smallest face edge, in pixels, the engine should report.
    /// `0` (the default) keeps every face the engine finds.
    pub min_face_size: u32,
}

/// An open detector instance.
///
/// Obtained from [`DetectionEngine::open`]; the pipeline calls [`FaceDetector::release`]
/// exactly once when it is done, whatever the outcome.
pub trait FaceDetector {
    /// Detect faces in `image`. Faces are returned in the engine's detection order.
    fn detect(&mut self, image: &DynamicImage) -> Result<Vec<DetectedFace>, EmojifyError>;

    /// Free engine resources held by this instance.
    fn release(&mut self) {}
}

/// Pluggable face detection backend.
///
/// Implement this trait to connect a real detection engine and pass it to
/// [`crate::Emojifier::new`].
pub trait DetectionEngine: Send + Sync {
    /// Create a detector instance configured with `options`.
    fn open(&self, options: &DetectorOptions) -> Result<Box<dyn FaceDetector>, EmojifyError>;
}

/// Scoped detector: releases the wrapped instance when dropped.
pub(crate) struct DetectorSession {
    detector: Box<dyn FaceDetector>,
}

impl DetectorSession {
    pub(crate) fn open(
        engine: &dyn DetectionEngine,
        options: &DetectorOptions,
    ) -> Result<Self, EmojifyError> {
        let detector = engine.open(options)?;
        Ok(Self { detector })
    }

    pub(crate) fn detect(
        &mut self,
        image: &DynamicImage,
    ) -> Result<Vec<DetectedFace>, EmojifyError> {
        self.detector.detect(image)
    }
}

impl Drop for DetectorSession {
    fn drop(&mut self) {
        tracing::trace!("releasing face detector");
        self.detector.release();
    }
}
