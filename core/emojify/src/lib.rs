//! Expression-matched emoji overlays: detect faces in a photo, classify each face
//! as smiling or not with each eye open or closed, and draw the matching emoji on it.
//!
//! # Example
//!
//! ```no_run
//! use emojify::{
//!     DetectedFace, DetectionEngine, DetectorOptions, DirectoryAssetStore, Emojifier,
//!     EmojifyError, FaceDetector,
//! };
//! use image::DynamicImage;
//!
//! struct MyEngine;
//! struct MyDetector;
//!
//! impl FaceDetector for MyDetector {
//!     fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<DetectedFace>, EmojifyError> {
//!         // Call your detection engine here
//!         Ok(vec![])
//!     }
//! }
//!
//! impl DetectionEngine for MyEngine {
//!     fn open(&self, _options: &DetectorOptions) -> Result<Box<dyn FaceDetector>, EmojifyError> {
//!         Ok(Box::new(MyDetector))
//!     }
//! }
//!
//! let photo = image::open("photo.jpg").unwrap();
//! let result = Emojifier::new(Box::new(MyEngine), Box::new(DirectoryAssetStore::new("assets")))
//!     .emojify(&photo)
//!     .unwrap();
//! println!("Drew {} emoji", result.overlays.len());
//! ```
#![warn(missing_docs)]

/// Emoji asset stores.
pub mod assets;
/// Expression classification.
pub mod classify;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
/// Notification of user-facing messages.
pub mod notify;
/// Overlay geometry and compositing.
pub mod overlay;
mod pipeline;
#[cfg(feature = "recorded")]
/// Detection engine replaying faces recorded as JSON.
pub mod recorded;

use image::DynamicImage;

pub use assets::{AssetStore, DirectoryAssetStore, MemoryAssetStore};
pub use classify::{classify, ExpressionCategory, Thresholds};
/// Error type returned by emojify operations.
pub use error::EmojifyError;
pub use face_detector::{
    Classification, DetectedFace, DetectionEngine, DetectorOptions, FaceDetector,
};
pub use notify::{LogNotifier, Notifier, NO_FACE_MESSAGE};
pub use overlay::{overlay, overlay_placement, OverlayPlacement, EMOJI_SCALE_FACTOR};
#[cfg(feature = "recorded")]
pub use recorded::RecordedDetections;

/// An emoji drawn onto the result image.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOverlay {
    /// Index of the face in detection order.
    pub face_index: usize,

    /// Expression the face was classified as.
    pub category: ExpressionCategory,

    /// Where the emoji was drawn.
    pub placement: OverlayPlacement,
}

/// A face that was detected but could not be decorated.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFace {
    /// Index of the face in detection order.
    pub face_index: usize,

    /// Expression the face was classified as.
    pub category: ExpressionCategory,

    /// Why the emoji was not drawn.
    pub reason: String,
}

/// Result of processing one photo.
#[derive(Debug, Clone)]
pub struct EmojifiedPhoto {
    /// The decorated photo, same dimensions and color type as the input.
    /// Bit-identical to the input when no emoji was drawn.
    pub image: DynamicImage,

    /// Number of faces the detector reported.
    pub faces_detected: usize,

    /// Emoji drawn, in drawing order.
    pub overlays: Vec<AppliedOverlay>,

    /// Faces left undecorated because their emoji could not be drawn.
    pub skipped: Vec<SkippedFace>,
}

/// Builder for decorating photos with expression emoji.
///
/// Holds configuration only; every call to [`Emojifier::emojify`] opens its own
/// detector and releases it before returning.
pub struct Emojifier {
    thresholds: Thresholds,
    scale_factor: f32,
    options: DetectorOptions,
    engine: Box<dyn DetectionEngine>,
    assets: Box<dyn AssetStore>,
    notifier: Box<dyn Notifier>,
}

impl Emojifier {
    /// Create an emojifier with default thresholds and scale factor.
    pub fn new(engine: Box<dyn DetectionEngine>, assets: Box<dyn AssetStore>) -> Self {
        Self {
            thresholds: Thresholds::default(),
            scale_factor: EMOJI_SCALE_FACTOR,
            options: DetectorOptions::default(),
            engine,
            assets,
            notifier: Box::new(LogNotifier),
        }
    }

    /// Replace both classification thresholds.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the smiling probability threshold (default: 0.654).
    pub fn smiling_threshold(mut self, threshold: f32) -> Self {
        self.thresholds.smiling = threshold;
        self
    }

    /// Set the eye-open probability threshold (default: 0.454).
    pub fn eye_open_threshold(mut self, threshold: f32) -> Self {
        self.thresholds.eye_open = threshold;
        self
    }

    /// Set the emoji width relative to the face width (default: 1.2).
    pub fn scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the smallest face edge the detector should report (default: 0, every face).
    pub fn min_face_size(mut self, pixels: u32) -> Self {
        self.options.min_face_size = pixels;
        self
    }

    /// Choose which expression classifiers the detector runs (default: all).
    ///
    /// With [`Classification::None`] every probability is zero, so each face
    /// gets the [`ExpressionCategory::ClosedEyeFrown`] emoji.
    pub fn classification(mut self, classification: Classification) -> Self {
        self.options.classification = classification;
        self
    }

    /// Provide the receiver of user-facing messages (default: [`LogNotifier`]).
    ///
    /// ```no_run
    /// # use emojify::{DetectionEngine, Emojifier, MemoryAssetStore};
    /// # fn engine() -> Box<dyn DetectionEngine> { unimplemented!() }
    /// let emojifier = Emojifier::new(engine(), Box::new(MemoryAssetStore::new()))
    ///     .notifier(Box::new(|message: &str| eprintln!("{message}")));
    /// ```
    pub fn notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Detect faces in `picture` and draw the matching emoji on each one.
    ///
    /// When no face is found the notifier receives [`NO_FACE_MESSAGE`] and the
    /// photo is returned unchanged. A face whose emoji cannot be drawn is
    /// recorded in [`EmojifiedPhoto::skipped`] and does not stop the others.
    pub fn emojify(&self, picture: &DynamicImage) -> Result<EmojifiedPhoto, EmojifyError> {
        pipeline::emojify_pipeline(
            picture,
            &self.thresholds,
            self.scale_factor,
            &self.options,
            self.engine.as_ref(),
            self.assets.as_ref(),
            self.notifier.as_ref(),
        )
    }

    /// Decode raw image bytes (PNG, JPEG, or WebP) and emojify them.
    pub fn emojify_bytes(&self, input: &[u8]) -> Result<EmojifiedPhoto, EmojifyError> {
        let picture = pipeline::decode_image(input)?;
        self.emojify(&picture)
    }
}
