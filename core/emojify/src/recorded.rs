use std::io::Read;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::EmojifyError;
use crate::face_detector::{
    Classification, DetectedFace, DetectionEngine, DetectorOptions, FaceDetector,
};

/// Detection engine that replays faces recorded by an external detector.
///
/// Serialized as a JSON array of faces:
///
/// ```json
/// [{"x": 40.0, "y": 32.0, "width": 120.0, "height": 120.0,
///   "smiling_probability": 0.91,
///   "left_eye_open_probability": 0.88,
///   "right_eye_open_probability": 0.12}]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedDetections {
    faces: Vec<DetectedFace>,
}

impl RecordedDetections {
    /// Replay `faces` in the given order.
    pub fn new(faces: Vec<DetectedFace>) -> Self {
        Self { faces }
    }

    /// Parse recorded faces from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, EmojifyError> {
        serde_json::from_str(json)
            .map_err(|e| EmojifyError::Detection(format!("invalid recorded detections: {e}")))
    }

    /// Parse recorded faces from a JSON reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, EmojifyError> {
        serde_json::from_reader(reader)
            .map_err(|e| EmojifyError::Detection(format!("invalid recorded detections: {e}")))
    }

    /// Serialize the recorded faces as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, EmojifyError> {
        serde_json::to_string_pretty(self).map_err(|e| EmojifyError::Detection(e.to_string()))
    }

    /// The recorded faces.
    pub fn faces(&self) -> &[DetectedFace] {
        &self.faces
    }
}

impl DetectionEngine for RecordedDetections {
    fn open(&self, options: &DetectorOptions) -> Result<Box<dyn FaceDetector>, EmojifyError> {
        Ok(Box::new(Replay {
            faces: self.faces.clone(),
            options: options.clone(),
        }))
    }
}

struct Replay {
    faces: Vec<DetectedFace>,
    options: DetectorOptions,
}

impl FaceDetector for Replay {
    fn detect(&mut self, _image: &DynamicImage) -> Result<Vec<DetectedFace>, EmojifyError> {
        let min = self.options.min_face_size as f32;
        let faces = self
            .faces
            .iter()
            .filter(|face| face.width >= min && face.height >= min)
            .cloned()
            .map(|mut face| {
                if self.options.classification == Classification::None {
                    face.smiling_probability = 0.0;
                    face.left_eye_open_probability = 0.0;
                    face.right_eye_open_probability = 0.0;
                }
                face
            })
            .collect();
        Ok(faces)
    }

    fn release(&mut self) {
        self.faces.clear();
    }
}
