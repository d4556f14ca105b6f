use thiserror::Error;

use crate::classify::ExpressionCategory;

#[derive(Debug, Error)]
pub enum EmojifyError {
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("{name} threshold must be between 0.0 and 1.0, got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    #[error("scale factor must be finite and > 0, got {0}")]
    InvalidScaleFactor(f32),

    #[error("invalid face geometry: {0}")]
    InvalidFace(String),

    #[error("face detection failed: {0}")]
    Detection(String),

    #[error("failed to load overlay asset for {category:?}: {reason}")]
    AssetLoad {
        category: ExpressionCategory,
        reason: String,
    },
}
