use crate::error::EmojifyError;
use crate::face_detector::DetectedFace;

/// Minimum smiling probability for a face to count as smiling.
pub const SMILING_PROBABILITY_THRESHOLD: f32 = 0.654;

/// Minimum eye-open probability for an eye to count as open.
pub const EYE_OPEN_PROBABILITY_THRESHOLD: f32 = 0.454;

/// Expression of a single face, derived from its classification probabilities.
///
/// Each category is bound to exactly one overlay asset, see [`ExpressionCategory::asset_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "recorded", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "recorded", serde(rename_all = "snake_case"))]
pub enum ExpressionCategory {
    /// Smiling, both eyes open.
    Smile,
    /// Not smiling, both eyes open.
    Frown,
    /// Smiling, left eye closed.
    LeftWink,
    /// Smiling, right eye closed.
    RightWink,
    /// Not smiling, right eye closed.
    LeftWinkFrown,
    /// Not smiling, left eye closed.
    RightWinkFrown,
    /// Smiling, both eyes closed.
    ClosedEyeSmile,
    /// Not smiling, both eyes closed.
    ClosedEyeFrown,
}

/// Every category, in declaration order.
pub const ALL_CATEGORIES: [ExpressionCategory; 8] = [
    ExpressionCategory::Smile,
    ExpressionCategory::Frown,
    ExpressionCategory::LeftWink,
    ExpressionCategory::RightWink,
    ExpressionCategory::LeftWinkFrown,
    ExpressionCategory::RightWinkFrown,
    ExpressionCategory::ClosedEyeSmile,
    ExpressionCategory::ClosedEyeFrown,
];

impl ExpressionCategory {
    /// Stable name of the overlay asset drawn for this category.
    ///
    /// [`crate::DirectoryAssetStore`] resolves it to `<dir>/<name>.png`.
    pub fn asset_name(self) -> &'static str {
        match self {
            ExpressionCategory::Smile => "smile",
            ExpressionCategory::Frown => "frown",
            ExpressionCategory::LeftWink => "leftwink",
            ExpressionCategory::RightWink => "rightwink",
            ExpressionCategory::LeftWinkFrown => "leftwinkfrown",
            ExpressionCategory::RightWinkFrown => "rightwinkfrown",
            ExpressionCategory::ClosedEyeSmile => "closed_smile",
            ExpressionCategory::ClosedEyeFrown => "closed_frown",
        }
    }

    /// Map the boolean expression triple to its category.
    ///
    /// A smiling face with only the left eye open is a `RightWink`, while a
    /// frowning one is a `LeftWinkFrown`.
    pub fn from_expression(smiling: bool, left_eye_open: bool, right_eye_open: bool) -> Self {
        match (smiling, left_eye_open, right_eye_open) {
            (true, true, true) => ExpressionCategory::Smile,
            (true, true, false) => ExpressionCategory::RightWink,
            (true, false, true) => ExpressionCategory::LeftWink,
            (true, false, false) => ExpressionCategory::ClosedEyeSmile,
            (false, true, true) => ExpressionCategory::Frown,
            (false, true, false) => ExpressionCategory::LeftWinkFrown,
            (false, false, true) => ExpressionCategory::RightWinkFrown,
            (false, false, false) => ExpressionCategory::ClosedEyeFrown,
        }
    }
}

/// Probability cut-offs used to turn classification scores into booleans.
///
/// Both comparisons are inclusive: a probability equal to the threshold counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Cut-off for the smiling probability (default: 0.654).
    pub smiling: f32,
    /// Cut-off for each eye-open probability (default: 0.454).
    pub eye_open: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            smiling: SMILING_PROBABILITY_THRESHOLD,
            eye_open: EYE_OPEN_PROBABILITY_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub(crate) fn validate(&self) -> Result<(), EmojifyError> {
        for (name, value) in [("smiling", self.smiling), ("eye-open", self.eye_open)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EmojifyError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }

    /// Classify raw probabilities into an expression category.
    pub fn classify(
        &self,
        smiling: f32,
        left_eye_open: f32,
        right_eye_open: f32,
    ) -> ExpressionCategory {
        ExpressionCategory::from_expression(
            smiling >= self.smiling,
            left_eye_open >= self.eye_open,
            right_eye_open >= self.eye_open,
        )
    }

    /// Classify a detected face.
    pub fn classify_face(&self, face: &DetectedFace) -> ExpressionCategory {
        self.classify(
            face.smiling_probability,
            face.left_eye_open_probability,
            face.right_eye_open_probability,
        )
    }
}

/// Classify raw probabilities with the default thresholds.
pub fn classify(smiling: f32, left_eye_open: f32, right_eye_open: f32) -> ExpressionCategory {
    Thresholds::default().classify(smiling, left_eye_open, right_eye_open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn prob(flag: bool) -> f32 {
        if flag {
            0.9
        } else {
            0.1
        }
    }

    #[test]
    fn truth_table_is_total() {
        use ExpressionCategory::*;
        let table = [
            ((true, true, true), Smile),
            ((true, true, false), RightWink),
            ((true, false, true), LeftWink),
            ((true, false, false), ClosedEyeSmile),
            ((false, true, true), Frown),
            ((false, true, false), LeftWinkFrown),
            ((false, false, true), RightWinkFrown),
            ((false, false, false), ClosedEyeFrown),
        ];
        for ((smiling, left, right), expected) in table {
            assert_eq!(
                classify(prob(smiling), prob(left), prob(right)),
                expected,
                "smiling={smiling} left={left} right={right}"
            );
        }
    }

    #[test]
    fn every_category_is_reachable() {
        let mut seen = HashSet::new();
        for bits in 0..8u8 {
            seen.insert(ExpressionCategory::from_expression(
                bits & 4 != 0,
                bits & 2 != 0,
                bits & 1 != 0,
            ));
        }
        assert_eq!(seen.len(), ALL_CATEGORIES.len());
    }

    #[test]
    fn smiling_threshold_is_inclusive() {
        assert_eq!(classify(0.654, 1.0, 1.0), ExpressionCategory::Smile);
        assert_eq!(classify(0.6539999, 1.0, 1.0), ExpressionCategory::Frown);
    }

    #[test]
    fn eye_threshold_is_inclusive() {
        assert_eq!(classify(1.0, 0.454, 0.454), ExpressionCategory::Smile);
        assert_eq!(
            classify(1.0, 0.4539999, 0.454),
            ExpressionCategory::LeftWink
        );
        assert_eq!(
            classify(1.0, 0.454, 0.4539999),
            ExpressionCategory::RightWink
        );
    }

    #[test]
    fn custom_thresholds_shift_the_boundary() {
        let strict = Thresholds {
            smiling: 0.95,
            eye_open: 0.454,
        };
        assert_eq!(strict.classify(0.9, 1.0, 1.0), ExpressionCategory::Frown);
        assert_eq!(strict.classify(0.95, 1.0, 1.0), ExpressionCategory::Smile);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let too_high = Thresholds {
            smiling: 1.5,
            ..Thresholds::default()
        };
        assert!(too_high.validate().is_err());

        let nan = Thresholds {
            eye_open: f32::NAN,
            ..Thresholds::default()
        };
        assert!(nan.validate().is_err());

        assert!(Thresholds::default().validate().is_ok());
    }

    #[test]
    fn asset_names_are_unique() {
        let names: HashSet<_> = ALL_CATEGORIES.iter().map(|c| c.asset_name()).collect();
        assert_eq!(names.len(), ALL_CATEGORIES.len());
    }
}
