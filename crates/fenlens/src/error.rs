use fenlens_detect::{GeometryError, RectifyError};
use fenlens_fen::ClassifierError;

/// The one error a pipeline caller sees.
///
/// Each variant carries the measured quantity that caused it so a caller can
/// give actionable guidance ("move closer", "shoot more straight-on").
#[derive(thiserror::Error, Debug)]
pub enum FenPipelineError {
    #[error("failed to decode input image: {0}")]
    ImageDecodeFailed(String),
    #[error("no board-like quadrilateral found in the photo")]
    NotEnoughCorners,
    #[error("board too small in frame ({min_side_px:.0}px side, need {limit_px:.0}px) - move closer")]
    BoardTooSmall { min_side_px: f32, limit_px: f32 },
    #[error("board too distorted (side ratio {ratio:.2}, limit {limit:.2}) - shoot more straight-on")]
    BoardTooDistorted { ratio: f32, limit: f32 },
    #[error("rectified board would be only {size}px (need {limit}px)")]
    OutputSizeTooSmall { size: u32, limit: u32 },
    #[error("crop region invalid: {reason}")]
    CropRegionInvalid { reason: String },
    #[error("failed to encode output image: {0}")]
    EncodingFailed(String),
    #[error("piece classifier unavailable: {0}")]
    ClassifierUnavailable(String),
    #[error("unexpected pipeline failure: {0}")]
    Unexpected(String),
}

impl From<GeometryError> for FenPipelineError {
    fn from(err: GeometryError) -> Self {
        match err {
            // A degenerate candidate is not a plausible quad at all; report
            // it as a detection failure, not a geometry measurement.
            GeometryError::Degenerate => FenPipelineError::NotEnoughCorners,
            GeometryError::TooSmall { min_side_px, limit_px } => {
                FenPipelineError::BoardTooSmall { min_side_px, limit_px }
            }
            GeometryError::TooDistorted { ratio, limit } => {
                FenPipelineError::BoardTooDistorted { ratio, limit }
            }
            GeometryError::OutputTooSmall { size, limit } => {
                FenPipelineError::OutputSizeTooSmall { size, limit }
            }
        }
    }
}

impl From<RectifyError> for FenPipelineError {
    fn from(err: RectifyError) -> Self {
        match err {
            RectifyError::InvalidCrop { reason } => FenPipelineError::CropRegionInvalid { reason },
            RectifyError::HomographyFailed => {
                FenPipelineError::Unexpected("homography estimation failed".to_string())
            }
        }
    }
}

impl From<ClassifierError> for FenPipelineError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::ModelUnavailable(detail) => {
                FenPipelineError::ClassifierUnavailable(detail)
            }
            other => FenPipelineError::Unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_errors_keep_their_measurements() {
        let err: FenPipelineError = GeometryError::TooSmall {
            min_side_px: 42.0,
            limit_px: 80.0,
        }
        .into();
        assert!(matches!(
            err,
            FenPipelineError::BoardTooSmall { min_side_px, limit_px }
                if min_side_px == 42.0 && limit_px == 80.0
        ));
    }

    #[test]
    fn degenerate_quads_surface_as_detection_failure() {
        let err: FenPipelineError = GeometryError::Degenerate.into();
        assert!(matches!(err, FenPipelineError::NotEnoughCorners));
    }
}
