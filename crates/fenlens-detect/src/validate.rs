//! Geometric plausibility gates and advisory quality scoring for a board
//! candidate.

use fenlens_core::Quad;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::params::ValidatorParams;

/// Rejections with the measured quantity that caused them.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("candidate quadrilateral is degenerate (area ~ 0)")]
    Degenerate,
    #[error("board too small ({min_side_px:.1}px average side, need >= {limit_px:.1}px)")]
    TooSmall { min_side_px: f32, limit_px: f32 },
    #[error("board too distorted (opposite-side ratio {ratio:.2}, limit {limit:.2})")]
    TooDistorted { ratio: f32, limit: f32 },
    #[error("rectified output would be {size}px, need >= {limit}px")]
    OutputTooSmall { size: u32, limit: u32 },
}

/// Advisory 0–100 heuristic combining shape regularity and size.
///
/// Never a pipeline gate: a low total flags the result as low confidence,
/// nothing more.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    /// 50 at ratio 1.0, falling linearly to 0 at ratio 2.0.
    pub ratio_score: f32,
    /// 0 at a 100px minimum side, rising linearly to 50 at 200px.
    pub size_score: f32,
    pub total: f32,
}

impl QualityScore {
    fn compute(worst_ratio: f32, min_side: f32) -> Self {
        let ratio_score = ((2.0 - worst_ratio) * 50.0).clamp(0.0, 50.0);
        let size_score = ((min_side - 100.0) / 100.0 * 50.0).clamp(0.0, 50.0);
        Self {
            ratio_score,
            size_score,
            total: (ratio_score + size_score).clamp(0.0, 100.0),
        }
    }
}

/// Measurements of an accepted candidate, at working resolution.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub avg_width: f32,
    pub avg_height: f32,
    /// max/min of top and bottom side lengths, >= 1.
    pub width_ratio: f32,
    /// max/min of left and right side lengths, >= 1.
    pub height_ratio: f32,
    pub convex: bool,
    /// Canonical square output size S, in source-resolution pixels.
    pub output_size: u32,
    pub quality: QualityScore,
}

pub struct GeometryValidator {
    params: ValidatorParams,
}

impl GeometryValidator {
    pub fn new(params: ValidatorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ValidatorParams {
        &self.params
    }

    /// Validate a candidate quad measured at working resolution.
    ///
    /// `scale_to_source` is the factor mapping working coordinates back to
    /// the source image (>= 1); the canonical output size S is expressed at
    /// source resolution so rectification keeps the original detail.
    pub fn validate(
        &self,
        quad: &Quad,
        scale_to_source: f32,
    ) -> Result<BoardGeometry, GeometryError> {
        if quad.area() < 1e-3 {
            return Err(GeometryError::Degenerate);
        }

        let [top, right, bottom, left] = quad.side_lengths();
        let width_ratio = top.max(bottom) / top.min(bottom).max(1e-6);
        let height_ratio = left.max(right) / left.min(right).max(1e-6);

        let convex = quad.is_convex();
        if !convex {
            // Non-fatal: a crossed or dented quad often still rectifies, but
            // the caller should not trust it blindly.
            warn!("candidate quadrilateral is not convex (crossed corners?)");
        }

        let avg_width = (top + bottom) * 0.5;
        let avg_height = (left + right) * 0.5;
        let min_side = avg_width.min(avg_height);

        if min_side < self.params.min_side_px {
            return Err(GeometryError::TooSmall {
                min_side_px: min_side,
                limit_px: self.params.min_side_px,
            });
        }

        let worst_ratio = width_ratio.max(height_ratio);
        if worst_ratio > self.params.max_side_ratio {
            return Err(GeometryError::TooDistorted {
                ratio: worst_ratio,
                limit: self.params.max_side_ratio,
            });
        }

        // A chessboard is square; force the canonical output square.
        let output_size = (avg_width.max(avg_height) * scale_to_source).round() as u32;
        if output_size < self.params.min_output_size {
            return Err(GeometryError::OutputTooSmall {
                size: output_size,
                limit: self.params.min_output_size,
            });
        }

        Ok(BoardGeometry {
            avg_width,
            avg_height,
            width_ratio,
            height_ratio,
            convex,
            output_size,
            quality: QualityScore::compute(worst_ratio, min_side),
        })
    }
}
