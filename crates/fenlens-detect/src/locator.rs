//! Ordered strategy chain for board localization.

use fenlens_core::{Corner, GrayImageView, Quad};
use log::info;
use serde::{Deserialize, Serialize};

use crate::cluster::locate_by_feature_cluster;
use crate::contour::locate_by_contours;
use crate::params::LocatorParams;
use crate::pattern::locate_by_pattern_grid;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Which strategy produced a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateSource {
    PatternGrid,
    ContourApprox,
    FeatureCluster,
}

/// A board-quadrilateral candidate at working resolution.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardCandidate {
    pub quad: Quad,
    pub source: CandidateSource,
    pub area: f32,
}

/// Runs the detection strategies in order of decreasing precision; the first
/// success wins.
///
/// 1. [`locate_by_pattern_grid`] — exact interior corners, extrapolated.
/// 2. [`locate_by_contours`] — board outline from the edge map.
/// 3. [`locate_by_feature_cluster`] — extremal features, last resort.
pub struct BoardLocator {
    params: LocatorParams,
}

impl BoardLocator {
    pub fn new(params: LocatorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    /// Find the most plausible board quadrilateral in the working image.
    ///
    /// `corners` is the salient-corner cloud detected on the same image;
    /// strategies that do not need it ignore it. Returns `None` when no
    /// strategy produces a usable quad.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img, corners), fields(width = img.width, height = img.height, corners = corners.len()))
    )]
    pub fn locate(
        &self,
        img: &GrayImageView<'_>,
        corners: &[Corner],
    ) -> Option<BoardCandidate> {
        if let Some(quad) = locate_by_pattern_grid(corners, &self.params.pattern) {
            return Some(self.candidate(quad, CandidateSource::PatternGrid));
        }

        if let Some(quad) = locate_by_contours(img, &self.params.contour) {
            return Some(self.candidate(quad, CandidateSource::ContourApprox));
        }

        if let Some(quad) = locate_by_feature_cluster(corners, &self.params.cluster) {
            return Some(self.candidate(quad, CandidateSource::FeatureCluster));
        }

        info!("no board candidate from any strategy");
        None
    }

    fn candidate(&self, quad: Quad, source: CandidateSource) -> BoardCandidate {
        let area = quad.area();
        info!("board candidate via {source:?}, area {area:.0}px^2");
        BoardCandidate { quad, source, area }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fenlens_core::GrayImage;
    use nalgebra::Point2;
    use std::f32::consts::FRAC_PI_4;

    fn blank(size: usize) -> GrayImage {
        GrayImage {
            width: size,
            height: size,
            data: vec![128u8; size * size],
        }
    }

    fn lattice_corners() -> Vec<Corner> {
        let mut corners = Vec::new();
        for j in 0..7 {
            for i in 0..7 {
                corners.push(Corner {
                    position: Point2::new(100.0 + i as f32 * 40.0, 100.0 + j as f32 * 40.0),
                    strength: 1.0,
                    orientation: if (i + j) % 2 == 0 {
                        FRAC_PI_4
                    } else {
                        3.0 * FRAC_PI_4
                    },
                });
            }
        }
        corners
    }

    #[test]
    fn pattern_grid_wins_over_fallbacks() {
        let img = blank(500);
        let locator = BoardLocator::new(LocatorParams::default());
        let candidate = locator
            .locate(&img.view(), &lattice_corners())
            .expect("candidate");
        assert_eq!(candidate.source, CandidateSource::PatternGrid);
    }

    #[test]
    fn sparse_corners_fall_through_to_cluster() {
        let img = blank(500);
        let corners = vec![
            Corner {
                position: Point2::new(50.0, 50.0),
                strength: 1.0,
                orientation: 0.0,
            },
            Corner {
                position: Point2::new(400.0, 60.0),
                strength: 1.0,
                orientation: 0.0,
            },
            Corner {
                position: Point2::new(410.0, 420.0),
                strength: 1.0,
                orientation: 0.0,
            },
            Corner {
                position: Point2::new(40.0, 400.0),
                strength: 1.0,
                orientation: 0.0,
            },
        ];
        let locator = BoardLocator::new(LocatorParams::default());
        let candidate = locator.locate(&img.view(), &corners).expect("candidate");
        assert_eq!(candidate.source, CandidateSource::FeatureCluster);
    }

    #[test]
    fn nothing_to_find_is_none() {
        let img = blank(300);
        let locator = BoardLocator::new(LocatorParams::default());
        assert!(locator.locate(&img.view(), &[]).is_none());
    }
}
