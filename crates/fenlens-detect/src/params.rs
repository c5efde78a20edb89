use serde::{Deserialize, Serialize};

/// Parameters for the contour-approximation strategy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContourParams {
    /// Box-blur radius applied before gradient computation (0 disables).
    pub blur_radius: usize,
    /// Sobel gradient magnitude threshold for the edge map.
    pub edge_threshold: u16,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_tolerance_frac: f32,
    /// Candidates covering more than this fraction of the frame are rejected
    /// (almost certainly the image border, not the board).
    pub max_frame_fraction: f32,
    /// Candidates with a corner closer than this to the frame boundary are
    /// rejected as spurious.
    pub edge_margin_px: f32,
    /// Candidates smaller than this fraction of the frame are ignored.
    pub min_frame_fraction: f32,
    /// Contours shorter than this many boundary pixels are not considered.
    pub min_contour_len: usize,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            blur_radius: 1,
            edge_threshold: 40,
            approx_tolerance_frac: 0.025,
            max_frame_fraction: 0.88,
            edge_margin_px: 3.0,
            min_frame_fraction: 0.02,
            min_contour_len: 60,
        }
    }
}

/// Parameters for the interior-lattice strategy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternParams {
    /// Minimal corner strength to consider.
    pub min_strength: f32,
    /// Minimal number of interior corners for the lattice to count as
    /// detected (a full chessboard has 49).
    pub min_corners: usize,
    /// Maximal allowed dispersion of nearest-neighbor spacings, as a
    /// fraction of the median spacing.
    pub spacing_tolerance: f32,
    /// Lattices with median spacing below this are noise.
    pub min_spacing_pix: f32,
    /// Accepted ratio window between the extremal-quad area and the area an
    /// ideal 6×6-square interior span would cover.
    pub span_area_window: (f32, f32),
}

impl Default for PatternParams {
    fn default() -> Self {
        Self {
            min_strength: 0.0,
            min_corners: 40,
            spacing_tolerance: 0.25,
            min_spacing_pix: 8.0,
            span_area_window: (0.8, 1.3),
        }
    }
}

/// Parameters for the feature-cluster fallback strategy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Minimal corner strength to consider.
    pub min_strength: f32,
    /// Minimal pairwise separation between retained points, in pixels.
    pub min_separation_pix: f32,
    /// Minimal number of separable points (one per quadrant is the floor).
    pub min_points: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_strength: 0.0,
            min_separation_pix: 12.0,
            min_points: 4,
        }
    }
}

/// Parameters for the full strategy chain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LocatorParams {
    pub pattern: PatternParams,
    pub contour: ContourParams,
    pub cluster: ClusterParams,
}

/// Hard plausibility gates and quality scoring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorParams {
    /// Minimal average board side, in working-resolution pixels.
    pub min_side_px: f32,
    /// Maximal opposite-side length ratio before the perspective is
    /// considered too oblique to rectify reliably.
    pub max_side_ratio: f32,
    /// Minimal canonical output size S.
    pub min_output_size: u32,
}

impl Default for ValidatorParams {
    fn default() -> Self {
        Self {
            min_side_px: 80.0,
            max_side_ratio: 1.3,
            min_output_size: 64,
        }
    }
}

/// Crop and warp tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RectifyParams {
    /// Outward padding of the crop bounding box, as a fraction of its size.
    pub pad_frac: f32,
    /// Inward corner inset toward the quad centroid before solving the
    /// homography. Trims partial edge squares and background at the cost of
    /// clipping the outermost ranks when set too high.
    pub inset_frac: f32,
}

impl Default for RectifyParams {
    fn default() -> Self {
        Self {
            pad_frac: 0.03,
            inset_frac: 0.01,
        }
    }
}
