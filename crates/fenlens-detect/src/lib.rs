//! Board detection, validation and rectification for chessboard photos.
//!
//! The entry point is [`BoardLocator`], which runs an ordered chain of
//! strategies over a grayscale working image and a salient-corner cloud and
//! returns the best board quadrilateral it can find:
//!
//! 1. [`pattern`] — exact interior-corner lattice with outer extrapolation,
//! 2. [`contour`] — edge/contour quadrilateral fitting,
//! 3. [`cluster`] — extremal corner features per quadrant, as a last resort.
//!
//! The candidate then flows through [`GeometryValidator`] (hard plausibility
//! gates plus an advisory quality score) and [`PerspectiveRectifier`] (padded
//! crop, inward corner inset, homography warp into a canonical square), and
//! is finally cut into 64 tiles by [`TileGrid`].

mod cluster;
mod contour;
mod locator;
mod params;
mod pattern;
mod rectify;
mod tiles;
mod validate;

pub use cluster::locate_by_feature_cluster;
pub use contour::locate_by_contours;
pub use locator::{BoardCandidate, BoardLocator, CandidateSource};
pub use params::{
    ClusterParams, ContourParams, LocatorParams, PatternParams, RectifyParams, ValidatorParams,
};
pub use pattern::locate_by_pattern_grid;
pub use rectify::{PerspectiveRectifier, RectifiedBoard, RectifyError};
pub use tiles::{Tile, TileGrid};
pub use validate::{BoardGeometry, GeometryError, GeometryValidator, QualityScore};
