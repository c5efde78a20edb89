use nalgebra::Point2;

/// A salient corner-like feature point.
///
/// `orientation` is the local edge direction in radians, defined modulo π
/// (a chessboard saddle point has two diagonals; the detector reports one).
#[derive(Clone, Copy, Debug)]
pub struct Corner {
    pub position: Point2<f32>,
    pub strength: f32,
    pub orientation: f32,
}
