use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// An ordered quadrilateral: corners are `[TL, TR, BR, BL]`.
///
/// Ordering is fixed by the directional metrics: TL minimizes x+y,
/// BR maximizes x+y, TR maximizes x−y, BL minimizes x−y. The type does not
/// guarantee non-degeneracy; callers gate on [`Quad::area`] before using the
/// corners to solve a homography.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2<f32>; 4],
}

impl Quad {
    /// Build a quad from four corners in arbitrary order.
    pub fn from_unordered(pts: [Point2<f32>; 4]) -> Self {
        let sum = |p: &Point2<f32>| p.x + p.y;
        let diff = |p: &Point2<f32>| p.x - p.y;

        let mut tl = pts[0];
        let mut tr = pts[0];
        let mut br = pts[0];
        let mut bl = pts[0];
        for p in &pts[1..] {
            if sum(p) < sum(&tl) {
                tl = *p;
            }
            if sum(p) > sum(&br) {
                br = *p;
            }
            if diff(p) > diff(&tr) {
                tr = *p;
            }
            if diff(p) < diff(&bl) {
                bl = *p;
            }
        }
        Self {
            corners: [tl, tr, br, bl],
        }
    }

    /// Build a quad whose corners are already ordered `[TL, TR, BR, BL]`.
    pub fn from_ordered(corners: [Point2<f32>; 4]) -> Self {
        Self { corners }
    }

    #[inline]
    pub fn top_left(&self) -> Point2<f32> {
        self.corners[0]
    }

    #[inline]
    pub fn top_right(&self) -> Point2<f32> {
        self.corners[1]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        self.corners[2]
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        self.corners[3]
    }

    /// Shoelace area of the polygon TL→TR→BR→BL.
    pub fn area(&self) -> f32 {
        let c = &self.corners;
        let mut acc = 0.0f32;
        for k in 0..4 {
            let p = c[k];
            let q = c[(k + 1) % 4];
            acc += p.x * q.y - q.x * p.y;
        }
        0.5 * acc.abs()
    }

    /// True when all edge cross products share one sign (strictly convex,
    /// not self-intersecting).
    pub fn is_convex(&self) -> bool {
        let c = &self.corners;
        let mut pos = false;
        let mut neg = false;
        for k in 0..4 {
            let a = c[k];
            let b = c[(k + 1) % 4];
            let d = c[(k + 2) % 4];
            let cross = (b.x - a.x) * (d.y - b.y) - (b.y - a.y) * (d.x - b.x);
            if cross > 0.0 {
                pos = true;
            } else if cross < 0.0 {
                neg = true;
            }
        }
        pos != neg
    }

    pub fn centroid(&self) -> Point2<f32> {
        let c = &self.corners;
        Point2::new(
            (c[0].x + c[1].x + c[2].x + c[3].x) * 0.25,
            (c[0].y + c[1].y + c[2].y + c[3].y) * 0.25,
        )
    }

    /// Side lengths in order `[top, right, bottom, left]`.
    pub fn side_lengths(&self) -> [f32; 4] {
        let c = &self.corners;
        let d = |a: Point2<f32>, b: Point2<f32>| (b - a).norm();
        [
            d(c[0], c[1]), // TL -> TR
            d(c[1], c[2]), // TR -> BR
            d(c[2], c[3]), // BR -> BL
            d(c[3], c[0]), // BL -> TL
        ]
    }

    /// Axis-aligned bounding box as (min, max) points.
    pub fn bounding_box(&self) -> (Point2<f32>, Point2<f32>) {
        let c = &self.corners;
        let mut min = c[0];
        let mut max = c[0];
        for p in &c[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }

    /// Uniformly scale all corners about the origin. Used to map a quad
    /// detected at working resolution back to source coordinates.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            corners: self
                .corners
                .map(|p| Point2::new(p.x * factor, p.y * factor)),
        }
    }

    /// Translate all corners by `(dx, dy)`. Pass the negated crop origin to
    /// express corners in crop-local coordinates.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            corners: self.corners.map(|p| Point2::new(p.x + dx, p.y + dy)),
        }
    }

    /// Move every corner toward the centroid by `frac` of its distance.
    pub fn inset_toward_centroid(&self, frac: f32) -> Self {
        let c = self.centroid();
        Self {
            corners: self.corners.map(|p| {
                Point2::new(p.x + (c.x - p.x) * frac, p.y + (c.y - p.y) * frac)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> [Point2<f32>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn ordering_is_invariant_to_input_permutation() {
        let pts = unit_square();
        let shuffled = [pts[2], pts[0], pts[3], pts[1]];
        let q = Quad::from_unordered(shuffled);
        assert_eq!(q.top_left(), Point2::new(0.0, 0.0));
        assert_eq!(q.top_right(), Point2::new(1.0, 0.0));
        assert_eq!(q.bottom_right(), Point2::new(1.0, 1.0));
        assert_eq!(q.bottom_left(), Point2::new(0.0, 1.0));
    }

    #[test]
    fn area_and_convexity_of_square() {
        let q = Quad::from_unordered(unit_square());
        assert!((q.area() - 1.0).abs() < 1e-6);
        assert!(q.is_convex());
    }

    #[test]
    fn collinear_points_have_zero_area() {
        let q = Quad::from_ordered([
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(3.0, 3.0),
        ]);
        assert!(q.area() < 1e-6);
    }

    #[test]
    fn inset_moves_corners_toward_centroid() {
        let q = Quad::from_unordered(unit_square()).inset_toward_centroid(0.1);
        assert!((q.top_left().x - 0.05).abs() < 1e-6);
        assert!((q.bottom_right().x - 0.95).abs() < 1e-6);
        assert!(q.area() < 1.0);
    }

    #[test]
    fn side_lengths_follow_edge_order() {
        let q = Quad::from_unordered([
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 2.0),
            Point2::new(0.0, 2.0),
        ]);
        let [top, right, bottom, left] = q.side_lengths();
        assert!((top - 4.0).abs() < 1e-6);
        assert!((bottom - 4.0).abs() < 1e-6);
        assert!((right - 2.0).abs() < 1e-6);
        assert!((left - 2.0).abs() < 1e-6);
    }
}
