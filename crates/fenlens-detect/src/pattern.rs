//! Interior-lattice strategy: when the photographed board exposes a regular
//! grid of interior saddle corners, use their exact positions and
//! extrapolate the four outer corners.

use fenlens_core::{Corner, Quad};
use kiddo::{KdTree, SquaredEuclidean};
use log::debug;
use nalgebra::{Point2, Vector2};

use crate::params::PatternParams;

/// Median nearest-neighbor distance and its median absolute deviation.
fn spacing_statistics(corners: &[Corner]) -> Option<(f32, f32)> {
    if corners.len() < 2 {
        return None;
    }

    let coords: Vec<[f32; 2]> = corners
        .iter()
        .map(|c| [c.position.x, c.position.y])
        .collect();
    let tree: KdTree<f32, 2> = (&coords).into();

    let mut spacings = Vec::with_capacity(corners.len());
    for (i, c) in corners.iter().enumerate() {
        let query = [c.position.x, c.position.y];
        let results = tree.nearest_n::<SquaredEuclidean>(&query, 2);
        for nn in results.into_iter() {
            let j = nn.item as usize;
            if j == i {
                continue;
            }
            spacings.push((corners[j].position - c.position).norm());
        }
    }
    if spacings.is_empty() {
        return None;
    }

    spacings.sort_by(|a, b| a.total_cmp(b));
    let median = spacings[spacings.len() / 2];

    let mut deviations: Vec<f32> = spacings.iter().map(|s| (s - median).abs()).collect();
    deviations.sort_by(|a, b| a.total_cmp(b));
    let mad = deviations[deviations.len() / 2];

    Some((median, mad))
}

/// Strength of the dominant saddle orientation over the cloud.
///
/// Chessboard corner orientations alternate between two diagonals π/2 apart
/// and are defined modulo π; folding by 4θ maps all of them onto a single
/// direction, so a regular lattice yields a mean vector near unit length
/// while unstructured clutter averages out.
fn lattice_orientation_coherence(corners: &[Corner]) -> f32 {
    let mut sum = Vector2::<f32>::zeros();
    let mut weight_sum = 0.0f32;

    for c in corners {
        let w = c.strength.max(0.0);
        if w <= 0.0 {
            continue;
        }
        let four_theta = 4.0 * c.orientation;
        sum += w * Vector2::new(four_theta.cos(), four_theta.sin());
        weight_sum += w;
    }

    if weight_sum <= 0.0 {
        return 0.0;
    }
    (sum / weight_sum).norm()
}

fn extremal_interior_quad(corners: &[Corner]) -> Quad {
    let sum = |p: Point2<f32>| p.x + p.y;
    let diff = |p: Point2<f32>| p.x - p.y;

    let mut tl = corners[0].position;
    let mut tr = corners[0].position;
    let mut br = corners[0].position;
    let mut bl = corners[0].position;
    for c in &corners[1..] {
        let p = c.position;
        if sum(p) < sum(tl) {
            tl = p;
        }
        if sum(p) > sum(br) {
            br = p;
        }
        if diff(p) > diff(tr) {
            tr = p;
        }
        if diff(p) < diff(bl) {
            bl = p;
        }
    }
    Quad::from_ordered([tl, tr, br, bl])
}

/// Extrapolate the outer board corners from the interior-corner quad.
///
/// The interior lattice spans 6 squares corner-to-corner while the board
/// spans 8, so each outer corner lies 1/6 of the way along the diagonal
/// from the opposite interior corner, extended outward.
fn extrapolate_outer(interior: &Quad) -> Quad {
    let c = &interior.corners;
    let push = |corner: Point2<f32>, opposite: Point2<f32>| {
        corner + (corner - opposite) / 6.0
    };
    Quad::from_ordered([
        push(c[0], c[2]), // TL away from BR
        push(c[1], c[3]), // TR away from BL
        push(c[2], c[0]), // BR away from TL
        push(c[3], c[1]), // BL away from TR
    ])
}

/// Locate the board from a regular interior-corner lattice.
///
/// Fails (returns `None`) unless the cloud is dense, evenly spaced and
/// orientation-coherent enough to be a near-complete 7×7 interior grid.
pub fn locate_by_pattern_grid(corners: &[Corner], params: &PatternParams) -> Option<Quad> {
    let strong: Vec<Corner> = corners
        .iter()
        .copied()
        .filter(|c| c.strength >= params.min_strength)
        .collect();

    if strong.len() < params.min_corners {
        debug!(
            "pattern strategy: {} corners after strength filter, need {}",
            strong.len(),
            params.min_corners
        );
        return None;
    }

    let (median_spacing, mad) = spacing_statistics(&strong)?;
    if median_spacing < params.min_spacing_pix {
        debug!("pattern strategy: spacing {median_spacing:.1}px below floor");
        return None;
    }
    if mad > params.spacing_tolerance * median_spacing {
        debug!(
            "pattern strategy: irregular spacing (median {median_spacing:.1}px, mad {mad:.1}px)"
        );
        return None;
    }

    let coherence = lattice_orientation_coherence(&strong);
    if coherence < 0.5 {
        debug!("pattern strategy: weak orientation coherence {coherence:.2}");
        return None;
    }

    let interior = extremal_interior_quad(&strong);
    if !interior.is_convex() {
        return None;
    }

    // A near-complete interior lattice spans 6×6 squares between its
    // extremal corners.
    let expected_area = (6.0 * median_spacing).powi(2);
    let ratio = interior.area() / expected_area;
    let (lo, hi) = params.span_area_window;
    if ratio < lo || ratio > hi {
        debug!(
            "pattern strategy: span area off ({:.0} vs expected {:.0})",
            interior.area(),
            expected_area
        );
        return None;
    }

    Some(extrapolate_outer(&interior))
}
