//! Feature-cluster strategy: last-resort board localization from salient
//! corner points alone, with no lattice assumption.

use fenlens_core::{Corner, Quad};
use log::debug;
use nalgebra::Point2;

use crate::params::ClusterParams;

/// Greedy thinning: keep corners strongest-first, dropping any that falls
/// within `min_separation` of an already kept one.
fn thin_by_separation(corners: &[Corner], min_separation: f32) -> Vec<Corner> {
    let mut sorted: Vec<Corner> = corners.to_vec();
    sorted.sort_by(|a, b| b.strength.total_cmp(&a.strength));

    let min_sep_sq = min_separation * min_separation;
    let mut kept: Vec<Corner> = Vec::new();
    for c in sorted {
        let separated = kept
            .iter()
            .all(|k| (k.position - c.position).norm_squared() >= min_sep_sq);
        if separated {
            kept.push(c);
        }
    }
    kept
}

/// One extremal point per quadrant around the centroid, by the directional
/// metric that defines the quad ordering (TL min x+y, TR max x−y, BR max
/// x+y, BL min x−y).
fn quadrant_extremes(points: &[Corner]) -> Option<[Point2<f32>; 4]> {
    let n = points.len() as f32;
    let mut cx = 0.0f32;
    let mut cy = 0.0f32;
    for c in points {
        cx += c.position.x;
        cy += c.position.y;
    }
    cx /= n;
    cy /= n;

    let mut tl: Option<Point2<f32>> = None;
    let mut tr: Option<Point2<f32>> = None;
    let mut br: Option<Point2<f32>> = None;
    let mut bl: Option<Point2<f32>> = None;

    for c in points {
        let p = c.position;
        if p.x < cx && p.y < cy {
            if tl.is_none_or(|q| p.x + p.y < q.x + q.y) {
                tl = Some(p);
            }
        } else if p.x >= cx && p.y < cy {
            if tr.is_none_or(|q| p.x - p.y > q.x - q.y) {
                tr = Some(p);
            }
        } else if p.x >= cx && p.y >= cy {
            if br.is_none_or(|q| p.x + p.y > q.x + q.y) {
                br = Some(p);
            }
        } else if bl.is_none_or(|q| p.x - p.y < q.x - q.y) {
            bl = Some(p);
        }
    }

    Some([tl?, tr?, br?, bl?])
}

/// Locate a board quad from extremal corner features.
///
/// This is the loosest strategy in the chain: it only promises a convex,
/// non-degenerate hull of the strongest well-separated features. Sub-pixel
/// accuracy, when available, comes from the upstream corner refiner.
pub fn locate_by_feature_cluster(corners: &[Corner], params: &ClusterParams) -> Option<Quad> {
    let strong: Vec<Corner> = corners
        .iter()
        .copied()
        .filter(|c| c.strength >= params.min_strength)
        .collect();

    let separated = thin_by_separation(&strong, params.min_separation_pix);
    if separated.len() < params.min_points.max(4) {
        debug!(
            "cluster strategy: {} separable points, need {}",
            separated.len(),
            params.min_points.max(4)
        );
        return None;
    }

    let extremes = quadrant_extremes(&separated)?;
    let quad = Quad::from_ordered(extremes);
    if !quad.is_convex() || quad.area() <= 0.0 {
        debug!("cluster strategy: extremal quad degenerate");
        return None;
    }

    Some(quad)
}
