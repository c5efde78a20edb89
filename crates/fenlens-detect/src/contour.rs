//! Contour-approximation strategy: edge map → closed boundaries → polygon
//! approximation → best convex quadrilateral.

use fenlens_core::{GrayImage, GrayImageView, Quad};
use log::debug;
use nalgebra::Point2;

use crate::params::ContourParams;

const SOBEL_GX: [[i16; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_GY: [[i16; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

struct EdgeMap {
    data: Vec<u8>, // 0 or 1
    width: usize,
    height: usize,
}

impl EdgeMap {
    #[inline]
    fn is_edge(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x] != 0
    }
}

fn box_blur(src: &GrayImageView<'_>, radius: usize) -> GrayImage {
    if radius == 0 {
        return GrayImage {
            width: src.width,
            height: src.height,
            data: src.data.to_vec(),
        };
    }

    let w = src.width;
    let h = src.height;
    let r = radius as i32;
    let norm = (2 * radius + 1) as u32;

    // Horizontal pass.
    let mut tmp = vec![0u8; w * h];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = 0u32;
            for dx in -r..=r {
                let sx = (x as i32 + dx).clamp(0, w as i32 - 1) as usize;
                acc += src.data[row + sx] as u32;
            }
            tmp[row + x] = (acc / norm) as u8;
        }
    }

    // Vertical pass.
    let mut out = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = 0u32;
            for dy in -r..=r {
                let sy = (y as i32 + dy).clamp(0, h as i32 - 1) as usize;
                acc += tmp[sy * w + x] as u32;
            }
            out[y * w + x] = (acc / norm) as u8;
        }
    }

    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}

fn sobel_edge_map(img: &GrayImageView<'_>, threshold: u16) -> EdgeMap {
    let w = img.width;
    let h = img.height;
    let mut map = EdgeMap {
        data: vec![0u8; w * h],
        width: w,
        height: h,
    };

    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let mut gx: i32 = 0;
            let mut gy: i32 = 0;
            for ky in 0..3 {
                let row = (y + ky - 1) * w;
                for kx in 0..3 {
                    let v = img.data[row + x + kx - 1] as i32;
                    gx += v * SOBEL_GX[ky][kx] as i32;
                    gy += v * SOBEL_GY[ky][kx] as i32;
                }
            }
            let mag = ((gx * gx + gy * gy) as f64).sqrt() as u16;
            if mag > threshold {
                map.data[y * w + x] = 1;
            }
        }
    }

    map
}

/// 3×3 dilation, closing single-pixel gaps in the edge map.
fn dilate(map: &EdgeMap) -> EdgeMap {
    let w = map.width;
    let h = map.height;
    let mut out = vec![0u8; w * h];

    for y in 0..h {
        for x in 0..w {
            if map.data[y * w + x] == 0 {
                continue;
            }
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(h - 1);
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    out[ny * w + nx] = 1;
                }
            }
        }
    }

    EdgeMap {
        data: out,
        width: w,
        height: h,
    }
}

// Clockwise 8-neighborhood: E, SE, S, SW, W, NW, N, NE.
const STEPS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Moore-neighbor boundary trace starting at `(sx, sy)`. Marks every visited
/// boundary pixel in `visited`.
fn trace_boundary(
    map: &EdgeMap,
    visited: &mut [bool],
    sx: usize,
    sy: usize,
) -> Vec<(usize, usize)> {
    let w = map.width;
    let start = (sx, sy);
    let mut contour = vec![start];
    visited[sy * w + sx] = true;

    let mut cur = start;
    // The raster scan reached the start from an empty West side, so begin
    // the clockwise sweep looking North.
    let mut dir = 6usize;
    // An out-and-back trace of a frame-sized open curve stays well under
    // this.
    let max_len = 8 * (map.width + map.height);

    loop {
        let mut advanced = false;
        for i in 0..8 {
            let d = (dir + i) % 8;
            let nx = cur.0 as i32 + STEPS[d].0;
            let ny = cur.1 as i32 + STEPS[d].1;
            if nx < 0 || ny < 0 || nx >= map.width as i32 || ny >= map.height as i32 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !map.is_edge(nx, ny) {
                continue;
            }

            cur = (nx, ny);
            visited[ny * w + nx] = true;
            if cur == start {
                return contour;
            }
            contour.push(cur);
            // Resume the sweep from the direction 90° counter-clockwise of
            // the move just taken.
            dir = (d + 6) % 8;
            advanced = true;
            break;
        }

        if !advanced || contour.len() > max_len {
            return contour;
        }
    }
}

fn extract_contours(map: &EdgeMap, min_len: usize) -> Vec<Vec<(usize, usize)>> {
    let mut visited = vec![false; map.width * map.height];
    let mut contours = Vec::new();

    for y in 0..map.height {
        for x in 0..map.width {
            if !map.is_edge(x, y) || visited[y * map.width + x] {
                continue;
            }
            // Only start traces on a left boundary pixel.
            if x > 0 && map.is_edge(x - 1, y) {
                continue;
            }
            let contour = trace_boundary(map, &mut visited, x, y);
            if contour.len() >= min_len {
                contours.push(contour);
            }
        }
    }

    contours
}

fn perimeter(contour: &[(usize, usize)]) -> f32 {
    let mut acc = 0.0f32;
    for k in 0..contour.len() {
        let a = contour[k];
        let b = contour[(k + 1) % contour.len()];
        let dx = a.0 as f32 - b.0 as f32;
        let dy = a.1 as f32 - b.1 as f32;
        acc += (dx * dx + dy * dy).sqrt();
    }
    acc
}

fn point_segment_distance(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = vx * vx + vy * vy;
    if len_sq < 1e-12 {
        let (dx, dy) = (p.0 - a.0, p.1 - a.1);
        return (dx * dx + dy * dy).sqrt();
    }
    // Perpendicular distance to the infinite line through a, b; the anchors
    // of a closed-curve split make the segment assumption safe here.
    ((b.0 - a.0) * (a.1 - p.1) - (a.0 - p.0) * (b.1 - a.1)).abs() / len_sq.sqrt()
}

fn douglas_peucker(pts: &[(f32, f32)], lo: usize, hi: usize, eps: f32, keep: &mut Vec<usize>) {
    if hi <= lo + 1 {
        return;
    }
    let mut max_d = 0.0f32;
    let mut max_k = lo;
    for k in lo + 1..hi {
        let d = point_segment_distance(pts[k], pts[lo], pts[hi]);
        if d > max_d {
            max_d = d;
            max_k = k;
        }
    }
    if max_d > eps {
        douglas_peucker(pts, lo, max_k, eps, keep);
        keep.push(max_k);
        douglas_peucker(pts, max_k, hi, eps, keep);
    }
}

/// Approximate a closed contour by a polygon with tolerance `eps`.
fn approx_polygon(contour: &[(usize, usize)], eps: f32) -> Vec<Point2<f32>> {
    let pts: Vec<(f32, f32)> = contour
        .iter()
        .map(|&(x, y)| (x as f32, y as f32))
        .collect();

    // Split the closed curve at the point farthest from the first, then
    // simplify both halves.
    let mut far = 0usize;
    let mut far_d = 0.0f32;
    for (k, p) in pts.iter().enumerate() {
        let dx = p.0 - pts[0].0;
        let dy = p.1 - pts[0].1;
        let d = dx * dx + dy * dy;
        if d > far_d {
            far_d = d;
            far = k;
        }
    }
    if far == 0 {
        return Vec::new();
    }

    let mut keep = vec![0usize];
    douglas_peucker(&pts, 0, far, eps, &mut keep);
    keep.push(far);
    let mut tail = Vec::new();
    douglas_peucker(&pts, far, pts.len() - 1, eps, &mut tail);
    keep.extend(tail);
    // The final point closes back onto the start; keep it only if it is not
    // the start itself.
    let last = pts.len() - 1;
    let closes = (pts[last].0 - pts[0].0).abs() < 1.5 && (pts[last].1 - pts[0].1).abs() < 1.5;
    if !closes {
        keep.push(last);
    }

    keep.sort_unstable();
    keep.dedup();
    keep.iter().map(|&k| Point2::new(pts[k].0, pts[k].1)).collect()
}

fn corner_near_frame_edge(quad: &Quad, width: usize, height: usize, margin: f32) -> bool {
    quad.corners.iter().any(|p| {
        p.x < margin || p.y < margin || p.x > width as f32 - 1.0 - margin
            || p.y > height as f32 - 1.0 - margin
    })
}

/// Locate the board quadrilateral via edge contours.
///
/// Returns the maximum-area convex quadrilateral that is neither frame-sized
/// nor pinned to the frame boundary.
pub fn locate_by_contours(img: &GrayImageView<'_>, params: &ContourParams) -> Option<Quad> {
    if img.width < 8 || img.height < 8 {
        return None;
    }

    let blurred = box_blur(img, params.blur_radius);
    let edges = sobel_edge_map(&blurred.view(), params.edge_threshold);
    drop(blurred);
    let edges = dilate(&edges);

    let contours = extract_contours(&edges, params.min_contour_len);
    debug!("contour strategy: {} closed contours", contours.len());

    let frame_area = (img.width * img.height) as f32;
    let mut best: Option<(Quad, f32)> = None;
    let mut considered = 0usize;

    for contour in &contours {
        let eps = params.approx_tolerance_frac * perimeter(contour);
        let poly = approx_polygon(contour, eps);
        if poly.len() != 4 {
            continue;
        }
        considered += 1;

        let quad = Quad::from_unordered([poly[0], poly[1], poly[2], poly[3]]);
        if !quad.is_convex() {
            continue;
        }

        let area = quad.area();
        if area > params.max_frame_fraction * frame_area {
            continue; // likely the image border
        }
        if area < params.min_frame_fraction * frame_area {
            continue;
        }
        if corner_near_frame_edge(&quad, img.width, img.height, params.edge_margin_px) {
            continue;
        }

        match &best {
            Some((_, best_area)) if *best_area >= area => {}
            _ => best = Some((quad, area)),
        }
    }

    debug!(
        "contour strategy: {} quad candidates, best area {:?}",
        considered,
        best.as_ref().map(|(_, a)| *a)
    );
    best.map(|(q, _)| q)
}
