//! Diagnostic overlay: the detected quadrilateral drawn onto the source
//! photo. Never required for FEN production.

use fenlens_core::Quad;
use image::{Rgb, RgbImage};
use nalgebra::Point2;

const OUTLINE: Rgb<u8> = Rgb([235, 64, 52]);
const CORNER: Rgb<u8> = Rgb([52, 178, 235]);

fn put(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn draw_segment(img: &mut RgbImage, a: Point2<f32>, b: Point2<f32>, color: Rgb<u8>) {
    let steps = (b - a).norm().ceil().max(1.0) as usize;
    for k in 0..=steps {
        let t = k as f32 / steps as f32;
        let x = (a.x + (b.x - a.x) * t).round() as i32;
        let y = (a.y + (b.y - a.y) * t).round() as i32;
        // 3px-wide stroke
        for dy in -1..=1 {
            for dx in -1..=1 {
                put(img, x + dx, y + dy, color);
            }
        }
    }
}

fn draw_disc(img: &mut RgbImage, center: Point2<f32>, radius: i32, color: Rgb<u8>) {
    let cx = center.x.round() as i32;
    let cy = center.y.round() as i32;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put(img, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draw the detected board quadrilateral onto a copy of the source image.
pub fn annotate_detection(src: &RgbImage, quad: &Quad) -> RgbImage {
    let mut out = src.clone();
    for k in 0..4 {
        let a = quad.corners[k];
        let b = quad.corners[(k + 1) % 4];
        draw_segment(&mut out, a, b, OUTLINE);
    }
    for corner in &quad.corners {
        draw_disc(&mut out, *corner, 4, CORNER);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_touches_the_quad_edges_only() {
        let src = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let quad = Quad::from_ordered([
            Point2::new(20.0, 20.0),
            Point2::new(80.0, 20.0),
            Point2::new(80.0, 80.0),
            Point2::new(20.0, 80.0),
        ]);
        let out = annotate_detection(&src, &quad);

        assert_eq!(*out.get_pixel(50, 20), OUTLINE); // top edge
        assert_eq!(*out.get_pixel(20, 50), OUTLINE); // left edge
        assert_eq!(*out.get_pixel(20, 20), CORNER); // corner disc
        assert_eq!(*out.get_pixel(50, 50), Rgb([0, 0, 0])); // interior untouched
    }
}
