//! Synthetic board scenes for integration tests.
#![allow(dead_code)] // each test binary uses a different subset
//!
//! Pieces are rendered as flat discs whose intensity encodes the label; the
//! paired [`CodeClassifier`] reads the code back from the tile center. This
//! keeps the classifier trivial and deterministic while exercising the whole
//! geometric pipeline: if rectification or tiling misalign, the codes land on
//! the wrong squares and the FEN comes out wrong.

use fenlens::core::{homography_from_quad, sample_bilinear_u8, GrayImage, GrayImageView, Quad};
use fenlens::fen::{ClassifierError, PieceClassifier, PieceLabel, CLASSIFIER_LABELS, LABEL_COUNT};
use nalgebra::Point2;

pub const SQUARE: usize = 64;
pub const BORDER: usize = 6;
pub const LIGHT: u8 = 200;
pub const DARK: u8 = 120;
pub const BORDER_SHADE: u8 = 20;
pub const BACKGROUND: u8 = 255;

/// Disc intensity per piece, pinned to `CLASSIFIER_LABELS[1..]`. All codes
/// keep a >= 16 gray-level distance from each other and from both square
/// shades.
const PIECE_CODES: [u8; 12] = [8, 24, 40, 56, 72, 88, 136, 152, 168, 184, 224, 240];

pub fn piece_code(label: PieceLabel) -> Option<u8> {
    CLASSIFIER_LABELS
        .iter()
        .position(|&l| l == label)
        .filter(|&idx| idx > 0)
        .map(|idx| PIECE_CODES[idx - 1])
}

/// Render the canonical board: 8×8 squares with a dark outer border, pieces
/// as intensity-coded discs. Row 0 is rank 8.
pub fn render_board(labels: &[PieceLabel; 64]) -> GrayImage {
    let side = 8 * SQUARE + 2 * BORDER;
    let mut img = GrayImage {
        width: side,
        height: side,
        data: vec![BORDER_SHADE; side * side],
    };

    for row in 0..8 {
        for col in 0..8 {
            let shade = if (row + col) % 2 == 0 { LIGHT } else { DARK };
            let x0 = BORDER + col * SQUARE;
            let y0 = BORDER + row * SQUARE;
            for y in y0..y0 + SQUARE {
                for x in x0..x0 + SQUARE {
                    img.set(x, y, shade);
                }
            }

            if let Some(code) = piece_code(labels[row * 8 + col]) {
                let cx = (x0 + SQUARE / 2) as i32;
                let cy = (y0 + SQUARE / 2) as i32;
                let r = (SQUARE as i32 * 3) / 10;
                for dy in -r..=r {
                    for dx in -r..=r {
                        if dx * dx + dy * dy <= r * r {
                            img.set((cx + dx) as usize, (cy + dy) as usize, code);
                        }
                    }
                }
            }
        }
    }

    img
}

/// Project the canonical board into a photo: the given quad receives the
/// board, everything else stays background.
pub fn photograph(board: &GrayImage, width: u32, height: u32, quad: &Quad) -> image::GrayImage {
    let board_corners = [
        Point2::new(0.0, 0.0),
        Point2::new(board.width as f32, 0.0),
        Point2::new(board.width as f32, board.height as f32),
        Point2::new(0.0, board.height as f32),
    ];
    let h_board_from_photo =
        homography_from_quad(&quad.corners, &board_corners).expect("projective placement");

    let view = board.view();
    image::GrayImage::from_fn(width, height, |x, y| {
        let p = h_board_from_photo.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
        if p.x >= 0.0 && p.y >= 0.0 && p.x < board.width as f32 && p.y < board.height as f32 {
            image::Luma([sample_bilinear_u8(&view, p.x, p.y)])
        } else {
            image::Luma([BACKGROUND])
        }
    })
}

pub fn png_bytes(img: &image::GrayImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("png encode");
    out.into_inner()
}

/// Decodes the disc intensity at the tile center back into a label.
pub struct CodeClassifier;

impl PieceClassifier for CodeClassifier {
    fn input_size(&self) -> u32 {
        32
    }

    fn classify(&self, tile: &GrayImageView<'_>) -> Result<[f32; LABEL_COUNT], ClassifierError> {
        // Mean over the central 8x8 window.
        let mut acc = 0u32;
        for y in 12..20 {
            for x in 12..20 {
                acc += tile.data[y * tile.width + x] as u32;
            }
        }
        let mean = (acc / 64) as i32;

        let mut best_idx = 0usize; // Empty
        let mut best_diff = i32::MAX;
        for (k, &code) in PIECE_CODES.iter().enumerate() {
            let diff = (mean - code as i32).abs();
            if diff < best_diff {
                best_diff = diff;
                best_idx = k + 1;
            }
        }

        let mut probs = [0.0f32; LABEL_COUNT];
        if best_diff < 8 {
            probs[best_idx] = 1.0;
        } else {
            probs[0] = 1.0;
        }
        Ok(probs)
    }
}
