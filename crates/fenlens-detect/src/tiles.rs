//! 8×8 segmentation of the rectified board.

use fenlens_core::{GrayImage, PixelRect};

use crate::rectify::RectifiedBoard;

pub const BOARD_FILES: usize = 8;
pub const BOARD_RANKS: usize = 8;

/// One board square cut out of the rectified image.
///
/// `row` 0 is the top of the rectified image (assumed rank 8), `col` 0 the
/// left (assumed file a). Orientation is a standing assumption of the whole
/// pipeline, never auto-detected.
#[derive(Clone, Debug)]
pub struct Tile {
    pub row: usize,
    pub col: usize,
    pub image: GrayImage,
}

/// Row-major collection of the 64 tiles.
#[derive(Clone, Debug)]
pub struct TileGrid {
    pub tile_size: usize,
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    /// Cut the canonical board into 64 equally sized tiles.
    ///
    /// When S is not divisible by 8, the trailing remainder pixels on the
    /// right and bottom are dropped.
    pub fn from_board(board: &RectifiedBoard) -> Self {
        let side = board.image.width.min(board.image.height);
        let tile_size = side / BOARD_FILES;
        let view = board.image.view();

        let mut tiles = Vec::with_capacity(BOARD_RANKS * BOARD_FILES);
        for row in 0..BOARD_RANKS {
            for col in 0..BOARD_FILES {
                let image = view.crop(PixelRect {
                    x: col * tile_size,
                    y: row * tile_size,
                    width: tile_size,
                    height: tile_size,
                });
                tiles.push(Tile { row, col, image });
            }
        }

        Self { tile_size, tiles }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> &Tile {
        &self.tiles[row * BOARD_FILES + col]
    }
}
