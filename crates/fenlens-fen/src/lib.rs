//! Position encoding for fenlens: the 13-way piece label set, the tile
//! classifier contract, and FEN board-field assembly.

mod assemble;
mod classifier;
mod label;

pub use assemble::{board_field_from_labels, expand_board_field, full_fen, FenParseError};
pub use classifier::{
    classify_tiles, resize_tile, ClassificationResult, ClassifierError, PieceClassifier,
};
pub use label::{PieceLabel, CLASSIFIER_LABELS, LABEL_COUNT};
