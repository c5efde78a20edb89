//! The tile classifier contract and per-board classification orchestration.

use fenlens_core::{sample_bilinear_u8, GrayImage, GrayImageView};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::label::{PieceLabel, CLASSIFIER_LABELS, LABEL_COUNT};

#[derive(thiserror::Error, Debug)]
pub enum ClassifierError {
    #[error("classifier model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("bad classifier input: expected {expected}px square tile, got {got_w}x{got_h}")]
    BadInput {
        expected: u32,
        got_w: usize,
        got_h: usize,
    },
    #[error("inference failed: {0}")]
    Inference(String),
}

/// A trained 13-way tile classifier.
///
/// Loading the model artifact happens at construction and releasing it in
/// `Drop`; one instance is reused across tiles and pipeline invocations.
/// `classify` receives a tile already resized to `input_size()`² raw 8-bit
/// luma; any further normalization (scaling, centering, contrast handling)
/// is the implementation's documented contract. The returned probabilities
/// follow [`CLASSIFIER_LABELS`] exactly.
pub trait PieceClassifier {
    /// Fixed square input side expected by the model.
    fn input_size(&self) -> u32;

    /// Probability vector over the 13 labels, in pinned order.
    fn classify(&self, tile: &GrayImageView<'_>) -> Result<[f32; LABEL_COUNT], ClassifierError>;
}

/// Bilinearly resize a tile to the classifier's square input size.
pub fn resize_tile(tile: &GrayImageView<'_>, input_size: u32) -> GrayImage {
    let side = input_size as usize;
    let mut out = GrayImage::new(side, side);
    let sx = tile.width as f32 / side as f32;
    let sy = tile.height as f32 / side as f32;

    for y in 0..side {
        for x in 0..side {
            let v = sample_bilinear_u8(
                tile,
                (x as f32 + 0.5) * sx - 0.5,
                (y as f32 + 0.5) * sy - 0.5,
            );
            out.set(x, y, v);
        }
    }
    out
}

/// One classified board square.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub row: usize,
    pub col: usize,
    pub label: PieceLabel,
    pub confidence: f32,
}

/// Classify a row-major sequence of `(row, col, tile)` entries.
///
/// Applies arg-max over the probability vector and forces labels below
/// `confidence_floor` to `Empty`, suppressing low-confidence false pieces.
pub fn classify_tiles<'a, I>(
    classifier: &dyn PieceClassifier,
    tiles: I,
    confidence_floor: f32,
) -> Result<Vec<ClassificationResult>, ClassifierError>
where
    I: IntoIterator<Item = (usize, usize, GrayImageView<'a>)>,
{
    let input_size = classifier.input_size();
    let mut results = Vec::new();

    for (row, col, tile) in tiles {
        let resized = resize_tile(&tile, input_size);
        let probs = classifier.classify(&resized.view())?;

        let (best_idx, best_prob) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));

        let mut label = CLASSIFIER_LABELS[best_idx];
        if label != PieceLabel::Empty && best_prob < confidence_floor {
            debug!(
                "square ({row},{col}): {label:?} at {best_prob:.2} below floor, forcing Empty"
            );
            label = PieceLabel::Empty;
        }

        results.push(ClassificationResult {
            row,
            col,
            label,
            confidence: best_prob,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns a fixed probability vector regardless of input.
    struct FixedClassifier {
        probs: [f32; LABEL_COUNT],
    }

    impl PieceClassifier for FixedClassifier {
        fn input_size(&self) -> u32 {
            32
        }

        fn classify(
            &self,
            tile: &GrayImageView<'_>,
        ) -> Result<[f32; LABEL_COUNT], ClassifierError> {
            assert_eq!(tile.width, 32);
            assert_eq!(tile.height, 32);
            Ok(self.probs)
        }
    }

    fn tile(side: usize) -> GrayImage {
        GrayImage::new(side, side)
    }

    #[test]
    fn argmax_picks_the_pinned_label() {
        let mut probs = [0.0f32; LABEL_COUNT];
        probs[4] = 0.9; // WhiteRook in pinned order
        let classifier = FixedClassifier { probs };

        let t = tile(40);
        let results =
            classify_tiles(&classifier, [(2usize, 3usize, t.view())], 0.5).expect("classified");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, PieceLabel::WhiteRook);
        assert_eq!((results[0].row, results[0].col), (2, 3));
        assert!((results[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn low_confidence_piece_becomes_empty() {
        let mut probs = [0.0f32; LABEL_COUNT];
        probs[7] = 0.3; // BlackPawn, below the floor
        let classifier = FixedClassifier { probs };

        let t = tile(40);
        let results =
            classify_tiles(&classifier, [(0usize, 0usize, t.view())], 0.5).expect("classified");
        assert_eq!(results[0].label, PieceLabel::Empty);
        assert!((results[0].confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn confident_empty_is_not_floored() {
        let mut probs = [0.0f32; LABEL_COUNT];
        probs[0] = 0.4; // Empty below the floor stays Empty
        let classifier = FixedClassifier { probs };

        let t = tile(16);
        let results =
            classify_tiles(&classifier, [(0usize, 0usize, t.view())], 0.5).expect("classified");
        assert_eq!(results[0].label, PieceLabel::Empty);
    }

    #[test]
    fn resize_preserves_uniform_tiles() {
        let mut t = tile(48);
        t.data.fill(177);
        let resized = resize_tile(&t.view(), 32);
        assert_eq!(resized.width, 32);
        assert!(resized.data.iter().all(|&v| v == 177));
    }
}
