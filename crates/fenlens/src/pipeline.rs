//! The end-to-end pipeline: photo bytes in, FEN board field out.

use chess_corners::{find_chess_corners_image, ChessConfig, CornerDescriptor, ThresholdMode};
use fenlens_core::{downscale_to_max_dim, Corner, GrayImage, GrayImageView, Quad};
use fenlens_detect::{
    BoardGeometry, BoardLocator, CandidateSource, GeometryValidator, LocatorParams,
    PerspectiveRectifier, RectifiedBoard, RectifyParams, TileGrid, ValidatorParams,
};
use fenlens_fen::{
    board_field_from_labels, classify_tiles, full_fen, ClassificationResult, PieceClassifier,
    PieceLabel,
};
use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::FenPipelineError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Tunables for the whole pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Longest side of the working image the detector runs on; larger
    /// photos are box-downscaled and the quad mapped back afterwards.
    pub working_max_dim: usize,
    pub locator: LocatorParams,
    pub validator: ValidatorParams,
    pub rectify: RectifyParams,
    /// Probabilities below this force a square to Empty.
    pub confidence_floor: f32,
    /// Quality totals below this flag the result as low confidence.
    pub low_quality_threshold: f32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            working_max_dim: 1200,
            locator: LocatorParams::default(),
            validator: ValidatorParams::default(),
            rectify: RectifyParams::default(),
            confidence_floor: 0.5,
            low_quality_threshold: 60.0,
        }
    }
}

/// Reasonable default settings for the `chess-corners` ChESS detector.
///
/// Tuned for handheld board photos; override for difficult images.
pub fn default_corner_config() -> ChessConfig {
    let mut cfg = ChessConfig::single_scale();
    cfg.threshold_mode = ThresholdMode::Relative;
    cfg.threshold_value = 0.2;
    cfg.nms_radius = 2;
    cfg
}

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

fn adapt_chess_corner(c: &CornerDescriptor) -> Corner {
    Corner {
        position: Point2::new(c.x, c.y),
        strength: c.response,
        orientation: c.axes[0].angle,
    }
}

/// A successfully extracted board, before classification.
#[derive(Clone, Debug)]
pub struct BoardExtraction {
    /// Board quadrilateral in source-image coordinates.
    pub quad: Quad,
    /// Strategy that produced the candidate.
    pub source: CandidateSource,
    /// Validator measurements and advisory quality, at working resolution.
    pub geometry: BoardGeometry,
    /// The canonical S×S board image and its source crop.
    pub rectified: RectifiedBoard,
}

/// A recognized position.
#[derive(Clone, Debug)]
pub struct Recognition {
    pub extraction: BoardExtraction,
    /// 64 per-square results, row-major from the top-left of the rectified
    /// board.
    pub squares: Vec<ClassificationResult>,
    /// FEN board field, rank 8 first.
    pub board_field: String,
    /// Full FEN with placeholder non-visual fields.
    pub fen: String,
    /// Set when the quality score fell below the advisory threshold; the
    /// FEN is still returned.
    pub low_confidence: bool,
}

/// Sequences detection, validation, rectification, segmentation and
/// classification, short-circuiting on the first failure.
///
/// Stateless between calls: independent invocations may run concurrently,
/// each owning its intermediate buffers.
pub struct FenPipeline {
    params: PipelineParams,
    corner_cfg: ChessConfig,
}

impl FenPipeline {
    pub fn new(params: PipelineParams) -> Self {
        Self {
            params,
            corner_cfg: default_corner_config(),
        }
    }

    /// Replace the ChESS corner detector configuration.
    pub fn with_corner_config(mut self, cfg: ChessConfig) -> Self {
        self.corner_cfg = cfg;
        self
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Decode encoded JPEG/PNG bytes and extract the board.
    pub fn extract_board_bytes(&self, bytes: &[u8]) -> Result<BoardExtraction, FenPipelineError> {
        let gray = decode_to_gray(bytes)?;
        self.extract_board(&gray)
    }

    /// Extract the board quadrilateral and rectify it into the canonical
    /// square, without classifying squares.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width(), height = img.height()))
    )]
    pub fn extract_board(
        &self,
        img: &::image::GrayImage,
    ) -> Result<BoardExtraction, FenPipelineError> {
        let src_view = gray_view(img);
        let (working, scale) = downscale_to_max_dim(&src_view, self.params.working_max_dim);
        if scale < 1.0 {
            info!(
                "working image {}x{} (scale {:.3})",
                working.width, working.height, scale
            );
        }

        let corners = self.detect_corners(&working)?;
        info!("{} ChESS corners on the working image", corners.len());

        let locator = BoardLocator::new(self.params.locator.clone());
        let candidate = locator
            .locate(&working.view(), &corners)
            .ok_or(FenPipelineError::NotEnoughCorners)?;

        let validator = GeometryValidator::new(self.params.validator.clone());
        let geometry = validator.validate(&candidate.quad, 1.0 / scale)?;
        info!(
            "geometry ok: {:.0}x{:.0}px, ratios {:.2}/{:.2}, quality {:.0}/100, S={}",
            geometry.avg_width,
            geometry.avg_height,
            geometry.width_ratio,
            geometry.height_ratio,
            geometry.quality.total,
            geometry.output_size
        );

        // Rectify from the full-resolution source through the back-mapped
        // quad so the canonical board keeps the original detail.
        let source_quad = candidate.quad.scaled(1.0 / scale);
        let rectifier = PerspectiveRectifier::new(self.params.rectify.clone());
        let rectified = rectifier.rectify(&src_view, &source_quad, geometry.output_size)?;

        Ok(BoardExtraction {
            quad: source_quad,
            source: candidate.source,
            geometry,
            rectified,
        })
    }

    /// Decode encoded JPEG/PNG bytes and recognize the position.
    pub fn recognize_bytes(
        &self,
        bytes: &[u8],
        classifier: &dyn PieceClassifier,
    ) -> Result<Recognition, FenPipelineError> {
        let gray = decode_to_gray(bytes)?;
        self.recognize(&gray, classifier)
    }

    /// Full pipeline: board extraction, tile segmentation, per-square
    /// classification and FEN assembly.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img, classifier), fields(width = img.width(), height = img.height()))
    )]
    pub fn recognize(
        &self,
        img: &::image::GrayImage,
        classifier: &dyn PieceClassifier,
    ) -> Result<Recognition, FenPipelineError> {
        let extraction = self.extract_board(img)?;

        let grid = TileGrid::from_board(&extraction.rectified);
        let squares = classify_tiles(
            classifier,
            grid.tiles.iter().map(|t| (t.row, t.col, t.image.view())),
            self.params.confidence_floor,
        )?;

        let mut labels = [PieceLabel::Empty; 64];
        for square in &squares {
            labels[square.row * 8 + square.col] = square.label;
        }

        let board_field = board_field_from_labels(&labels);
        let fen = full_fen(&board_field);

        let low_confidence = extraction.geometry.quality.total < self.params.low_quality_threshold;
        if low_confidence {
            warn!(
                "low-confidence extraction (quality {:.0} < {:.0}): {}",
                extraction.geometry.quality.total, self.params.low_quality_threshold, board_field
            );
        } else {
            info!("recognized position {board_field}");
        }

        Ok(Recognition {
            extraction,
            squares,
            board_field,
            fen,
            low_confidence,
        })
    }

    fn detect_corners(&self, working: &GrayImage) -> Result<Vec<Corner>, FenPipelineError> {
        let img = ::image::GrayImage::from_raw(
            working.width as u32,
            working.height as u32,
            working.data.clone(),
        )
        .ok_or_else(|| {
            FenPipelineError::Unexpected("working buffer does not match its dimensions".into())
        })?;

        let descriptors = find_chess_corners_image(&img, &self.corner_cfg)
            .map_err(|e| FenPipelineError::Unexpected(e.to_string()))?;

        Ok(descriptors.iter().map(adapt_chess_corner).collect())
    }
}

/// Build an `image::GrayImage` from a raw row-major grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, FenPipelineError> {
    let expected = (width as usize).checked_mul(height as usize).ok_or_else(|| {
        FenPipelineError::ImageDecodeFailed(format!("invalid dimensions {width}x{height}"))
    })?;
    if pixels.len() != expected {
        return Err(FenPipelineError::ImageDecodeFailed(format!(
            "gray buffer length {} does not match {width}x{height}",
            pixels.len()
        )));
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec()).ok_or_else(|| {
        FenPipelineError::ImageDecodeFailed(format!("invalid dimensions {width}x{height}"))
    })
}

impl FenPipeline {
    /// Extract the board from a raw grayscale buffer.
    pub fn extract_board_gray_u8(
        &self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<BoardExtraction, FenPipelineError> {
        let img = gray_image_from_slice(width, height, pixels)?;
        self.extract_board(&img)
    }

    /// Recognize the position from a raw grayscale buffer.
    pub fn recognize_gray_u8(
        &self,
        width: u32,
        height: u32,
        pixels: &[u8],
        classifier: &dyn PieceClassifier,
    ) -> Result<Recognition, FenPipelineError> {
        let img = gray_image_from_slice(width, height, pixels)?;
        self.recognize(&img, classifier)
    }
}

fn decode_to_gray(bytes: &[u8]) -> Result<::image::GrayImage, FenPipelineError> {
    let decoded = ::image::load_from_memory(bytes)
        .map_err(|e| FenPipelineError::ImageDecodeFailed(e.to_string()))?;
    Ok(decoded.to_luma8())
}

/// Encode a rectified (or any) gray image as PNG bytes, for diagnostics.
pub fn encode_gray_png(img: &GrayImage) -> Result<Vec<u8>, FenPipelineError> {
    let buf = ::image::GrayImage::from_raw(
        img.width as u32,
        img.height as u32,
        img.data.clone(),
    )
    .ok_or_else(|| FenPipelineError::EncodingFailed("buffer/dimension mismatch".into()))?;

    let mut out = std::io::Cursor::new(Vec::new());
    buf.write_to(&mut out, ::image::ImageFormat::Png)
        .map_err(|e| FenPipelineError::EncodingFailed(e.to_string()))?;
    Ok(out.into_inner())
}
