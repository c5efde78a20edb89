//! High-level facade crate for the `fenlens-*` workspace.
//!
//! fenlens turns a photograph of a physical chessboard into a FEN board
//! field. This crate provides:
//! - stable re-exports of the underlying crates
//! - (feature-gated) the end-to-end [`FenPipeline`] that decodes an image,
//!   runs the ChESS corner detector (`chess-corners`) and the board locator,
//!   validates and rectifies the board, and classifies the 64 squares.
//!
//! ## Quickstart
//!
//! ```no_run
//! use fenlens::{FenPipeline, PipelineParams};
//! use image::ImageReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = ImageReader::open("board.jpg")?.decode()?.to_luma8();
//! let pipeline = FenPipeline::new(PipelineParams::default());
//!
//! let extraction = pipeline.extract_board(&img)?;
//! println!(
//!     "board at {:?}, quality {:.0}/100",
//!     extraction.quad.corners, extraction.geometry.quality.total
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Producing a FEN additionally needs a trained tile classifier implementing
//! [`fen::PieceClassifier`]; pass it to [`FenPipeline::recognize`].
//!
//! ## API map
//! - `fenlens::core`: gray images, quads, homographies.
//! - `fenlens::detect`: locator strategies, validator, rectifier, tiles.
//! - `fenlens::fen`: piece labels, classifier contract, FEN assembly.
//!
//! The pipeline is a pure synchronous computation per call; run it off the
//! interactive thread and impose any wall-clock budget externally.

pub use fenlens_core as core;
pub use fenlens_detect as detect;
pub use fenlens_fen as fen;

pub use fenlens_detect::{BoardGeometry, CandidateSource, QualityScore};

mod error;
pub use error::FenPipelineError;

#[cfg(feature = "image")]
mod annotate;
#[cfg(feature = "image")]
mod pipeline;

#[cfg(feature = "image")]
pub use annotate::annotate_detection;
#[cfg(feature = "image")]
pub use pipeline::{
    default_corner_config, encode_gray_png, gray_image_from_slice, gray_view, BoardExtraction,
    FenPipeline, PipelineParams, Recognition,
};
