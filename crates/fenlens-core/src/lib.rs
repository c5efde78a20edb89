//! Core image and geometry primitives for the fenlens pipeline.
//!
//! This crate is intentionally small and purely computational. It does *not*
//! decode images, run corner detectors or know anything about chess pieces;
//! it provides the gray-image buffers, the ordered quadrilateral type and the
//! projective mapping the detection crates are built on.

mod corner;
mod homography;
mod image;
mod logger;
mod quad;

pub use corner::Corner;
pub use homography::{homography_from_quad, warp_perspective_gray, Homography};
pub use image::{
    downscale_to_max_dim, sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView, PixelRect,
};
pub use quad::Quad;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
