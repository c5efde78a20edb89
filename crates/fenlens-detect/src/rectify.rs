//! Perspective rectification: warp the board quadrilateral into a canonical
//! S×S square image.

use fenlens_core::{
    homography_from_quad, warp_perspective_gray, GrayImage, GrayImageView, PixelRect, Quad,
};
use log::debug;
use nalgebra::Point2;

use crate::params::RectifyParams;

#[derive(thiserror::Error, Debug)]
pub enum RectifyError {
    #[error("crop region invalid: {reason}")]
    InvalidCrop { reason: String },
    #[error("homography estimation failed for the candidate corners")]
    HomographyFailed,
}

/// The rectified canonical board and where it came from.
#[derive(Clone, Debug)]
pub struct RectifiedBoard {
    /// S×S single-channel image; row 0 is the top of the board as
    /// photographed.
    pub image: GrayImage,
    /// The source-image region the board was resampled from.
    pub source_crop: PixelRect,
}

pub struct PerspectiveRectifier {
    params: RectifyParams,
}

impl PerspectiveRectifier {
    pub fn new(params: RectifyParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &RectifyParams {
        &self.params
    }

    /// Warp `quad` (in `src` coordinates) into an `output_size`² image.
    ///
    /// The crop box around the quad gets a small outward padding; the corner
    /// points themselves get a small inward inset toward the centroid before
    /// the homography is solved, trimming partial edge squares.
    pub fn rectify(
        &self,
        src: &GrayImageView<'_>,
        quad: &Quad,
        output_size: u32,
    ) -> Result<RectifiedBoard, RectifyError> {
        let crop = self.crop_region(src, quad)?;

        let inset = quad.inset_toward_centroid(self.params.inset_frac);
        let local = inset.translated(-(crop.x as f32), -(crop.y as f32));

        // Guard the warp: inset corners must land inside the crop, otherwise
        // the transform would sample out of the region just cut out.
        for p in &local.corners {
            if p.x < -1.0
                || p.y < -1.0
                || p.x > crop.width as f32 + 1.0
                || p.y > crop.height as f32 + 1.0
            {
                return Err(RectifyError::InvalidCrop {
                    reason: format!(
                        "corner ({:.1},{:.1}) outside crop {}x{}",
                        p.x, p.y, crop.width, crop.height
                    ),
                });
            }
        }

        let s = output_size as f32;
        let canonical = [
            Point2::new(0.0, 0.0),
            Point2::new(s, 0.0),
            Point2::new(s, s),
            Point2::new(0.0, s),
        ];

        let h_crop_from_canonical = homography_from_quad(&canonical, &local.corners)
            .ok_or(RectifyError::HomographyFailed)?;

        let cropped = src.crop(crop);
        let image = warp_perspective_gray(
            &cropped.view(),
            h_crop_from_canonical,
            output_size as usize,
            output_size as usize,
        );
        debug!(
            "rectified {}x{} crop into {}px canonical board",
            crop.width, crop.height, output_size
        );

        Ok(RectifiedBoard {
            image,
            source_crop: crop,
        })
    }

    /// Padded quad bounding box, clamped to the source bounds.
    fn crop_region(
        &self,
        src: &GrayImageView<'_>,
        quad: &Quad,
    ) -> Result<PixelRect, RectifyError> {
        let (min, max) = quad.bounding_box();
        let pad = self.params.pad_frac * (max.x - min.x).max(max.y - min.y);

        let x0 = (min.x - pad).floor();
        let y0 = (min.y - pad).floor();
        let x1 = (max.x + pad).ceil();
        let y1 = (max.y + pad).ceil();

        if x1 <= 0.0 || y1 <= 0.0 || x0 >= src.width as f32 || y0 >= src.height as f32 {
            return Err(RectifyError::InvalidCrop {
                reason: format!(
                    "quad bbox ({x0:.0},{y0:.0})..({x1:.0},{y1:.0}) outside {}x{} source",
                    src.width, src.height
                ),
            });
        }

        let x = x0.max(0.0) as usize;
        let y = y0.max(0.0) as usize;
        let x_end = (x1 as usize).min(src.width);
        let y_end = (y1 as usize).min(src.height);

        if x_end <= x || y_end <= y {
            return Err(RectifyError::InvalidCrop {
                reason: "empty crop after clamping".to_string(),
            });
        }

        Ok(PixelRect {
            x,
            y,
            width: x_end - x,
            height: y_end - y,
        })
    }
}
