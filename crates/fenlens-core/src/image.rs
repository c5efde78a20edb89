/// Borrowed view over a row-major 8-bit grayscale buffer.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

/// Owned row-major 8-bit grayscale image.
#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// Axis-aligned pixel rectangle, used for source crops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height],
        }
    }

    #[inline]
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: u8) {
        self.data[y * self.width + x] = v;
    }
}

impl<'a> GrayImageView<'a> {
    /// Copy a rectangular region into an owned image. The rectangle must lie
    /// within the view bounds.
    pub fn crop(&self, rect: PixelRect) -> GrayImage {
        debug_assert!(rect.x + rect.width <= self.width);
        debug_assert!(rect.y + rect.height <= self.height);

        let mut out = vec![0u8; rect.width * rect.height];
        for row in 0..rect.height {
            let src_off = (rect.y + row) * self.width + rect.x;
            let dst_off = row * rect.width;
            out[dst_off..dst_off + rect.width]
                .copy_from_slice(&self.data[src_off..src_off + rect.width]);
        }
        GrayImage {
            width: rect.width,
            height: rect.height,
            data: out,
        }
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i32 || y >= src.height as i32 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f32, y: f32) -> f32 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f32, y: f32) -> u8 {
    sample_bilinear(src, x, y).clamp(0.0, 255.0) as u8
}

/// Downscale so the longest side is at most `max_dim`, averaging source
/// pixels per destination pixel (box filter).
///
/// Returns the scaled image and the applied scale factor (dst/src, <= 1.0).
/// An image already within the bound is copied unchanged with scale 1.0.
pub fn downscale_to_max_dim(src: &GrayImageView<'_>, max_dim: usize) -> (GrayImage, f32) {
    let longest = src.width.max(src.height);
    if longest <= max_dim || longest == 0 {
        return (
            GrayImage {
                width: src.width,
                height: src.height,
                data: src.data.to_vec(),
            },
            1.0,
        );
    }

    let scale = max_dim as f32 / longest as f32;
    let out_w = ((src.width as f32 * scale).round() as usize).max(1);
    let out_h = ((src.height as f32 * scale).round() as usize).max(1);

    let mut out = vec![0u8; out_w * out_h];
    let inv = 1.0 / scale;

    for y in 0..out_h {
        let sy0 = (y as f32 * inv) as usize;
        let sy1 = (((y + 1) as f32 * inv) as usize).min(src.height).max(sy0 + 1);
        for x in 0..out_w {
            let sx0 = (x as f32 * inv) as usize;
            let sx1 = (((x + 1) as f32 * inv) as usize).min(src.width).max(sx0 + 1);

            let mut acc = 0u32;
            let mut n = 0u32;
            for sy in sy0..sy1 {
                let row = sy * src.width;
                for sx in sx0..sx1 {
                    acc += src.data[row + sx] as u32;
                    n += 1;
                }
            }
            out[y * out_w + x] = (acc / n.max(1)) as u8;
        }
    }

    (
        GrayImage {
            width: out_w,
            height: out_h,
            data: out,
        },
        out_w as f32 / src.width as f32,
    )
}
