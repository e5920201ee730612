//! Harris corner response.
//! See <https://en.wikipedia.org/wiki/Harris_corner_detector> or [the original
//! paper](http://www.bmva.org/bmvc/1988/avc-88-023.pdf) for more information
//!
//! For every pixel the structure tensor `M` is accumulated from Sobel gradients over a
//! `block_size` x `block_size` window and the response is `det(M) - k * trace(M)^2`.
//! Positive values indicate corners, negative values edges and values near zero flat areas.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use nalgebra::Matrix2;

/// Single-channel floating point map, one value per source pixel.
pub type ResponseMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Compute the Harris response of `img`.
///
/// Gradients are scaled so that the response does not depend on the 8-bit intensity range
/// or on the window size. An even `block_size` puts the window anchor at its centre-right,
/// so a window of 2 covers `[x - 1, x]`.
pub fn harris_response(img: &GrayImage, block_size: u32, aperture_size: u32, k: f32) -> ResponseMap {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return ResponseMap::new(width, height);
    }

    let gx = horizontal_sobel(img);
    let gy = vertical_sobel(img);
    let scale = 1.0 / ((1u32 << (aperture_size - 1)) as f32 * block_size as f32 * 255.0);

    // per-pixel gradient products: Ix^2, Iy^2, Ix*Iy
    let mut products = vec![[0f32; 3]; (width * height) as usize];
    for (x, y, px) in gx.enumerate_pixels() {
        let dx = px[0] as f32 * scale;
        let dy = gy.get_pixel(x, y)[0] as f32 * scale;
        products[(y * width + x) as usize] = [dx * dx, dy * dy, dx * dy];
    }

    let before = (block_size / 2) as i64;
    let after = block_size as i64 - 1 - before;
    let clamp = |v: i64, max: u32| v.max(0).min(max as i64 - 1) as u32;

    ResponseMap::from_fn(width, height, |x, y| {
        let (mut sxx, mut syy, mut sxy) = (0f32, 0f32, 0f32);
        for wy in (y as i64 - before)..=(y as i64 + after) {
            for wx in (x as i64 - before)..=(x as i64 + after) {
                let p = products[(clamp(wy, height) * width + clamp(wx, width)) as usize];
                sxx += p[0];
                syy += p[1];
                sxy += p[2];
            }
        }
        let m = Matrix2::new(sxx, sxy, sxy, syy);
        Luma([m.determinant() - k * m.trace() * m.trace()])
    })
}

/// Linearly map the values of `map` onto `[lo, hi]` (min-max normalisation).
/// A constant map becomes all `lo`.
pub fn normalize_min_max(map: &ResponseMap, lo: f32, hi: f32) -> ResponseMap {
    let (min, max) = map
        .pixels()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
            (min.min(p[0]), max.max(p[0]))
        });
    let range = max - min;
    let mut out = ResponseMap::new(map.width(), map.height());
    if range.is_nan() || range <= f32::EPSILON {
        for p in out.pixels_mut() {
            p[0] = lo;
        }
        return out;
    }
    let scale = (hi - lo) / range;
    for (dst, src) in out.pixels_mut().zip(map.pixels()) {
        dst[0] = (src[0] - min) * scale + lo;
    }
    out
}
