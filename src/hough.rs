//! Progressive probabilistic Hough transform for line segments.
//! See [Matas et al., "Robust Detection of Lines Using the Progressive Probabilistic Hough
//! Transform"](https://doi.org/10.1006/cviu.1999.0831) for more information
//!
//! Edge pixels are visited in random order. Each one votes in the `(rho, theta)`
//! accumulator; once a bin reaches the vote threshold the corridor along that line is walked
//! in both directions, tolerating gaps, and the pixels on it are consumed so that they can't
//! seed another segment.

use image::GrayImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Segment endpoints `[x1, y1, x2, y2]`.
pub type Segment = [i32; 4];

/// Parameters of [`hough_lines_p`]
#[derive(Clone, Debug, PartialEq)]
pub struct HoughParams {
    /// Distance resolution of the accumulator, in pixels
    pub rho: f64,
    /// Angle resolution of the accumulator, in radians
    pub theta: f64,
    /// Votes a bin needs before its line is traced
    pub threshold: u32,
    /// Segments shorter than this (along both axes) are dropped
    pub min_line_length: i32,
    /// Largest run of missing pixels bridged while tracing
    pub max_line_gap: i32,
    /// Seed of the pixel sampling order
    pub seed: u64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: PI / 180.0,
            threshold: 30,
            min_line_length: 30,
            max_line_gap: 10,
            seed: 0x5eed,
        }
    }
}

const SHIFT: u32 = 16;

/// Extract line segments from a binary edge map (non-zero pixels are edges).
pub fn hough_lines_p(edges: &GrayImage, params: &HoughParams) -> Vec<Segment> {
    let (width, height) = (edges.width() as i32, edges.height() as i32);
    let mut segments = Vec::new();
    if width == 0 || height == 0 || params.rho <= 0.0 || params.theta <= 0.0 {
        return segments;
    }

    let num_angle = ((PI / params.theta).round() as usize).max(1);
    let num_rho = (((width + height) * 2 + 1) as f64 / params.rho).round() as usize;
    let rho_offset = (num_rho as i32 - 1) / 2;
    let trig: Vec<(f64, f64)> = (0..num_angle)
        .map(|n| {
            let angle = n as f64 * params.theta;
            (angle.cos() / params.rho, angle.sin() / params.rho)
        })
        .collect();

    let mut accum = vec![0i32; num_angle * num_rho];
    let mut mask = vec![false; (width * height) as usize];
    let mut pending: Vec<(i32, i32)> = Vec::new();
    for (x, y, p) in edges.enumerate_pixels() {
        if p[0] != 0 {
            mask[(y * width as u32 + x) as usize] = true;
            pending.push((x as i32, y as i32));
        }
    }

    let rho_bin = |x: i32, y: i32, (cos, sin): (f64, f64)| -> usize {
        ((x as f64 * cos + y as f64 * sin).round() as i32 + rho_offset) as usize
    };

    let mut rng = StdRng::seed_from_u64(params.seed);
    while !pending.is_empty() {
        let (x, y) = pending.swap_remove(rng.gen_range(0..pending.len()));
        if !mask[(y * width + x) as usize] {
            continue;
        }

        // vote, remembering the strongest bin
        let (mut max_votes, mut max_n) = (0i32, 0usize);
        for (n, &tc) in trig.iter().enumerate() {
            let bin = &mut accum[rho_bin(x, y, tc) * num_angle + n];
            *bin += 1;
            if *bin > max_votes {
                max_votes = *bin;
                max_n = n;
            }
        }
        if max_votes < params.threshold as i32 {
            continue;
        }

        // direction along the line, stepping one pixel along the dominant axis
        let (cos, sin) = trig[max_n];
        let (a, b) = (-sin, cos);
        let (mut x0, mut y0) = (x as i64, y as i64);
        let (dx0, dy0, x_major) = if a.abs() > b.abs() {
            y0 = (y0 << SHIFT) + (1 << (SHIFT - 1));
            let dy = (b * (1i64 << SHIFT) as f64 / a.abs()).round() as i64;
            (if a > 0.0 { 1 } else { -1 }, dy, true)
        } else {
            x0 = (x0 << SHIFT) + (1 << (SHIFT - 1));
            let dx = (a * (1i64 << SHIFT) as f64 / b.abs()).round() as i64;
            (dx, if b > 0.0 { 1 } else { -1 }, false)
        };
        let to_pixel = |px: i64, py: i64| -> (i32, i32) {
            if x_major {
                (px as i32, (py >> SHIFT) as i32)
            } else {
                ((px >> SHIFT) as i32, py as i32)
            }
        };
        let inside = |(px, py): (i32, i32)| px >= 0 && px < width && py >= 0 && py < height;

        let mut ends = [(x, y); 2];
        for (k, end) in ends.iter_mut().enumerate() {
            let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
            let (mut px, mut py) = (x0, y0);
            let mut gap = 0;
            loop {
                let p = to_pixel(px, py);
                if !inside(p) {
                    break;
                }
                if mask[(p.1 * width + p.0) as usize] {
                    gap = 0;
                    *end = p;
                } else {
                    gap += 1;
                    if gap > params.max_line_gap {
                        break;
                    }
                }
                px += dx;
                py += dy;
            }
        }

        let good_line = (ends[1].0 - ends[0].0).abs() >= params.min_line_length
            || (ends[1].1 - ends[0].1).abs() >= params.min_line_length;

        // consume the traced pixels, withdrawing their votes if the segment is kept
        for (k, end) in ends.iter().enumerate() {
            let (dx, dy) = if k == 0 { (dx0, dy0) } else { (-dx0, -dy0) };
            let (mut px, mut py) = (x0, y0);
            loop {
                let p = to_pixel(px, py);
                if !inside(p) {
                    break;
                }
                let idx = (p.1 * width + p.0) as usize;
                if mask[idx] {
                    if good_line {
                        for (n, &tc) in trig.iter().enumerate() {
                            let bin = &mut accum[rho_bin(p.0, p.1, tc) * num_angle + n];
                            *bin -= 1;
                        }
                    }
                    mask[idx] = false;
                }
                if p == *end {
                    break;
                }
                px += dx;
                py += dy;
            }
        }

        if good_line {
            segments.push([ends[0].0, ends[0].1, ends[1].0, ends[1].1]);
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn finds_a_single_vertical_segment() {
        let mut edges = GrayImage::new(64, 128);
        for y in 10..=100 {
            edges.put_pixel(20, y, Luma([255]));
        }
        let segments = hough_lines_p(&edges, &HoughParams::default());
        assert_eq!(segments.len(), 1);
        let [x1, y1, x2, y2] = segments[0];
        assert_eq!((x1, x2), (20, 20));
        assert_eq!(y1.min(y2), 10);
        assert_eq!(y1.max(y2), 100);
    }

    #[test]
    fn bridges_small_gaps_only() {
        let mut edges = GrayImage::new(200, 20);
        // a 5 pixel gap on row 5 is bridged, the run on row 15 stands alone
        for x in (10..60).chain(65..110) {
            edges.put_pixel(x, 5, Luma([255]));
        }
        for x in 10..190 {
            edges.put_pixel(x, 15, Luma([255]));
        }
        let mut segments = hough_lines_p(&edges, &HoughParams::default());
        segments.sort_by_key(|s| s[1]);
        assert_eq!(segments.len(), 2);
        let span = |s: &Segment| (s[0].min(s[2]), s[0].max(s[2]));
        assert_eq!((segments[0][1], segments[0][3]), (5, 5));
        assert_eq!(span(&segments[0]), (10, 109));
        assert_eq!((segments[1][1], segments[1][3]), (15, 15));
        assert_eq!(span(&segments[1]), (10, 189));
    }

    #[test]
    fn short_or_sparse_edges_yield_nothing() {
        let mut edges = GrayImage::new(64, 64);
        for x in 5..20 {
            edges.put_pixel(x, 30, Luma([255]));
        }
        assert!(hough_lines_p(&edges, &HoughParams::default()).is_empty());
        assert!(hough_lines_p(&GrayImage::new(0, 0), &HoughParams::default()).is_empty());
    }

    #[test]
    fn same_seed_same_output() {
        let mut edges = GrayImage::new(96, 96);
        for i in 0..90 {
            edges.put_pixel(i + 3, i + 3, Luma([255]));
            edges.put_pixel(i + 3, 50, Luma([255]));
        }
        let params = HoughParams::default();
        assert_eq!(hough_lines_p(&edges, &params), hough_lines_p(&edges, &params));
    }
}
