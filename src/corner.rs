//! Harris corner detection over an [`ImageContainer`].
//!
//! Every pixel whose normalised corner response is above the threshold becomes its own
//! single-point feature group, in row-major scan order.

use log::debug;
use nalgebra::Point2;
use std::fmt;
use std::path::Path;

use crate::container::ImageContainer;
use crate::error::Result;
use crate::features::{FeatureGroup, FeatureKind, FeatureSet};
use crate::harris::{harris_response, normalize_min_max};
use crate::traits::FeatureDetector;

// CornerDetector ---------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct CornerDetector {
    image: ImageContainer,
    params: CornerDetectorParams,
    corners: FeatureSet,
    stale: bool,
}

impl CornerDetector {
    /// Window of the structure tensor
    pub const BLOCK_SIZE: u32 = 2;
    /// Sobel aperture
    pub const APERTURE_SIZE: u32 = 3;
    /// Harris free parameter
    pub const K: f32 = 0.04;
    /// Thresholds below this are raised to it before detecting. Lower values would accept
    /// flat regions of the normalised response.
    pub const THRESHOLD_FLOOR: i32 = 95;
    /// Upper bound of the tuning control
    pub const THRESHOLD_MAX: i32 = 300;

    pub fn new(image: ImageContainer, params: CornerDetectorParams) -> Self {
        debug!("corner detector for {} ({:?})", image.id(), params);
        Self {
            image,
            params,
            corners: FeatureSet::empty(FeatureKind::Corner),
            stale: true,
        }
    }

    /// Load the image at `path` and build a detector over it.
    pub fn from_path(
        id: impl Into<String>,
        path: impl AsRef<Path>,
        params: CornerDetectorParams,
    ) -> Result<Self> {
        Ok(Self::new(ImageContainer::load(id, path)?, params))
    }

    pub fn params(&self) -> &CornerDetectorParams {
        &self.params
    }

    /// The threshold a detection run will actually use.
    pub fn effective_threshold(threshold: i32) -> i32 {
        threshold.max(Self::THRESHOLD_FLOOR)
    }

    fn find_corners(&self, threshold: i32) -> Vec<FeatureGroup> {
        if self.image.is_empty() {
            return Vec::new();
        }
        let gray = self.image.grayscale();
        let response = harris_response(&gray, Self::BLOCK_SIZE, Self::APERTURE_SIZE, Self::K);
        let normalized = normalize_min_max(&response, 0.0, 255.0);

        // enumerate_pixels walks rows top to bottom, columns left to right
        normalized
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] as i32 > threshold)
            .map(|(x, y, _)| FeatureGroup::corner(Point2::new(x as i32, y as i32)))
            .collect()
    }
}

impl FeatureDetector for CornerDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::Corner
    }

    fn image(&self) -> &ImageContainer {
        &self.image
    }

    fn detect(&mut self) -> &FeatureSet {
        self.params.threshold = Self::effective_threshold(self.params.threshold);
        let groups = self.find_corners(self.params.threshold);
        debug!(
            "{}: {} corners above {}",
            self.window_name(),
            groups.len(),
            self.params.threshold
        );
        self.corners = FeatureSet::new(FeatureKind::Corner, groups);
        self.stale = false;
        &self.corners
    }

    fn features(&self) -> &FeatureSet {
        &self.corners
    }

    fn is_stale(&self) -> bool {
        self.stale
    }

    fn threshold(&self) -> i32 {
        self.params.threshold
    }

    fn set_threshold(&mut self, value: i32) {
        self.params.threshold = value;
        self.stale = true;
    }

    fn threshold_max(&self) -> i32 {
        Self::THRESHOLD_MAX
    }
}

impl fmt::Display for CornerDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nDetect Type is {}\nThreshold: {}",
            self.image,
            self.kind(),
            self.params.threshold
        )
    }
}

// CornerDetectorParams ---------------------------------------------------------------------------

/// Parameters of the [`CornerDetector`]
#[derive(Clone, Debug, PartialEq)]
pub struct CornerDetectorParams {
    /// Minimum normalised Harris response (0..255) of a corner. Values below
    /// [`CornerDetector::THRESHOLD_FLOOR`] are raised to it on the next detection.
    pub threshold: i32,
}

impl Default for CornerDetectorParams {
    fn default() -> Self {
        Self { threshold: 200 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn checkerboard() -> ImageContainer {
        let img = RgbImage::from_fn(64, 64, |x, y| {
            if (x < 32) == (y < 32) {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        ImageContainer::new("board", img)
    }

    #[test]
    fn clamp_is_idempotent() {
        for t in [-10, 0, 50, 94, 95].iter() {
            let once = CornerDetector::effective_threshold(*t);
            assert_eq!(once, CornerDetector::THRESHOLD_FLOOR);
            assert_eq!(CornerDetector::effective_threshold(once), once);
        }
        assert_eq!(CornerDetector::effective_threshold(200), 200);
    }

    #[test]
    fn detect_raises_low_thresholds() {
        let mut detector = CornerDetector::new(checkerboard(), CornerDetectorParams { threshold: 10 });
        detector.detect();
        assert_eq!(detector.threshold(), 95);
    }

    #[test]
    fn corners_are_single_points_near_the_junction() {
        let mut detector = CornerDetector::new(checkerboard(), CornerDetectorParams::default());
        let corners = detector.detect();
        assert!(!corners.is_empty());
        for group in corners {
            assert_eq!(group.len(), 1);
            let p = group.points()[0];
            assert!((p.x - 32).abs() <= 3 && (p.y - 32).abs() <= 3, "{:?}", p);
        }
    }

    #[test]
    fn staleness_follows_parameter_writes() {
        let mut detector = CornerDetector::new(checkerboard(), CornerDetectorParams::default());
        assert!(detector.is_stale());
        detector.detect();
        assert!(!detector.is_stale());
        detector.set_threshold(250);
        assert!(detector.is_stale());
        assert_eq!(detector.window_name(), "Corner board");
    }

    #[test]
    fn summary_lists_threshold() {
        let detector = CornerDetector::new(checkerboard(), CornerDetectorParams::default());
        assert_eq!(
            detector.to_string(),
            "Image board of size (w,h) = (64,64)\nDetect Type is Corner\nThreshold: 200"
        );
    }
}
