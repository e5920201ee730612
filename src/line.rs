//! Line segment detection: blur, Canny edges, then the probabilistic Hough transform.
//!
//! Unlike corner detection the thresholds are used exactly as given, so very low or very
//! high values simply produce many or no segments.

use log::debug;
use nalgebra::Point2;
use std::fmt;
use std::path::Path;

use crate::container::ImageContainer;
use crate::error::Result;
use crate::features::{FeatureGroup, FeatureKind, FeatureSet};
use crate::hough::{hough_lines_p, HoughParams};
use crate::traits::FeatureDetector;

// LineDetector -----------------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct LineDetector {
    image: ImageContainer,
    params: LineDetectorParams,
    hough: HoughParams,
    /// Tuning range upper bound, fixed from the initial minimum threshold
    control_max: i32,
    lines: FeatureSet,
    stale: bool,
}

impl LineDetector {
    pub fn new(image: ImageContainer, params: LineDetectorParams) -> Self {
        debug!("line detector for {} ({:?})", image.id(), params);
        Self {
            image,
            control_max: params.min_threshold.saturating_mul(3),
            params,
            hough: HoughParams::default(),
            lines: FeatureSet::empty(FeatureKind::Line),
            stale: true,
        }
    }

    /// Load the image at `path` and build a detector over it.
    pub fn from_path(
        id: impl Into<String>,
        path: impl AsRef<Path>,
        params: LineDetectorParams,
    ) -> Result<Self> {
        Ok(Self::new(ImageContainer::load(id, path)?, params))
    }

    pub fn params(&self) -> &LineDetectorParams {
        &self.params
    }

    pub fn min_threshold(&self) -> i32 {
        self.params.min_threshold
    }

    pub fn max_threshold(&self) -> i32 {
        self.params.max_threshold
    }

    pub fn kernel_size(&self) -> u32 {
        self.params.kernel_size
    }

    /// Box blur, Canny edges, then the probabilistic Hough transform.
    ///
    /// The blur box has side `2 * (kernel_size / 2) + 1`, so an even `kernel_size` rounds up
    /// to the next odd size. `imageproc`'s Canny applies its own Gaussian (sigma 1.4) and
    /// thresholds the L2 gradient magnitude, so threshold values are not interchangeable with
    /// OpenCV's `blur` + `Canny` pipeline.
    fn find_lines(&self) -> Vec<FeatureGroup> {
        if self.image.is_empty() {
            return Vec::new();
        }
        let gray = self.image.grayscale();
        let radius = self.params.kernel_size / 2;
        let blurred = imageproc::filter::box_filter(&gray, radius, radius);
        let (low, high) = canny_thresholds(self.params.min_threshold, self.params.max_threshold);
        let edges = imageproc::edges::canny(&blurred, low, high);

        hough_lines_p(&edges, &self.hough)
            .into_iter()
            .map(|[x1, y1, x2, y2]| FeatureGroup::line(Point2::new(x1, y1), Point2::new(x2, y2)))
            .collect()
    }
}

/// Order the threshold pair and keep the low one above zero. Hysteresis accepts neighbours
/// with magnitude `>= low`; at zero it would follow the unsuppressed image border off the
/// image. A positive floor gives OpenCV's strict `> low` behaviour.
fn canny_thresholds(min: i32, max: i32) -> (f32, f32) {
    let (low, high) = if min <= max { (min, max) } else { (max, min) };
    let low = (low as f32).max(f32::MIN_POSITIVE);
    (low, (high as f32).max(low))
}

impl FeatureDetector for LineDetector {
    fn kind(&self) -> FeatureKind {
        FeatureKind::Line
    }

    fn image(&self) -> &ImageContainer {
        &self.image
    }

    fn detect(&mut self) -> &FeatureSet {
        let groups = self.find_lines();
        debug!(
            "{}: {} segments with thresholds ({}, {})",
            self.window_name(),
            groups.len(),
            self.params.min_threshold,
            self.params.max_threshold
        );
        self.lines = FeatureSet::new(FeatureKind::Line, groups);
        self.stale = false;
        &self.lines
    }

    fn features(&self) -> &FeatureSet {
        &self.lines
    }

    fn is_stale(&self) -> bool {
        self.stale
    }

    fn threshold(&self) -> i32 {
        self.params.min_threshold
    }

    fn set_threshold(&mut self, value: i32) {
        self.params.min_threshold = value;
        self.stale = true;
    }

    fn threshold_max(&self) -> i32 {
        self.control_max
    }
}

impl fmt::Display for LineDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nDetect Type is {}\nThreshold Min: {} - Max: {}",
            self.image,
            self.kind(),
            self.params.min_threshold,
            self.params.max_threshold
        )
    }
}

// LineDetectorParams -----------------------------------------------------------------------------

/// Parameters of the [`LineDetector`]. Only `min_threshold` changes after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct LineDetectorParams {
    /// Lower hysteresis threshold of the edge detector
    pub min_threshold: i32,
    /// Upper hysteresis threshold of the edge detector
    pub max_threshold: i32,
    /// Side of the square blur kernel applied before edge detection
    pub kernel_size: u32,
}

impl Default for LineDetectorParams {
    fn default() -> Self {
        Self {
            min_threshold: 30,
            max_threshold: 150,
            kernel_size: 5,
        }
    }
}
