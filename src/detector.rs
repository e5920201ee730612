use std::fmt;

use crate::container::ImageContainer;
use crate::corner::{CornerDetector, CornerDetectorParams};
use crate::features::{FeatureKind, FeatureSet};
use crate::line::{LineDetector, LineDetectorParams};
use crate::traits::FeatureDetector;

/// Either detector variant, for callers that pick the feature kind at runtime.
#[derive(Clone, Debug)]
pub enum Detector {
    Corner(CornerDetector),
    Line(LineDetector),
}

impl Detector {
    /// A detector of `kind` with that variant's default parameters.
    pub fn with_defaults(kind: FeatureKind, image: ImageContainer) -> Self {
        match kind {
            FeatureKind::Corner => CornerDetector::new(image, CornerDetectorParams::default()).into(),
            FeatureKind::Line => LineDetector::new(image, LineDetectorParams::default()).into(),
        }
    }

    fn inner(&self) -> &dyn FeatureDetector {
        match self {
            Detector::Corner(d) => d,
            Detector::Line(d) => d,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FeatureDetector {
        match self {
            Detector::Corner(d) => d,
            Detector::Line(d) => d,
        }
    }
}

impl From<CornerDetector> for Detector {
    fn from(d: CornerDetector) -> Self {
        Detector::Corner(d)
    }
}

impl From<LineDetector> for Detector {
    fn from(d: LineDetector) -> Self {
        Detector::Line(d)
    }
}

impl FeatureDetector for Detector {
    fn kind(&self) -> FeatureKind {
        self.inner().kind()
    }

    fn image(&self) -> &ImageContainer {
        self.inner().image()
    }

    fn detect(&mut self) -> &FeatureSet {
        self.inner_mut().detect()
    }

    fn features(&self) -> &FeatureSet {
        self.inner().features()
    }

    fn is_stale(&self) -> bool {
        self.inner().is_stale()
    }

    fn threshold(&self) -> i32 {
        self.inner().threshold()
    }

    fn set_threshold(&mut self, value: i32) {
        self.inner_mut().set_threshold(value);
    }

    fn threshold_max(&self) -> i32 {
        self.inner().threshold_max()
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detector::Corner(d) => fmt::Display::fmt(d, f),
            Detector::Line(d) => fmt::Display::fmt(d, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn dispatches_to_the_variant() {
        let img = ImageContainer::new("x", RgbImage::new(16, 16));
        let mut corner = Detector::with_defaults(FeatureKind::Corner, img.clone());
        let mut line = Detector::with_defaults(FeatureKind::Line, img);
        assert_eq!(corner.kind(), FeatureKind::Corner);
        assert_eq!(line.kind(), FeatureKind::Line);
        assert_eq!(corner.threshold_max(), 300);
        assert_eq!(line.threshold_max(), 90);

        corner.set_threshold(3);
        assert_eq!(corner.detect().kind(), FeatureKind::Corner);
        assert_eq!(corner.threshold(), 95);
        assert_eq!(line.detect().kind(), FeatureKind::Line);
        assert_eq!(line.window_name(), "Line x");
    }
}
