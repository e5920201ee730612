//! Corner and line-segment feature detection with interactive threshold tuning.
//!
//! Both detectors produce a [`FeatureSet`]: corners as single-point groups, line segments as
//! start/end pairs. The set can be drawn with [`FeatureRenderer`], exported as text with
//! [`persist`], and re-computed live with an [`InteractiveTuner`].

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss, clippy::module_name_repetitions)]

pub mod container;
pub mod corner;
pub mod detector;
#[cfg(feature = "display")]
pub mod display;
pub mod error;
pub mod features;
mod glyphs;
pub mod harris;
pub mod hough;
pub mod line;
pub mod persist;
pub mod render;
pub mod traits;
pub mod tuner;

pub use container::ImageContainer;
pub use corner::{CornerDetector, CornerDetectorParams};
pub use detector::Detector;
pub use error::{Error, Result};
pub use features::{distance, FeatureGroup, FeatureKind, FeaturePoint, FeatureSet};
pub use line::{LineDetector, LineDetectorParams};
pub use persist::{parse_features, write_features, write_features_file, FeatureExport};
pub use render::FeatureRenderer;
pub use traits::FeatureDetector;
pub use tuner::{ControlEvent, ControlSurface, InteractiveTuner, TextSurface, TunerState};
