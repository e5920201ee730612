use crate::container::ImageContainer;
use crate::features::{FeatureKind, FeatureSet};

/// A detector owns its source image, its parameters and the [`FeatureSet`] of its last run.
///
/// Exactly one integer parameter (the threshold) is exposed for interactive tuning.
pub trait FeatureDetector {
    fn kind(&self) -> FeatureKind;

    fn image(&self) -> &ImageContainer;

    /// Identifier of the source image.
    fn id(&self) -> &str {
        self.image().id()
    }

    /// Title used for display windows, `"<Kind> <id>"`.
    fn window_name(&self) -> String {
        format!("{} {}", self.kind(), self.id())
    }

    /// Run detection with the current parameters, replacing the cached feature set.
    fn detect(&mut self) -> &FeatureSet;

    /// Result of the last [`detect`](FeatureDetector::detect) call (empty before the first one).
    fn features(&self) -> &FeatureSet;

    /// True when a parameter changed after the cached feature set was produced.
    fn is_stale(&self) -> bool;

    /// Current value of the tunable threshold.
    fn threshold(&self) -> i32;

    /// Overwrite the tunable threshold. Takes effect on the next `detect`.
    fn set_threshold(&mut self, value: i32);

    /// Upper bound of the tuning control; the lower bound is always 0.
    fn threshold_max(&self) -> i32;
}
