//! Interactive threshold tuning.
//!
//! An [`InteractiveTuner`] binds one detector to a [`ControlSurface`] and, for every value
//! change coming from the surface, writes the value into the detector, re-runs detection,
//! shows the re-rendered overlay and pushes the value the detector actually kept back to the
//! control. The loop ends on a cancel event.

use image::RgbImage;
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::render::FeatureRenderer;
use crate::traits::FeatureDetector;

/// Input coming from a control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// The control was moved to a new value.
    ValueChanged(i32),
    /// Escape or equivalent.
    Cancel,
}

/// Display plus a single bounded integer control and a cancel input.
pub trait ControlSurface {
    /// Set up the control named `label` with range `0..=max`, positioned at `value`.
    fn configure(&mut self, label: &str, value: i32, max: i32) -> Result<()>;

    /// Wait up to `timeout` for the next event. Implementations must block or sleep rather
    /// than return immediately when nothing is pending.
    fn poll(&mut self, timeout: Duration) -> Result<Option<ControlEvent>>;

    /// Move the control to `value` without emitting an event.
    fn set_value(&mut self, value: i32) -> Result<()>;

    fn show(&mut self, frame: &RgbImage) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunerState {
    Running,
    Stopped,
}

pub struct InteractiveTuner<'a, D: FeatureDetector + ?Sized, S: ControlSurface> {
    detector: &'a mut D,
    surface: S,
    renderer: FeatureRenderer,
    state: TunerState,
    /// Number of re-detections triggered by control changes
    updates: usize,
}

impl<'a, D: FeatureDetector + ?Sized, S: ControlSurface> InteractiveTuner<'a, D, S> {
    pub const CONTROL_LABEL: &'static str = "Threshold";
    pub const POLL_INTERVAL: Duration = Duration::from_millis(30);

    pub fn new(detector: &'a mut D, surface: S, renderer: FeatureRenderer) -> Self {
        Self {
            detector,
            surface,
            renderer,
            state: TunerState::Running,
            updates: 0,
        }
    }

    pub fn state(&self) -> TunerState {
        self.state
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Give back the surface, e.g. to inspect what it displayed.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Run the loop until the surface reports [`ControlEvent::Cancel`].
    ///
    /// The last detected feature set stays on the detector afterwards.
    pub fn run(&mut self) -> Result<TunerState> {
        self.state = TunerState::Running;
        info!("tuning {} (Esc to stop)", self.detector.window_name());

        self.surface.configure(
            Self::CONTROL_LABEL,
            self.detector.threshold(),
            self.detector.threshold_max(),
        )?;
        self.refresh()?;

        while self.state == TunerState::Running {
            match self.surface.poll(Self::POLL_INTERVAL)? {
                Some(ControlEvent::ValueChanged(value)) => self.apply(value)?,
                Some(ControlEvent::Cancel) => {
                    self.state = TunerState::Stopped;
                }
                None => {}
            }
        }

        info!(
            "stopped tuning {} at threshold {} with {} groups",
            self.detector.window_name(),
            self.detector.threshold(),
            self.detector.features().len()
        );
        Ok(self.state)
    }

    fn apply(&mut self, value: i32) -> Result<()> {
        debug!("{}: threshold -> {}", self.detector.window_name(), value);
        self.detector.set_threshold(value);
        self.updates += 1;
        self.refresh()
    }

    /// detect, render, show, then sync the control; strictly in that order
    fn refresh(&mut self) -> Result<()> {
        self.detector.detect();
        debug_assert!(!self.detector.is_stale());
        let frame = self
            .renderer
            .render(self.detector.features(), self.detector.image().image());
        self.surface.show(&frame)?;
        self.surface.set_value(self.detector.threshold())
    }
}

// TextSurface ------------------------------------------------------------------------------------

/// Line-oriented control surface.
///
/// Each input line is either an integer (the new control value, clamped to the control range
/// like a slider would) or `q`, `quit`, `esc` to cancel. End of input cancels as well. Frames
/// are optionally saved to `frame_path`, overwriting the previous one.
pub struct TextSurface<R: BufRead> {
    input: R,
    frame_path: Option<PathBuf>,
    label: String,
    max: i32,
    value: i32,
    frames_shown: usize,
    last_frame: Option<RgbImage>,
}

impl<R: BufRead> TextSurface<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            frame_path: None,
            label: String::new(),
            max: 0,
            value: 0,
            frames_shown: 0,
            last_frame: None,
        }
    }

    pub fn with_frame_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.frame_path = Some(path.into());
        self
    }

    /// Current control position.
    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn frames_shown(&self) -> usize {
        self.frames_shown
    }

    pub fn last_frame(&self) -> Option<&RgbImage> {
        self.last_frame.as_ref()
    }
}

impl<R: BufRead> ControlSurface for TextSurface<R> {
    fn configure(&mut self, label: &str, value: i32, max: i32) -> Result<()> {
        self.label = label.to_string();
        self.max = max;
        self.value = value.max(0).min(max);
        info!("{}: 0..={} (enter a value, q to quit)", self.label, self.max);
        Ok(())
    }

    // reading blocks until a full line is available, so the timeout is not needed
    fn poll(&mut self, _timeout: Duration) -> Result<Option<ControlEvent>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(Some(ControlEvent::Cancel));
        }
        let line = line.trim();
        match line {
            "" => Ok(None),
            "q" | "quit" | "esc" => Ok(Some(ControlEvent::Cancel)),
            _ => match line.parse::<i32>() {
                Ok(v) => {
                    self.value = v.max(0).min(self.max);
                    Ok(Some(ControlEvent::ValueChanged(self.value)))
                }
                Err(_) => {
                    warn!("ignoring control input {:?}", line);
                    Ok(None)
                }
            },
        }
    }

    fn set_value(&mut self, value: i32) -> Result<()> {
        if value != self.value {
            info!("{} moved to {}", self.label, value);
        }
        self.value = value;
        Ok(())
    }

    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        self.frames_shown += 1;
        if let Some(path) = &self.frame_path {
            frame.save(path).map_err(|source| Error::Save {
                path: path.clone(),
                source,
            })?;
            debug!("frame {} saved to {}", self.frames_shown, path.display());
        }
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ImageContainer;
    use crate::corner::{CornerDetector, CornerDetectorParams};
    use std::io::Cursor;

    fn detector() -> CornerDetector {
        let img = RgbImage::from_fn(48, 48, |x, y| {
            if (x < 24) == (y < 24) {
                image::Rgb([255, 255, 255])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        CornerDetector::new(ImageContainer::new("t", img), CornerDetectorParams::default())
    }

    #[test]
    fn text_surface_parses_commands() {
        let mut surface = TextSurface::new(Cursor::new("12\n\nabc\n999\n-4\nq\n"));
        surface.configure("Threshold", 200, 300).unwrap();
        let mut events = Vec::new();
        for _ in 0..7 {
            events.push(surface.poll(Duration::from_millis(1)).unwrap());
        }
        assert_eq!(
            events,
            vec![
                Some(ControlEvent::ValueChanged(12)),
                None,
                None,
                Some(ControlEvent::ValueChanged(300)),
                Some(ControlEvent::ValueChanged(0)),
                Some(ControlEvent::Cancel),
                Some(ControlEvent::Cancel),
            ]
        );
    }

    #[test]
    fn control_reflects_clamped_value() {
        let mut det = detector();
        let surface = TextSurface::new(Cursor::new("50\n"));
        let mut tuner = InteractiveTuner::new(&mut det, surface, FeatureRenderer::default());
        assert_eq!(tuner.run().unwrap(), TunerState::Stopped);
        assert_eq!(tuner.updates(), 1);
        assert_eq!(tuner.surface().value(), 95);
        // initial frame plus one per change
        assert_eq!(tuner.surface().frames_shown(), 2);
        assert_eq!(det.threshold(), 95);
        assert!(!det.is_stale());
    }

    #[test]
    fn stopping_keeps_last_result() {
        let mut det = detector();
        let surface = TextSurface::new(Cursor::new("250\n150\nesc\n120\n"));
        let mut tuner = InteractiveTuner::new(&mut det, surface, FeatureRenderer::default());
        tuner.run().unwrap();
        assert_eq!(tuner.updates(), 2);
        let surface = tuner.into_surface();
        assert_eq!(surface.value(), 150);

        let shown = surface.last_frame().unwrap().clone();
        assert_eq!(det.threshold(), 150);
        let expected = FeatureRenderer::default().render(det.features(), det.image().image());
        assert_eq!(shown, expected);
    }
}
