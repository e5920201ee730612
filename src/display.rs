//! Native window control surface, available with the `display` feature.
//!
//! The window shows the latest overlay; the threshold is moved with the arrow keys
//! (Up/Right +1, Down/Left -1, PageUp/PageDown +-10) and Escape stops tuning. The current
//! control value is printed in the top-left corner of the shown frame. Must be used
//! from inside [`show_image::run_context`].

use image::RgbImage;
use log::debug;
use show_image::event::{VirtualKeyCode, WindowEvent};
use show_image::{create_window, BoxImage, ImageInfo, WindowOptions, WindowProxy};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::render::FeatureRenderer;
use crate::tuner::{ControlEvent, ControlSurface};

pub struct WindowSurface {
    window: WindowProxy,
    events: Receiver<WindowEvent>,
    title: String,
    label: String,
    value: i32,
    max: i32,
    frame: Option<RgbImage>,
    stamp: FeatureRenderer,
}

impl WindowSurface {
    const FRAME_NAME: &'static str = "features";

    pub fn open(title: &str) -> Result<Self> {
        let window = create_window(title, WindowOptions::default()).map_err(control_error)?;
        let events = window.event_channel().map_err(control_error)?;
        Ok(Self {
            window,
            events,
            title: title.to_string(),
            label: String::new(),
            value: 0,
            max: 0,
            frame: None,
            stamp: FeatureRenderer::default(),
        })
    }

    fn step(&mut self, delta: i32) -> ControlEvent {
        self.value = (self.value + delta).max(0).min(self.max);
        ControlEvent::ValueChanged(self.value)
    }

    fn overlay_text(&self) -> String {
        format!("{} - {}: {} / {}", self.title, self.label, self.value, self.max)
    }

    /// Push the last frame to the window with the current value stamped on it.
    fn present(&self) -> Result<()> {
        let frame = match &self.frame {
            Some(frame) => self.stamp.stamp_value(frame, self.value),
            None => return Ok(()),
        };
        let info = ImageInfo::rgb8(frame.width(), frame.height());
        let image = BoxImage::new(info, frame.into_raw().into_boxed_slice());
        self.window
            .set_image(Self::FRAME_NAME, image)
            .map_err(control_error)
    }
}

impl ControlSurface for WindowSurface {
    fn configure(&mut self, label: &str, value: i32, max: i32) -> Result<()> {
        self.label = label.to_string();
        self.max = max;
        self.value = value.max(0).min(max);
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> Result<Option<ControlEvent>> {
        let event = match self.events.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return Ok(None),
            // window closed
            Err(RecvTimeoutError::Disconnected) => return Ok(Some(ControlEvent::Cancel)),
        };
        let key = match event {
            WindowEvent::KeyboardInput(input) if input.input.state.is_pressed() => input.input.key_code,
            WindowEvent::CloseRequested(_) => return Ok(Some(ControlEvent::Cancel)),
            _ => return Ok(None),
        };
        Ok(match key {
            Some(VirtualKeyCode::Escape) => Some(ControlEvent::Cancel),
            Some(VirtualKeyCode::Up) | Some(VirtualKeyCode::Right) => Some(self.step(1)),
            Some(VirtualKeyCode::Down) | Some(VirtualKeyCode::Left) => Some(self.step(-1)),
            Some(VirtualKeyCode::PageUp) => Some(self.step(10)),
            Some(VirtualKeyCode::PageDown) => Some(self.step(-10)),
            _ => None,
        })
    }

    fn set_value(&mut self, value: i32) -> Result<()> {
        self.value = value;
        debug!("{}", self.overlay_text());
        self.present()
    }

    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        self.frame = Some(frame.clone());
        self.present()
    }
}

fn control_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Control(err.to_string())
}
