// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Live window for monitoring annotated frames.

use std::time::{Duration, Instant};

use image::DynamicImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::{Result, SentinelError};

/// Frame pacing for the window (~60 Hz).
const FRAME_INTERVAL: Duration = Duration::from_micros(16_600);

/// A monitoring window backed by minifb.
///
/// Escape or `Q` closes the window, space toggles pause.
pub struct Viewer {
    window: Window,
    title: String,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
    paused: bool,
}

impl Viewer {
    /// Open a window sized for frames of `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be created.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| SentinelError::VisualizerError(format!("Failed to create window: {e}")))?;
        window.set_target_fps(60);

        Ok(Self {
            window,
            title: title.to_string(),
            width,
            height,
            buffer: vec![0; width * height],
            paused: false,
        })
    }

    /// Whether the window can show a frame of the given size without reopening.
    #[must_use]
    pub const fn fits(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }

    fn should_close(&self) -> bool {
        !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_down(Key::Q)
    }

    /// Show a frame and put `status` (e.g. the active alerts) in the title bar.
    ///
    /// # Returns
    ///
    /// * `false` once the user closed the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window buffer cannot be updated.
    pub fn show(&mut self, frame: &DynamicImage, status: &str) -> Result<bool> {
        if self.should_close() {
            return Ok(false);
        }

        let rgb = frame.to_rgb8();
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);
        self.buffer.clear();
        self.buffer.extend(rgb.pixels().map(|p| {
            (u32::from(p[0]) << 16) | (u32::from(p[1]) << 8) | u32::from(p[2])
        }));
        self.width = w;
        self.height = h;

        if status.is_empty() {
            self.window.set_title(&self.title);
        } else {
            self.window.set_title(&format!("{} | {status}", self.title));
        }

        self.refresh()?;
        Ok(true)
    }

    /// Keep the last frame on screen for `duration`, honoring pause.
    ///
    /// # Returns
    ///
    /// * `false` once the user closed the window.
    ///
    /// # Errors
    ///
    /// Returns an error if the window buffer cannot be updated.
    pub fn hold(&mut self, duration: Duration) -> Result<bool> {
        let start = Instant::now();
        while self.paused || start.elapsed() < duration {
            if self.should_close() {
                return Ok(false);
            }
            if self.window.is_key_pressed(Key::Space, KeyRepeat::No) {
                self.paused = !self.paused;
            }
            self.refresh()?;
            std::thread::sleep(FRAME_INTERVAL);
        }
        Ok(true)
    }

    fn refresh(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            self.window.update();
            return Ok(());
        }
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| SentinelError::VisualizerError(format!("Failed to update window: {e}")))
    }
}
