//! Synthetic frame source.
//!
//! Drives a `FrameInspector` with generated RGB frames when the camera is a
//! `stub://` URL, so the inspection path can run without a pipeline framework.

use crate::caps::StreamCaps;
use crate::frame::SyntheticFrame;
use crate::inspector::{FrameInspector, FrameReport};

/// Configuration for a synthetic source.
#[derive(Clone, Debug)]
pub struct StubConfig {
    pub width: u32,
    pub height: u32,
    pub frames: u64,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            frames: 90,
        }
    }
}

pub struct StubSource {
    config: StubConfig,
    frames_generated: u64,
}

impl StubSource {
    pub fn new(config: StubConfig) -> Self {
        Self {
            config,
            frames_generated: 0,
        }
    }

    /// Next frame, or `None` once the configured count has been produced.
    pub fn next_frame(&mut self) -> Option<SyntheticFrame> {
        if self.frames_generated >= self.config.frames {
            return None;
        }
        self.frames_generated += 1;

        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let shift = self.frames_generated as usize;
        let mut pixels = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                // Diagonal gradient that drifts one pixel per frame.
                pixels.extend_from_slice(&[
                    ((x + shift) % 256) as u8,
                    ((y + shift) % 256) as u8,
                    ((x + y) % 256) as u8,
                ]);
            }
        }
        let caps = StreamCaps::from_fields(
            Some("RGB"),
            Some(self.config.width as i32),
            Some(self.config.height as i32),
        );
        Some(SyntheticFrame::new(caps, pixels))
    }

    /// Feed every frame through `inspector`, handing each report to `on_report`.
    pub fn run(
        &mut self,
        inspector: &mut FrameInspector,
        mut on_report: impl FnMut(&FrameReport),
    ) -> u64 {
        let mut processed = 0;
        while let Some(frame) = self.next_frame() {
            let report = inspector.inspect(&frame);
            on_report(&report);
            processed += 1;
        }
        processed
    }
}
