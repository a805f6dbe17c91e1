//! Overlay rendering and throttled persistence.
//!
//! The renderer draws two fixed text lines onto a decoded frame and converts it to
//! display channel order. Text placement is fixed so saved frames are comparable
//! across runs:
//!
//! - line 1: `Detections: <n>` with its baseline at (10, 30)
//! - line 2: `The meaning of life is: 42` with its baseline at (10, 60)
//! - 30 px glyph height, pure green, 2 px stroke
//!
//! Display order is B, G, R. Only `RGB` input is swapped to get there; every other
//! format keeps the decoder's order. Sinks treat the annotated pixels as B, G, R.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;

use crate::caps::PixelFormat;

pub const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

pub const DETECTIONS_BASELINE: (i32, i32) = (10, 30);
pub const NOTE_BASELINE: (i32, i32) = (10, 60);
pub const NOTE_TEXT: &str = "The meaning of life is: ";
pub const NOTE_VALUE: i32 = 42;
pub const TEXT_HEIGHT_PX: f32 = 30.0;
pub const TEXT_STROKE_PX: i32 = 2;
pub const TEXT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Default persistence cadence, in frames.
pub const DEFAULT_SAVE_INTERVAL: u64 = 30;

/// Annotated frame in display (B, G, R) channel order.
#[derive(Clone, Debug)]
pub struct AnnotatedFrame {
    pub frame_count: u64,
    pub pixels: RgbImage,
}

impl AnnotatedFrame {
    /// Copy with channels in R, G, B order, for encoders that expect it.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut rgb = self.pixels.clone();
        swap_red_blue(&mut rgb);
        rgb
    }
}

pub struct OverlayRenderer {
    font: Option<FontVec>,
}

impl OverlayRenderer {
    pub fn new(font: Option<FontVec>) -> Self {
        Self { font }
    }

    /// Renderer that draws no text. Channel conversion still applies.
    pub fn without_text() -> Self {
        Self { font: None }
    }

    /// Load the overlay font. A missing or unreadable font disables text drawing.
    pub fn from_font_path(path: &Path) -> Self {
        match load_font(path) {
            Ok(font) => Self::new(Some(font)),
            Err(err) => {
                log::warn!("overlay text disabled: {:#}", err);
                Self::without_text()
            }
        }
    }

    pub fn draws_text(&self) -> bool {
        self.font.is_some()
    }

    /// Annotate a decoded frame and convert it to display order.
    pub fn render(
        &self,
        mut image: RgbImage,
        format: &PixelFormat,
        detection_count: usize,
        frame_count: u64,
    ) -> AnnotatedFrame {
        if let Some(font) = &self.font {
            let detections = format!("Detections: {}", detection_count);
            draw_line(&mut image, font, DETECTIONS_BASELINE, &detections);
            let note = format!("{}{}", NOTE_TEXT, NOTE_VALUE);
            draw_line(&mut image, font, NOTE_BASELINE, &note);
        }

        if *format == PixelFormat::Rgb {
            swap_red_blue(&mut image);
        }

        AnnotatedFrame {
            frame_count,
            pixels: image,
        }
    }
}

pub fn load_font(path: &Path) -> Result<FontVec> {
    let bytes =
        fs::read(path).with_context(|| format!("read overlay font {}", path.display()))?;
    FontVec::try_from_vec(bytes)
        .map_err(|e| anyhow!("invalid overlay font {}: {}", path.display(), e))
}

fn draw_line(image: &mut RgbImage, font: &FontVec, baseline: (i32, i32), text: &str) {
    let scale = PxScale::from(TEXT_HEIGHT_PX);
    let top = baseline.1 - font.as_scaled(scale).ascent().round() as i32;
    for dx in 0..TEXT_STROKE_PX {
        for dy in 0..TEXT_STROKE_PX {
            draw_text_mut(image, TEXT_COLOR, baseline.0 + dx, top + dy, scale, font, text);
        }
    }
}

fn swap_red_blue(image: &mut RgbImage) {
    for pixel in image.pixels_mut() {
        pixel.0.swap(0, 2);
    }
}

// ----------------------------------------------------------------------------
// Persistence
// ----------------------------------------------------------------------------

/// Persist every `interval`-th frame. An interval of zero disables persistence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveCadence {
    pub interval: u64,
}

impl SaveCadence {
    pub fn every(interval: u64) -> Self {
        Self { interval }
    }

    pub fn is_due(&self, frame_count: u64) -> bool {
        self.interval != 0 && frame_count % self.interval == 0
    }
}

impl Default for SaveCadence {
    fn default() -> Self {
        Self::every(DEFAULT_SAVE_INTERVAL)
    }
}

/// Destination for persisted frames.
pub trait FrameSink: Send {
    /// Persist a frame and return where it went.
    fn persist(&mut self, frame: &AnnotatedFrame) -> Result<PathBuf>;
}

/// Writes `frame_<count>.jpg` files into a directory.
pub struct FilesystemSink {
    root: PathBuf,
}

impl FilesystemSink {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create output directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, frame_count: u64) -> PathBuf {
        self.root.join(format!("frame_{}.jpg", frame_count))
    }
}

impl FrameSink for FilesystemSink {
    fn persist(&mut self, frame: &AnnotatedFrame) -> Result<PathBuf> {
        let path = self.path_for(frame.frame_count);
        frame
            .to_rgb_image()
            .save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Keeps persisted frames in memory.
#[derive(Default)]
pub struct MemorySink {
    frames: Vec<AnnotatedFrame>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[AnnotatedFrame] {
        &self.frames
    }
}

impl FrameSink for MemorySink {
    fn persist(&mut self, frame: &AnnotatedFrame) -> Result<PathBuf> {
        self.frames.push(frame.clone());
        Ok(PathBuf::from(format!("memory://frame_{}", frame.frame_count)))
    }
}

/// Persist `frame` when the cadence says so. Failures are logged, never returned.
pub fn persist_if_due(
    sink: &mut dyn FrameSink,
    cadence: SaveCadence,
    frame: &AnnotatedFrame,
) -> Option<PathBuf> {
    if !cadence.is_due(frame.frame_count) {
        return None;
    }
    match sink.persist(frame) {
        Ok(path) => Some(path),
        Err(err) => {
            log::warn!("frame {} not persisted: {:#}", frame.frame_count, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl FrameSink for FailingSink {
        fn persist(&mut self, _frame: &AnnotatedFrame) -> Result<PathBuf> {
            Err(anyhow!("disk full"))
        }
    }

    fn image() -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([200, 100, 50]))
    }

    #[test]
    fn rgb_input_is_swapped_to_display_order() {
        let renderer = OverlayRenderer::without_text();
        let frame = renderer.render(image(), &PixelFormat::Rgb, 1, 1);
        assert!(frame.pixels.pixels().all(|p| p.0 == [50, 100, 200]));
        assert!(frame.to_rgb_image().pixels().all(|p| p.0 == [200, 100, 50]));
    }

    #[test]
    fn other_formats_keep_their_order() {
        let renderer = OverlayRenderer::without_text();
        for format in [
            PixelFormat::Bgr,
            PixelFormat::Rgba,
            PixelFormat::Yuy2,
            PixelFormat::Other("NV12".to_string()),
        ] {
            let frame = renderer.render(image(), &format, 0, 2);
            assert!(frame.pixels.pixels().all(|p| p.0 == [200, 100, 50]));
        }
    }

    #[test]
    fn missing_font_disables_text_only() {
        let renderer = OverlayRenderer::from_font_path(Path::new("/nonexistent/font.ttf"));
        assert!(!renderer.draws_text());
        let frame = renderer.render(image(), &PixelFormat::Bgr, 2, 3);
        assert_eq!(frame.pixels, image());
        assert_eq!(frame.frame_count, 3);
    }

    #[test]
    #[ignore = "needs DejaVu Sans at DEFAULT_FONT_PATH"]
    fn text_is_drawn_with_system_font() {
        let font = load_font(Path::new(DEFAULT_FONT_PATH)).expect("overlay font installed");
        let renderer = OverlayRenderer::new(Some(font));
        let blank = RgbImage::new(320, 80);
        let frame = renderer.render(blank, &PixelFormat::Bgr, 2, 1);
        assert!(frame
            .pixels
            .pixels()
            .any(|p| p.0[1] > 200 && p.0[0] < 50 && p.0[2] < 50));
        // Nothing is drawn below the second line's descenders.
        for x in 0..320 {
            assert_eq!(frame.pixels.get_pixel(x, 79).0, [0, 0, 0]);
        }
    }

    #[test]
    fn cadence_fires_on_multiples_only() {
        let cadence = SaveCadence::default();
        let due: Vec<u64> = (1..=95).filter(|n| cadence.is_due(*n)).collect();
        assert_eq!(due, vec![30, 60, 90]);
        assert!(!SaveCadence::every(0).is_due(30));
    }

    #[test]
    fn persistence_failures_are_swallowed() {
        let frame = AnnotatedFrame {
            frame_count: 30,
            pixels: image(),
        };
        let mut sink = FailingSink;
        assert!(persist_if_due(&mut sink, SaveCadence::default(), &frame).is_none());
    }

    #[test]
    fn filesystem_sink_names_files_by_frame_count() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut sink = FilesystemSink::new(dir.path().join("frames"))?;
        let frame = AnnotatedFrame {
            frame_count: 60,
            pixels: image(),
        };
        let path = persist_if_due(&mut sink, SaveCadence::default(), &frame).expect("persisted");
        assert_eq!(path, dir.path().join("frames").join("frame_60.jpg"));
        assert!(path.exists());

        let skipped = AnnotatedFrame {
            frame_count: 61,
            pixels: image(),
        };
        assert!(persist_if_due(&mut sink, SaveCadence::default(), &skipped).is_none());
        assert!(!sink.path_for(61).exists());
        Ok(())
    }
}
