//! Frame interception control.
//!
//! `FrameInspector::inspect` is called once per buffer at the insertion point. It
//! sequences caps resolution, decoding, annotation scanning, detection synthesis,
//! overlay rendering and persistence, and always lets the buffer pass through
//! untouched. No step can fail the frame: each failure just skips what depends on it.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::caps::StreamCaps;
use crate::decode::decode_frame;
use crate::detect::{synthesize, DetectionSet, SourceRegistry};
use crate::frame::InterceptedFrame;
use crate::overlay::{persist_if_due, AnnotatedFrame, FrameSink, OverlayRenderer, SaveCadence};
use crate::scan::{scan_frame, ScanReport};

/// Per-run counters. Shared with whoever needs to read them after the run.
#[derive(Debug, Default)]
pub struct RunCounters {
    frame_count: AtomicU64,
}

impl RunCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more frame and return the new total.
    pub fn advance(&self) -> u64 {
        self.frame_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InspectorSettings {
    /// Decode, annotate and persist frames. When false only metadata is inspected.
    pub capture_frames: bool,
    pub save_cadence: SaveCadence,
}

impl Default for InspectorSettings {
    fn default() -> Self {
        Self {
            capture_frames: true,
            save_cadence: SaveCadence::default(),
        }
    }
}

/// What happened to one frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub frame_count: u64,
    pub caps: StreamCaps,
    /// True when the buffer was decoded into an image.
    pub decoded: bool,
    pub scan: ScanReport,
    pub detections: DetectionSet,
    pub persisted: Option<PathBuf>,
}

impl FrameReport {
    pub fn detection_count(&self) -> usize {
        self.detections.count()
    }

    /// Diagnostic lines for this frame, in emission order.
    pub fn diagnostic_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Frame count: {}", self.frame_count)];
        lines.extend(self.scan.diagnostics.iter().cloned());
        lines.extend(self.detections.diagnostic_lines());
        lines
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.diagnostic_lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

pub struct FrameInspector {
    settings: InspectorSettings,
    counters: Arc<RunCounters>,
    registry: SourceRegistry,
    renderer: OverlayRenderer,
    sink: Box<dyn FrameSink>,
    last_frame: Option<AnnotatedFrame>,
}

impl FrameInspector {
    pub fn new(
        settings: InspectorSettings,
        registry: SourceRegistry,
        renderer: OverlayRenderer,
        sink: Box<dyn FrameSink>,
    ) -> Self {
        Self {
            settings,
            counters: Arc::new(RunCounters::new()),
            registry,
            renderer,
            sink,
            last_frame: None,
        }
    }

    pub fn counters(&self) -> Arc<RunCounters> {
        Arc::clone(&self.counters)
    }

    pub fn settings(&self) -> InspectorSettings {
        self.settings
    }

    /// Most recent annotated frame, if any frame has been rendered.
    pub fn last_frame(&self) -> Option<&AnnotatedFrame> {
        self.last_frame.as_ref()
    }

    /// Inspect one intercepted buffer.
    pub fn inspect<F: InterceptedFrame>(&mut self, frame: &F) -> FrameReport {
        let frame_count = self.counters.advance();
        let caps = frame.caps();

        let image = if self.settings.capture_frames && caps.is_valid() {
            decode_frame(frame, &caps)
        } else {
            None
        };
        let decoded = image.is_some();

        let scan = scan_frame(frame, &self.registry);
        let detections = if scan.detection_meta_found {
            DetectionSet::from_metadata(scan.events.clone())
        } else {
            synthesize(frame_count)
        };

        let mut persisted = None;
        if let Some(image) = image {
            let annotated = self.renderer.render(
                image,
                &caps.pixel_format(),
                detections.count(),
                frame_count,
            );
            persisted = persist_if_due(&mut *self.sink, self.settings.save_cadence, &annotated);
            if let Some(path) = &persisted {
                log::info!("saved frame {} to {}", frame_count, path.display());
            }
            self.last_frame = Some(annotated);
        }

        FrameReport {
            frame_count,
            caps,
            decoded,
            scan,
            detections,
            persisted,
        }
    }
}
