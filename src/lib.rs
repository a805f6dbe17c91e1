//! frameprobe: per-frame inspection and annotation for video pipelines.
//!
//! A probe sits on the output pad of one pipeline element. For every buffer that
//! passes it, the crate:
//!
//! 1. resolves the negotiated caps (`caps`)
//! 2. decodes the buffer into an owned RGB image (`decode`)
//! 3. scans the attached metadata records for detection sources (`scan`, `detect`)
//! 4. falls back to a deterministic synthetic detection table when no source matched
//! 5. draws the overlay text and persists every Nth annotated frame (`overlay`)
//!
//! The buffer itself is never modified and always passes downstream.
//!
//! # Module Structure
//!
//! - `frame`: the `InterceptedFrame` seam and an in-memory implementation
//! - `inspector`: `FrameInspector`, the per-frame control flow and run counters
//! - `topology`: pipeline descriptions and the probe insertion point
//! - `pipeline`: GStreamer adapter (feature `gstreamer`)
//! - `stub`: synthetic frame source for `stub://` cameras
//! - `config`: run configuration from file and environment

pub mod caps;
pub mod config;
pub mod decode;
pub mod detect;
pub mod frame;
pub mod inspector;
pub mod overlay;
#[cfg(feature = "gstreamer")]
pub mod pipeline;
pub mod scan;
pub mod stub;
pub mod topology;

pub use caps::{PixelFormat, StreamCaps};
pub use config::InspectorConfig;
pub use detect::{
    synthesize, DetectionEvent, DetectionSet, DetectionSource, Provenance, SourceRegistry,
    VendorMetaSource,
};
pub use frame::{AnnotationRecord, InterceptedFrame, SyntheticFrame};
pub use inspector::{FrameInspector, FrameReport, InspectorSettings, RunCounters};
pub use overlay::{
    AnnotatedFrame, FilesystemSink, FrameSink, MemorySink, OverlayRenderer, SaveCadence,
};
#[cfg(feature = "gstreamer")]
pub use pipeline::{GstFrame, ProbePipeline, StopHandle};
pub use scan::ScanReport;
pub use stub::{StubConfig, StubSource};
pub use topology::{DetectionType, Topology};
