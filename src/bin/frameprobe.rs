//! frameprobe - inspect and annotate frames flowing through a detection pipeline
//!
//! Builds the pipeline from the camera and detection flags, attaches the frame
//! probe at the insertion element, and runs until end-of-stream or the timeout.
//! Camera sources starting with `stub://` run synthetic frames instead.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use frameprobe::{
    topology::{LIBCAMERA_SOURCE, USB_CAMERA_SOURCE},
    DetectionType, FilesystemSink, FrameInspector, InspectorConfig, OverlayRenderer, StubConfig,
    StubSource, Topology,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Inspect, annotate and sample frames at a pipeline insertion point"
)]
struct Args {
    /// Run without accelerator elements (test mode).
    #[arg(long = "no-hailo", alias = "no-detector")]
    no_hailo: bool,

    /// Camera source element description, or stub://NAME for synthetic frames.
    #[arg(long, env = "FRAMEPROBE_CAMERA")]
    camera: Option<String>,

    /// Use the USB camera at /dev/video0.
    #[arg(long, conflicts_with_all = ["camera", "libcamera"])]
    usb: bool,

    /// Use the libcamera source.
    #[arg(long, conflicts_with = "camera")]
    libcamera: bool,

    /// Detection type: personface, vehicles or general.
    #[arg(long = "detect", value_name = "TYPE")]
    detection_type: Option<DetectionType>,

    /// Detect vehicles (cars, trucks, etc.).
    #[arg(long, conflicts_with_all = ["detection_type", "general"])]
    vehicles: bool,

    /// General object detection.
    #[arg(long, conflicts_with = "detection_type")]
    general: bool,

    /// Post-process function name passed to the filter element.
    #[arg(long)]
    function_name: Option<String>,

    /// Stop the pipeline after this many seconds (overrides config).
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Only inspect metadata; do not decode, annotate or save frames.
    #[arg(long)]
    no_capture: bool,

    /// Directory for saved frames (overrides config).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Number of frames produced by a stub:// camera.
    #[arg(long, default_value = "90")]
    stub_frames: u64,
}

impl Args {
    fn topology(&self) -> Topology {
        let camera = if self.usb {
            USB_CAMERA_SOURCE.to_string()
        } else if self.libcamera {
            LIBCAMERA_SOURCE.to_string()
        } else {
            self.camera
                .clone()
                .unwrap_or_else(|| Topology::default().camera)
        };
        let detection_type = if self.vehicles {
            DetectionType::Vehicles
        } else if self.general {
            DetectionType::General
        } else {
            self.detection_type.unwrap_or_default()
        };
        Topology {
            camera,
            detection_type,
            detector_elements: !self.no_hailo,
            function_name: self.function_name.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = InspectorConfig::load()?;
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
    }
    if let Some(secs) = args.timeout_secs {
        if secs == 0 {
            return Err(anyhow!("--timeout-secs must be greater than zero"));
        }
        cfg.run_timeout = Duration::from_secs(secs);
    }
    if args.no_capture {
        cfg.capture_frames = false;
    }

    let topology = args.topology();
    log::info!("camera source: {}", topology.camera);
    log::info!("detection type: {}", topology.detection_type);
    if topology.detector_elements {
        log::info!("using accelerator detection for: {}", topology.detection_type);
    } else {
        log::info!("running without accelerator elements (test mode)");
    }

    let sink = FilesystemSink::new(&cfg.output_dir)?;
    let renderer = if cfg.capture_frames {
        OverlayRenderer::from_font_path(&cfg.font_path)
    } else {
        OverlayRenderer::without_text()
    };
    let mut inspector = FrameInspector::new(
        cfg.inspector_settings(),
        cfg.source_registry(),
        renderer,
        Box::new(sink),
    );

    let total = if topology.is_stub() {
        let mut source = StubSource::new(StubConfig {
            frames: args.stub_frames,
            ..StubConfig::default()
        });
        source.run(&mut inspector, |report| println!("{}", report))
    } else {
        run_pipeline(&topology, inspector, cfg.run_timeout)?
    };

    log::info!("application finished. Total frames processed: {}", total);
    Ok(())
}

#[cfg(feature = "gstreamer")]
fn run_pipeline(topology: &Topology, inspector: FrameInspector, timeout: Duration) -> Result<u64> {
    let pipeline = frameprobe::ProbePipeline::new(topology, inspector)?;
    let counters = pipeline.counters();
    pipeline.run(timeout)?;
    Ok(counters.frame_count())
}

#[cfg(not(feature = "gstreamer"))]
fn run_pipeline(topology: &Topology, _inspector: FrameInspector, _timeout: Duration) -> Result<u64> {
    Err(anyhow!(
        "camera {} needs the gstreamer feature; rebuild with --features gstreamer or use a stub:// camera",
        topology.camera
    ))
}
