//! GStreamer adapter.
//!
//! Launches a pipeline from a topology description, attaches the frame probe to
//! the insertion element's `src` pad, and runs until end-of-stream, an error, an
//! explicit stop, or the run timeout. The probe always returns `Ok`, so buffers
//! pass through unmodified.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use gstreamer as gst;
use gstreamer::prelude::*;

use crate::caps::StreamCaps;
use crate::frame::{AnnotationRecord, InterceptedFrame};
use crate::inspector::{FrameInspector, RunCounters};
use crate::topology::Topology;

const BUS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One buffer seen on a probed pad.
pub struct GstFrame<'a> {
    pad: &'a gst::Pad,
    buffer: &'a gst::BufferRef,
}

impl<'a> GstFrame<'a> {
    pub fn new(pad: &'a gst::Pad, buffer: &'a gst::BufferRef) -> Self {
        Self { pad, buffer }
    }
}

impl InterceptedFrame for GstFrame<'_> {
    type Mapping<'m> = gst::BufferMap<'m, gst::buffer::Readable>
    where
        Self: 'm;

    fn caps(&self) -> StreamCaps {
        let Some(caps) = self.pad.current_caps() else {
            return StreamCaps::unknown();
        };
        let Some(structure) = caps.structure(0) else {
            return StreamCaps::unknown();
        };
        let resolved = StreamCaps::from_fields(
            structure.get::<&str>("format").ok(),
            structure.get::<i32>("width").ok(),
            structure.get::<i32>("height").ok(),
        );

        let stride = gstreamer_video::VideoInfo::from_caps(&caps)
            .ok()
            .and_then(|info| info.stride().first().copied())
            .and_then(|stride| usize::try_from(stride).ok());
        match stride {
            Some(stride) if resolved.is_valid() => resolved.with_row_stride(stride),
            _ => resolved,
        }
    }

    fn map_readable(&self) -> Option<Self::Mapping<'_>> {
        self.buffer.map_readable().ok()
    }

    fn annotations(&self) -> Vec<AnnotationRecord> {
        self.buffer
            .iter_meta::<gst::Meta>()
            .map(|meta| AnnotationRecord::new(meta.api().name()))
            .collect()
    }
}

/// Requests an early end of `ProbePipeline::run` from another thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

pub struct ProbePipeline {
    pipeline: gst::Pipeline,
    counters: Arc<RunCounters>,
    stop: StopHandle,
}

impl ProbePipeline {
    /// Build the pipeline for `topology` and attach `inspector` at its insertion point.
    pub fn new(topology: &Topology, inspector: FrameInspector) -> Result<Self> {
        gst::init().context("initialize gstreamer")?;

        let description = topology.describe();
        log::info!("using pipeline: {}", description);
        let pipeline = gst::parse::launch(&description)
            .context("build pipeline")?
            .downcast::<gst::Pipeline>()
            .map_err(|_| anyhow!("pipeline description did not produce a Pipeline"))?;

        let element_name = topology.probe_element();
        let element = pipeline
            .by_name(element_name)
            .with_context(|| format!("could not find element {}", element_name))?;
        let pad = element
            .static_pad("src")
            .with_context(|| format!("could not get src pad from {}", element_name))?;

        let counters = inspector.counters();
        let inspector = Mutex::new(inspector);
        pad.add_probe(gst::PadProbeType::BUFFER, move |pad, info| {
            if let Some(gst::PadProbeData::Buffer(ref buffer)) = info.data {
                let frame = GstFrame::new(pad, buffer);
                match inspector.lock() {
                    Ok(mut inspector) => {
                        let report = inspector.inspect(&frame);
                        println!("{}", report);
                    }
                    Err(_) => log::error!("frame inspector lock poisoned; frame passed through"),
                }
            }
            gst::PadProbeReturn::Ok
        })
        .with_context(|| format!("could not add probe to {}", element_name))?;

        Ok(Self {
            pipeline,
            counters,
            stop: StopHandle::default(),
        })
    }

    pub fn counters(&self) -> Arc<RunCounters> {
        Arc::clone(&self.counters)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Play until end-of-stream, an error, a stop request, or `timeout`.
    pub fn run(&self, timeout: Duration) -> Result<()> {
        self.pipeline
            .set_state(gst::State::Playing)
            .context("set pipeline to Playing")?;
        log::info!("detection pipeline playing (timeout {}s)", timeout.as_secs());

        let result = self.pump_bus(timeout);

        self.pipeline
            .set_state(gst::State::Null)
            .context("set pipeline to Null")?;
        result
    }

    fn pump_bus(&self, timeout: Duration) -> Result<()> {
        let bus = self.pipeline.bus().context("pipeline has no bus")?;
        let deadline = Instant::now() + timeout;
        loop {
            if self.stop.is_requested() {
                log::info!("stop requested, stopping pipeline");
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                log::info!("timeout reached, stopping pipeline");
                return Ok(());
            }
            let wait = (deadline - now).min(BUS_POLL_INTERVAL);
            let Some(message) = bus.timed_pop(gst::ClockTime::from_mseconds(wait.as_millis() as u64))
            else {
                continue;
            };

            use gstreamer::MessageView;
            match message.view() {
                MessageView::Eos(..) => {
                    log::info!("end of stream");
                    return Ok(());
                }
                MessageView::Error(err) => {
                    return Err(anyhow!(
                        "gstreamer error from {:?}: {} ({:?})",
                        err.src().map(|s| s.path_string()),
                        err.error(),
                        err.debug()
                    ));
                }
                _ => {}
            }
        }
    }
}

impl Drop for ProbePipeline {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
