//! Pipeline topology descriptions.
//!
//! Builds the textual pipeline description handed to the pipeline framework, and
//! names the element whose output pad receives the frame probe.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

pub const DEFAULT_CAMERA: &str = "rpicamsrc";
pub const LIBCAMERA_SOURCE: &str = "libcamerasrc";
pub const USB_CAMERA_SOURCE: &str = "v4l2src device=/dev/video0 ! \
     video/x-raw,format=YUY2,width=640,height=480,framerate=30/1 ! \
     videoconvert ! videoscale ! \
     video/x-raw,format=RGB,width=640,height=640";

pub const PERSONFACE_MODEL: &str = "/usr/share/hailo-models/yolov5s_personface_h8l.hef";
pub const YOLOV8_MODEL: &str = "/usr/share/hailo-models/yolov8s_h8l.hef";
pub const POST_PROCESS_LIB: &str =
    "/usr/lib/aarch64-linux-gnu/hailo/tappas/post_processes/libyolo_hailortpp_post.so";

/// Insertion point when detector elements are present.
pub const DETECTOR_PROBE_ELEMENT: &str = "hailofilter0";
/// Insertion point in test mode.
pub const TEST_PROBE_ELEMENT: &str = "videoconvert0";

/// Which model the detector runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectionType {
    #[default]
    PersonFace,
    Vehicles,
    General,
}

impl DetectionType {
    pub fn model_path(&self) -> &'static str {
        match self {
            DetectionType::PersonFace => PERSONFACE_MODEL,
            DetectionType::Vehicles | DetectionType::General => YOLOV8_MODEL,
        }
    }
}

impl FromStr for DetectionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "personface" => Ok(DetectionType::PersonFace),
            "vehicles" => Ok(DetectionType::Vehicles),
            "general" => Ok(DetectionType::General),
            other => Err(anyhow!(
                "unknown detection type '{}' (expected personface, vehicles or general)",
                other
            )),
        }
    }
}

impl fmt::Display for DetectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionType::PersonFace => f.write_str("personface"),
            DetectionType::Vehicles => f.write_str("vehicles"),
            DetectionType::General => f.write_str("general"),
        }
    }
}

/// Description of the pipeline to launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    pub camera: String,
    pub detection_type: DetectionType,
    /// Include accelerator inference elements. False is test mode.
    pub detector_elements: bool,
    /// Optional post-process function name passed to the filter element.
    pub function_name: Option<String>,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            camera: DEFAULT_CAMERA.to_string(),
            detection_type: DetectionType::default(),
            detector_elements: true,
            function_name: None,
        }
    }
}

impl Topology {
    /// Textual pipeline description.
    pub fn describe(&self) -> String {
        if !self.detector_elements {
            return format!("{} ! videoconvert ! waylandsink", self.camera);
        }
        let filter = match self.function_name.as_deref().filter(|name| !name.is_empty()) {
            Some(function) => format!(
                "hailofilter function-name={} so-path={}",
                function, POST_PROCESS_LIB
            ),
            None => format!("hailofilter so-path={}", POST_PROCESS_LIB),
        };
        format!(
            "{} ! hailonet hef-path={} ! {} ! hailooverlay ! videoconvert ! waylandsink",
            self.camera,
            self.detection_type.model_path(),
            filter
        )
    }

    /// Element whose `src` pad receives the frame probe.
    pub fn probe_element(&self) -> &'static str {
        if self.detector_elements {
            DETECTOR_PROBE_ELEMENT
        } else {
            TEST_PROBE_ELEMENT
        }
    }

    /// Camera strings starting with `stub://` run without a pipeline framework.
    pub fn is_stub(&self) -> bool {
        self.camera.starts_with("stub://")
    }
}
