use std::fmt;

/// Where a frame's detections came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    /// Translated from detection metadata attached upstream.
    Metadata,
    /// Placeholder derived from the frame counter. Never real inference output.
    Synthesized,
}

/// One detected object. Lives for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionEvent {
    pub id: u32,
    pub label: String,
    /// In `[0, 1]`.
    pub confidence: f32,
}

impl DetectionEvent {
    pub fn new(id: u32, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            id,
            label: label.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

impl fmt::Display for DetectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Detection: ID: {} Label: {} Confidence: {:.2}",
            self.id, self.label, self.confidence
        )
    }
}

/// Detections for one frame, tagged with their provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionSet {
    pub provenance: Provenance,
    pub events: Vec<DetectionEvent>,
}

impl DetectionSet {
    pub fn from_metadata(events: Vec<DetectionEvent>) -> Self {
        Self {
            provenance: Provenance::Metadata,
            events,
        }
    }

    pub fn synthesized(events: Vec<DetectionEvent>) -> Self {
        Self {
            provenance: Provenance::Synthesized,
            events,
        }
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn is_synthesized(&self) -> bool {
        self.provenance == Provenance::Synthesized
    }

    /// One diagnostic line per event. Synthesized events carry a `SIMULATED:` prefix.
    pub fn diagnostic_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|event| match self.provenance {
                Provenance::Synthesized => format!("SIMULATED: {}", event),
                Provenance::Metadata => event.to_string(),
            })
            .collect()
    }
}
