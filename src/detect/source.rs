use crate::detect::result::DetectionEvent;
use crate::frame::AnnotationRecord;

/// Adapter for one family of detection metadata attached to buffers.
///
/// A source decides which annotation records it owns and translates the records it
/// owns into detection events. Records no source recognises are ordinary metadata.
pub trait DetectionSource: Send {
    /// Source identifier, used in diagnostics.
    fn name(&self) -> &str;

    /// Returns true when this source owns the record.
    fn recognizes(&self, record: &AnnotationRecord) -> bool;

    /// Detection events carried by a recognised record.
    fn detections(&self, record: &AnnotationRecord) -> Vec<DetectionEvent>;
}
