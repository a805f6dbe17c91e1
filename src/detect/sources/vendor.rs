use crate::detect::result::DetectionEvent;
use crate::detect::source::DetectionSource;
use crate::frame::AnnotationRecord;

pub const DEFAULT_VENDOR_NAME: &str = "Hailo";
pub const DEFAULT_META_PREFIX: &str = "Hailo";
pub const DEFAULT_META_SUFFIX: &str = "hailo";

/// Accelerator vendor metadata, recognised by its type-name namespace.
///
/// Matching is case-sensitive: a record belongs to the vendor when its type name
/// starts with `prefix` or ends with `suffix`. Payload translation is done by the
/// vendor's post-processing library upstream, so recognised records contribute no
/// events here.
pub struct VendorMetaSource {
    name: String,
    prefix: String,
    suffix: String,
}

impl VendorMetaSource {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl Default for VendorMetaSource {
    fn default() -> Self {
        Self::new(DEFAULT_VENDOR_NAME, DEFAULT_META_PREFIX, DEFAULT_META_SUFFIX)
    }
}

impl DetectionSource for VendorMetaSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn recognizes(&self, record: &AnnotationRecord) -> bool {
        let name = record.type_name.as_str();
        (!self.prefix.is_empty() && name.starts_with(&self.prefix))
            || (!self.suffix.is_empty() && name.ends_with(&self.suffix))
    }

    fn detections(&self, _record: &AnnotationRecord) -> Vec<DetectionEvent> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> AnnotationRecord {
        AnnotationRecord::new(name)
    }

    #[test]
    fn matches_prefix_or_suffix() {
        let source = VendorMetaSource::default();
        assert!(source.recognizes(&record("HailoROIMeta")));
        assert!(source.recognizes(&record("GstMetaForhailo")));
        assert!(source.recognizes(&record("Hailo")));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let source = VendorMetaSource::default();
        assert!(!source.recognizes(&record("hailoROIMeta")));
        assert!(!source.recognizes(&record("GstMetaForHAILO")));
        assert!(!source.recognizes(&record("GstVideoMetaAPI")));
        assert!(!source.recognizes(&record("")));
    }

    #[test]
    fn empty_namespace_tokens_never_match() {
        let source = VendorMetaSource::new("none", "", "");
        assert!(!source.recognizes(&record("anything")));
    }
}
