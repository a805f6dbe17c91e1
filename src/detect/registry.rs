use crate::frame::AnnotationRecord;

use super::source::DetectionSource;

/// Ordered set of detection sources.
///
/// Lookup walks sources in registration order; the first source that recognises a
/// record owns it.
pub struct SourceRegistry {
    sources: Vec<Box<dyn DetectionSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Registry holding only the default vendor metadata source.
    pub fn with_vendor_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::sources::VendorMetaSource::default());
        registry
    }

    pub fn register<S: DetectionSource + 'static>(&mut self, source: S) {
        self.sources.push(Box::new(source));
    }

    /// Source that owns the record, if any.
    pub fn source_for(&self, record: &AnnotationRecord) -> Option<&dyn DetectionSource> {
        self.sources
            .iter()
            .find(|source| source.recognizes(record))
            .map(|source| &**source)
    }

    /// Registered source names, in registration order.
    pub fn list(&self) -> Vec<String> {
        self.sources
            .iter()
            .map(|source| source.name().to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
