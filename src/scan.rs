//! Annotation scanner.
//!
//! Visits every annotation record attached to a buffer exactly once, in attachment
//! order, and asks the source registry who owns it. Records are never modified.

use crate::detect::{DetectionEvent, SourceRegistry};
use crate::frame::{AnnotationRecord, InterceptedFrame};

/// Outcome of scanning one buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanReport {
    /// All attached records, in attachment order.
    pub records: Vec<AnnotationRecord>,
    /// True when at least one record belongs to a registered detection source.
    pub detection_meta_found: bool,
    /// Events contributed by recognised records.
    pub events: Vec<DetectionEvent>,
    /// Human-readable scan diagnostics.
    pub diagnostics: Vec<String>,
}

pub fn scan_frame<F: InterceptedFrame>(frame: &F, registry: &SourceRegistry) -> ScanReport {
    scan_records(frame.annotations(), registry)
}

pub fn scan_records(records: Vec<AnnotationRecord>, registry: &SourceRegistry) -> ScanReport {
    let mut report = ScanReport::default();

    for record in &records {
        let Some(source) = registry.source_for(record) else {
            continue;
        };
        report.detection_meta_found = true;
        report.diagnostics.push(format!(
            "Found {} metadata: {}",
            source.name(),
            record.type_name
        ));
        report.diagnostics.push(format!(
            "  -> Processing {} metadata for detections",
            source.name()
        ));
        report.events.extend(source.detections(record));
    }

    if !report.detection_meta_found {
        let namespace = registry.list().join("/");
        let namespace = if namespace.is_empty() {
            "detection".to_string()
        } else {
            namespace
        };
        report
            .diagnostics
            .push(format!("No {} metadata found in buffer", namespace));
        let available: String = records
            .iter()
            .map(|record| format!("{} ", record.type_name))
            .collect();
        report
            .diagnostics
            .push(format!("Available metadata types: {}", available));
    }

    report.records = records;
    report
}
