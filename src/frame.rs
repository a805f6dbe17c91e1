//! Frame interception seam.
//!
//! The inspector never touches the pipeline framework directly. It sees each buffer
//! through `InterceptedFrame`, which exposes:
//! - the currently negotiated caps at the interception point
//! - scoped, read-only access to the buffer memory
//! - the out-of-band annotation records attached to the buffer, in attachment order
//!
//! `SyntheticFrame` is the in-memory implementation used by tests and by the
//! `stub://` source. The GStreamer implementation lives in `pipeline`.

use std::ops::Deref;

use crate::caps::StreamCaps;

/// Read-only view over one metadata entry attached to a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub type_name: String,
}

impl AnnotationRecord {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

/// A buffer observed at the interception point.
pub trait InterceptedFrame {
    /// Guard over the mapped buffer memory. Dropping it releases the mapping.
    type Mapping<'a>: Deref<Target = [u8]>
    where
        Self: 'a;

    /// Negotiated caps, or `StreamCaps::unknown()` when none are negotiated yet.
    fn caps(&self) -> StreamCaps;

    /// Map the buffer for reading. `None` when the buffer cannot be mapped.
    fn map_readable(&self) -> Option<Self::Mapping<'_>>;

    /// Attached annotation records in attachment order.
    fn annotations(&self) -> Vec<AnnotationRecord>;
}

/// Owned frame with fixed caps, pixel bytes, and annotation records.
#[derive(Clone, Debug, Default)]
pub struct SyntheticFrame {
    caps: StreamCaps,
    data: Option<Vec<u8>>,
    annotations: Vec<AnnotationRecord>,
}

impl SyntheticFrame {
    pub fn new(caps: StreamCaps, data: Vec<u8>) -> Self {
        Self {
            caps,
            data: Some(data),
            annotations: Vec::new(),
        }
    }

    /// A frame whose memory refuses to map.
    pub fn unmappable(caps: StreamCaps) -> Self {
        Self {
            caps,
            data: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, type_name: impl Into<String>) -> Self {
        self.annotations.push(AnnotationRecord::new(type_name));
        self
    }

    /// Packed RGB frame filled with a single color.
    pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let caps = StreamCaps::from_fields(Some("RGB"), Some(width as i32), Some(height as i32));
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self::new(caps, data)
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl InterceptedFrame for SyntheticFrame {
    type Mapping<'a> = &'a [u8]
    where
        Self: 'a;

    fn caps(&self) -> StreamCaps {
        self.caps.clone()
    }

    fn map_readable(&self) -> Option<Self::Mapping<'_>> {
        self.data.as_deref()
    }

    fn annotations(&self) -> Vec<AnnotationRecord> {
        self.annotations.clone()
    }
}
