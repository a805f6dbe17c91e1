//! Negotiated stream description at the interception point.
//!
//! `StreamCaps` is resolved fresh for every frame. A missing description is not an
//! error: before the pipeline reaches streaming state there is simply nothing
//! negotiated yet, and the resolver reports an invalid (empty) `StreamCaps`.

use std::fmt;

/// Closed set of pixel layouts the decoder knows how to map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed 8-bit R, G, B.
    Rgb,
    /// Packed 8-bit B, G, R.
    Bgr,
    /// Packed 8-bit R, G, B, A.
    Rgba,
    /// Packed 4:2:2 luma/chroma, Y0 U Y1 V. Covers both `YUY2` and `YUYV`.
    Yuy2,
    /// Anything else. Decoded as packed three-channel on a best-effort basis.
    Other(String),
}

impl PixelFormat {
    /// Map a caps `format` string to a pixel format. Names are case-sensitive.
    pub fn from_name(name: &str) -> Self {
        match name {
            "RGB" => PixelFormat::Rgb,
            "BGR" => PixelFormat::Bgr,
            "RGBA" => PixelFormat::Rgba,
            "YUY2" | "YUYV" => PixelFormat::Yuy2,
            other => PixelFormat::Other(other.to_string()),
        }
    }

    /// Bytes per pixel of the packed layout as it sits in the buffer.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb | PixelFormat::Bgr | PixelFormat::Other(_) => 3,
            PixelFormat::Rgba => 4,
            PixelFormat::Yuy2 => 2,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Rgb => f.write_str("RGB"),
            PixelFormat::Bgr => f.write_str("BGR"),
            PixelFormat::Rgba => f.write_str("RGBA"),
            PixelFormat::Yuy2 => f.write_str("YUY2"),
            PixelFormat::Other(name) => f.write_str(name),
        }
    }
}

/// Pixel format and geometry of the stream, as currently negotiated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamCaps {
    /// Raw `format` field. Empty when unknown.
    pub format: String,
    pub width: i32,
    pub height: i32,
    /// Row stride in bytes for the first plane, when the negotiation layer knows it.
    pub row_stride: Option<usize>,
}

impl StreamCaps {
    /// Caps for a stream whose description is not available yet.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Build caps from the individual structure fields. Missing fields collapse to
    /// their empty value rather than failing.
    pub fn from_fields(format: Option<&str>, width: Option<i32>, height: Option<i32>) -> Self {
        Self {
            format: format.unwrap_or_default().to_string(),
            width: width.unwrap_or(0),
            height: height.unwrap_or(0),
            row_stride: None,
        }
    }

    pub fn with_row_stride(mut self, stride: usize) -> Self {
        self.row_stride = Some(stride);
        self
    }

    /// Usable for decoding: format known, both dimensions positive.
    pub fn is_valid(&self) -> bool {
        !self.format.is_empty() && self.width > 0 && self.height > 0
    }

    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::from_name(&self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_map_to_closed_set() {
        assert_eq!(PixelFormat::from_name("RGB"), PixelFormat::Rgb);
        assert_eq!(PixelFormat::from_name("BGR"), PixelFormat::Bgr);
        assert_eq!(PixelFormat::from_name("RGBA"), PixelFormat::Rgba);
        assert_eq!(PixelFormat::from_name("YUY2"), PixelFormat::Yuy2);
        assert_eq!(PixelFormat::from_name("YUYV"), PixelFormat::Yuy2);
        assert_eq!(
            PixelFormat::from_name("rgb"),
            PixelFormat::Other("rgb".to_string())
        );
        assert_eq!(
            PixelFormat::from_name("NV12"),
            PixelFormat::Other("NV12".to_string())
        );
    }

    #[test]
    fn missing_fields_yield_invalid_caps() {
        let caps = StreamCaps::from_fields(None, None, None);
        assert_eq!(caps, StreamCaps::unknown());
        assert!(!caps.is_valid());

        let caps = StreamCaps::from_fields(Some("RGB"), Some(640), None);
        assert!(!caps.is_valid());

        let caps = StreamCaps::from_fields(Some(""), Some(640), Some(480));
        assert!(!caps.is_valid());

        let caps = StreamCaps::from_fields(Some("RGB"), Some(-1), Some(480));
        assert!(!caps.is_valid());
    }

    #[test]
    fn complete_fields_yield_valid_caps() {
        let caps = StreamCaps::from_fields(Some("YUY2"), Some(640), Some(480));
        assert!(caps.is_valid());
        assert_eq!(caps.pixel_format(), PixelFormat::Yuy2);
        assert_eq!(caps.pixel_format().bytes_per_pixel(), 2);
    }
}
