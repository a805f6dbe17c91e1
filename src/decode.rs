//! Buffer decoder.
//!
//! Maps raw frame memory into an owned three-channel image according to the
//! negotiated pixel format. The decoder never mutates the source buffer and holds
//! the mapping only for the duration of one call.
//!
//! Both packed three-channel variants (`RGB`, `BGR`) are copied as-is; any channel
//! swap happens later in the overlay stage.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;

use crate::caps::{PixelFormat, StreamCaps};
use crate::frame::InterceptedFrame;

/// Decode the frame's buffer. Returns `None` when the caps are not usable, the
/// buffer cannot be mapped, or the mapped memory does not match the caps.
pub fn decode_frame<F: InterceptedFrame>(frame: &F, caps: &StreamCaps) -> Option<RgbImage> {
    if !caps.is_valid() {
        return None;
    }
    let Some(mapping) = frame.map_readable() else {
        log::warn!("decode: buffer could not be mapped for reading");
        return None;
    };
    let decoded = decode_buffer(&*mapping, caps);
    drop(mapping);

    match decoded {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("decode: {:#}", err);
            None
        }
    }
}

/// Decode mapped bytes into an image with the geometry from `caps`.
pub fn decode_buffer(data: &[u8], caps: &StreamCaps) -> Result<RgbImage> {
    if !caps.is_valid() {
        return Err(anyhow!("caps are not negotiated ({:?})", caps));
    }
    let width = caps.width as u32;
    let height = caps.height as u32;
    let format = caps.pixel_format();
    let packed = pack_rows(data, &format, width, height, caps.row_stride)
        .with_context(|| format!("map {} frame {}x{}", format, width, height))?;

    let rgb = match format {
        PixelFormat::Rgb | PixelFormat::Bgr | PixelFormat::Other(_) => packed,
        PixelFormat::Rgba => rgba_to_rgb(&packed),
        PixelFormat::Yuy2 => yuy2_to_rgb(&packed, width as usize, height as usize),
    };

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| anyhow!("decoded frame does not fill {}x{}", width, height))
}

fn packed_row_bytes(format: &PixelFormat, width: usize) -> usize {
    match format {
        // Macropixels carry two luma samples; an odd trailing pixel still needs one.
        PixelFormat::Yuy2 => width.div_ceil(2) * 4,
        other => width * other.bytes_per_pixel(),
    }
}

/// Copy the visible part of each row into a contiguous vector, dropping any
/// per-row padding.
fn pack_rows(
    data: &[u8],
    format: &PixelFormat,
    width: u32,
    height: u32,
    stride_hint: Option<usize>,
) -> Result<Vec<u8>> {
    let h = height as usize;
    let row_bytes = packed_row_bytes(format, width as usize);
    // The caps stride describes the negotiated layout, which is not the
    // three-channel fallback layout used for unrecognised formats.
    let stride = match (format, stride_hint) {
        (PixelFormat::Other(_), _) | (_, None) => row_bytes,
        (_, Some(stride)) => stride.max(row_bytes),
    };

    let expected = stride
        .checked_mul(h - 1)
        .and_then(|v| v.checked_add(row_bytes))
        .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
    if data.len() < expected {
        return Err(anyhow!(
            "buffer too short: expected at least {}, got {}",
            expected,
            data.len()
        ));
    }

    if stride == row_bytes {
        return Ok(data[..row_bytes * h].to_vec());
    }

    let mut packed = Vec::with_capacity(row_bytes * h);
    for row in 0..h {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + row_bytes]);
    }
    Ok(packed)
}

fn rgba_to_rgb(pixels: &[u8]) -> Vec<u8> {
    pixels
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

/// BT.601 limited-range conversion of packed Y0 U Y1 V macropixels.
fn yuy2_to_rgb(pixels: &[u8], width: usize, height: usize) -> Vec<u8> {
    let row_bytes = width.div_ceil(2) * 4;
    let mut rgb = Vec::with_capacity(width * height * 3);
    for j in 0..height {
        let row = &pixels[j * row_bytes..(j + 1) * row_bytes];
        for i in 0..width {
            let macropixel = (i / 2) * 4;
            let y = row[macropixel + (i % 2) * 2] as f32;
            let u = row[macropixel + 1] as f32 - 128.0;
            let v = row[macropixel + 3] as f32 - 128.0;

            let c = 1.164_f32 * (y - 16.0);
            let r = c + 1.596_f32 * v;
            let g = c - 0.391_f32 * u - 0.813_f32 * v;
            let b = c + 2.018_f32 * u;

            rgb.extend_from_slice(&[clamp_to_u8(r), clamp_to_u8(g), clamp_to_u8(b)]);
        }
    }
    rgb
}

fn clamp_to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
