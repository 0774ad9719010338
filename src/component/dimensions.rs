//! Image dimension probing.

use std::io::Cursor;

use image::ImageReader;
use log::debug;

/// Reads the pixel dimensions of an encoded image without decoding it.
///
/// Returns `None` for empty bodies and unrecognized or truncated formats.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.is_empty() {
        return None;
    }
    let reader = match ImageReader::new(Cursor::new(bytes)).with_guessed_format() {
        Ok(reader) => reader,
        Err(e) => {
            debug!("Failed to sniff image format: {}", e);
            return None;
        }
    };
    match reader.into_dimensions() {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            debug!("Failed to read image dimensions: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid GIF: 1x1 transparent pixel.
    pub(crate) const PIXEL_GIF: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00,
        0x00, 0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00,
        0x3b,
    ];

    #[test]
    fn test_probe_gif() {
        assert_eq!(probe_dimensions(PIXEL_GIF), Some((1, 1)));
    }

    #[test]
    fn test_probe_garbage() {
        assert_eq!(probe_dimensions(b""), None);
        assert_eq!(probe_dimensions(b"not an image"), None);
    }
}
