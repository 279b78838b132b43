//! Raster decode/encode at the service boundary.

use std::io::Cursor;

use anyhow::Context as _;
use image::{ImageFormat, ImageReader, RgbaImage};

use crate::foundation::error::{CitizenError, CitizenResult};

/// Default ceiling on decoded pixels for one layer (4096 x 4096).
pub const DEFAULT_MAX_PIXELS: u64 = 4096 * 4096;

fn raster_limits(max_pixels: u64) -> image::Limits {
    let max_dim = max_pixels.min(u64::from(u32::MAX)) as u32;
    let mut limits = image::Limits::default();
    limits.max_image_width = Some(max_dim);
    limits.max_image_height = Some(max_dim);
    limits.max_alloc = Some(max_pixels.saturating_mul(4));
    limits
}

/// Decode a PNG or JPEG (format sniffed from the bytes) into straight RGBA8.
pub fn decode_raster(bytes: &[u8], max_pixels: u64) -> CitizenResult<RgbaImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CitizenError::decode(format!("sniff image format: {e}")))?;
    reader.limits(raster_limits(max_pixels));
    let img = reader
        .decode()
        .map_err(|e| CitizenError::decode(e.to_string()))?;

    let pixels = u64::from(img.width()).saturating_mul(u64::from(img.height()));
    if pixels == 0 || pixels > max_pixels {
        return Err(CitizenError::decode(format!(
            "raster has unsupported dimensions {}x{}",
            img.width(),
            img.height()
        )));
    }
    Ok(img.to_rgba8())
}

pub fn encode_png(img: &RgbaImage) -> CitizenResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn png_round_trip_keeps_straight_alpha() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([100, 50, 200, 128]));
        let bytes = encode_png(&img).unwrap();
        let back = decode_raster(&bytes, DEFAULT_MAX_PIXELS).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn oversized_raster_is_rejected() {
        let img = RgbaImage::new(10, 10);
        let bytes = encode_png(&img).unwrap();
        assert!(decode_raster(&bytes, 50).is_err());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_raster(b"not an image", DEFAULT_MAX_PIXELS).unwrap_err();
        assert!(matches!(err, CitizenError::Decode(_)));
    }
}
