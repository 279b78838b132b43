//! Turning the composited canvas into the image the caller asked for.

use image::{
    RgbaImage,
    imageops::{self, FilterType},
};
use tracing::debug;

use crate::{
    compose::{flags::RenderFlags, scan::CropAnchor},
    foundation::core::{PORTRAIT_SIZE, Size},
};

/// Rectangle in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The portrait window: `PORTRAIT_SIZE` square, centered horizontally, top
/// edge at the anchor.
///
/// A negative anchor is pinned to the top of the canvas and an anchor too low
/// is pulled up, so the window is always the full size when the canvas allows.
pub fn portrait_rect(canvas_width: u32, canvas_height: u32, anchor: CropAnchor) -> CropRect {
    let width = PORTRAIT_SIZE.min(canvas_width);
    let height = PORTRAIT_SIZE.min(canvas_height);

    let mid_x = canvas_width / 2;
    let x = mid_x
        .saturating_sub(PORTRAIT_SIZE / 2)
        .min(canvas_width - width);

    let max_y = i64::from(canvas_height - height);
    let y = anchor.y().clamp(0, max_y) as u32;

    CropRect {
        x,
        y,
        width,
        height,
    }
}

/// Output dimensions for a resize request.
///
/// Only the dimensions that differ from the canvas are requested; the other
/// one follows the aspect ratio. Returns `None` when no resize is needed.
pub fn resize_target(canvas_width: u32, canvas_height: u32, size: Size) -> Option<(u32, u32)> {
    let rw = if canvas_width != size.width { size.width } else { 0 };
    let rh = if canvas_height != size.height {
        size.height
    } else {
        0
    };

    match (rw, rh) {
        (0, 0) => None,
        (w, 0) => Some((w, scale_len(canvas_height, canvas_width, w))),
        (0, h) => Some((scale_len(canvas_width, canvas_height, h), h)),
        (w, h) => Some((w, h)),
    }
}

/// `len * target / reference`, rounded, at least 1.
fn scale_len(len: u32, reference: u32, target: u32) -> u32 {
    if reference == 0 {
        return len.max(1);
    }
    let scaled = (f64::from(target) * f64::from(len) / f64::from(reference) + 0.5).floor();
    (scaled as u32).max(1)
}

/// Nearest-neighbor resample. Every output pixel copies the source pixel
/// under its center; no colour is ever interpolated.
pub fn resize_nearest(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(src, width, height, FilterType::Nearest)
}

/// Apply the output policy: anchored portrait crop when cropping, otherwise
/// a nearest-neighbor resize to the requested size.
pub fn shape(canvas: RgbaImage, flags: &RenderFlags, anchor: CropAnchor) -> RgbaImage {
    let (w, h) = canvas.dimensions();

    if flags.crops() {
        let rect = portrait_rect(w, h, anchor);
        debug!(anchor = anchor.y(), ?rect, "portrait crop");
        return imageops::crop_imm(&canvas, rect.x, rect.y, rect.width, rect.height)
            .to_image();
    }

    match resize_target(w, h, flags.size) {
        Some((tw, th)) => {
            debug!(w, h, tw, th, "nearest resize");
            resize_nearest(&canvas, tw, th)
        }
        None => canvas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn portrait_rect_follows_anchor() {
        let r = portrait_rect(1200, 1200, CropAnchor(100));
        assert_eq!(
            r,
            CropRect {
                x: 280,
                y: 100,
                width: 640,
                height: 640
            }
        );
    }

    #[test]
    fn negative_anchor_keeps_full_height() {
        let r = portrait_rect(1200, 1200, CropAnchor(-20));
        assert_eq!((r.y, r.height), (0, 640));
    }

    #[test]
    fn low_anchor_is_pulled_inside_canvas() {
        let r = portrait_rect(1200, 1200, CropAnchor(1000));
        assert_eq!((r.y, r.height), (560, 640));
    }

    #[test]
    fn small_canvas_shrinks_window() {
        let r = portrait_rect(300, 200, CropAnchor(50));
        assert_eq!(
            r,
            CropRect {
                x: 0,
                y: 0,
                width: 300,
                height: 200
            }
        );
    }

    #[test]
    fn resize_target_keeps_aspect_for_matching_dimension() {
        assert_eq!(resize_target(1200, 1200, Size::square(1200)), None);
        assert_eq!(
            resize_target(1200, 1200, Size::new(600, 1200).unwrap()),
            Some((600, 600))
        );
        assert_eq!(
            resize_target(1200, 1200, Size::new(1200, 300).unwrap()),
            Some((300, 300))
        );
        assert_eq!(
            resize_target(1200, 1200, Size::new(64, 32).unwrap()),
            Some((64, 32))
        );
    }

    #[test]
    fn nearest_replicates_blocks() {
        let mut src = RgbaImage::new(2, 2);
        src.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        src.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        src.put_pixel(0, 1, Rgba([0, 0, 255, 255]));
        src.put_pixel(1, 1, Rgba([255, 255, 255, 255]));

        let out = resize_nearest(&src, 4, 4);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.get_pixel(x, y), src.get_pixel(x / 2, y / 2));
            }
        }
    }

    #[test]
    fn nearest_downscale_picks_centers() {
        let src = RgbaImage::from_fn(4, 1, |x, _| Rgba([x as u8, 0, 0, 255]));
        let out = resize_nearest(&src, 2, 1);
        assert_eq!(out.get_pixel(0, 0)[0], 1);
        assert_eq!(out.get_pixel(1, 0)[0], 3);
    }

    #[test]
    fn shape_without_resize_returns_canvas() {
        let canvas = RgbaImage::from_pixel(1200, 1200, Rgba([1, 2, 3, 4]));
        let out = shape(canvas.clone(), &RenderFlags::default(), CropAnchor(128));
        assert_eq!(out, canvas);
    }

    #[test]
    fn crop_wins_over_resize() {
        let canvas = RgbaImage::new(1200, 1200);
        let flags = RenderFlags {
            portrait_mode: true,
            size: Size::new(300, 300).unwrap(),
            ..Default::default()
        };
        let out = shape(canvas, &flags, CropAnchor(128));
        assert_eq!(out.dimensions(), (640, 640));
    }
}
