use image::{Rgba, RgbaImage};

pub type Rgba8 = [u8; 4];

/// Source-over for straight (non-premultiplied) RGBA8.
///
/// An opaque source replaces the destination and a transparent source leaves
/// it untouched; everything in between is rounded to nearest.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    // Weights are kept in 255^2 units to stay in integers.
    let dst_w = u32::from(dst[3]) * (255 - sa);
    let src_w = sa * 255;
    let out_a = src_w + dst_w;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * src_w + u32::from(dst[i]) * dst_w;
        out[i] = ((c + out_a / 2) / out_a) as u8;
    }
    out[3] = ((out_a + 127) / 255) as u8;
    out
}

/// Draw `src` over `dst` with both origins at (0, 0), clipped to the overlap.
pub fn over_image(dst: &mut RgbaImage, src: &RgbaImage) {
    let w = dst.width().min(src.width());
    let h = dst.height().min(src.height());
    for y in 0..h {
        for x in 0..w {
            let s = src.get_pixel(x, y).0;
            if s[3] == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(x, y);
            *d = Rgba(over(d.0, s));
        }
    }
}

/// Draw a uniform colour over the whole of `dst`.
pub fn fill_over(dst: &mut RgbaImage, color: Rgba<u8>) {
    if color[3] == 255 {
        for px in dst.pixels_mut() {
            *px = color;
        }
        return;
    }
    for px in dst.pixels_mut() {
        *px = Rgba(over(px.0, color.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_half_alpha_on_opaque_mixes_evenly() {
        let dst = [0, 0, 0, 255];
        let src = [255, 255, 255, 128];
        assert_eq!(over(dst, src), [128, 128, 128, 255]);
    }

    #[test]
    fn over_image_clips_to_overlap() {
        let mut dst = RgbaImage::new(4, 4);
        let src = RgbaImage::from_pixel(8, 2, Rgba([9, 9, 9, 255]));
        over_image(&mut dst, &src);
        assert_eq!(dst.get_pixel(3, 1).0, [9, 9, 9, 255]);
        assert_eq!(dst.get_pixel(3, 2).0, [0, 0, 0, 0]);
    }

    #[test]
    fn opaque_fill_covers_everything() {
        let mut dst = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 1]));
        fill_over(&mut dst, Rgba([5, 6, 7, 255]));
        assert!(dst.pixels().all(|p| p.0 == [5, 6, 7, 255]));
    }
}
