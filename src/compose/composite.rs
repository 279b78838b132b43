use image::RgbaImage;

use crate::{
    compose::{
        blend::{fill_over, over_image},
        select::{DrawOp, Paint},
    },
    foundation::core::CANVAS_SIZE,
};

/// Draw `ops` in order onto a fresh transparent canvas; later ops occlude
/// earlier ones.
pub fn composite(ops: &[DrawOp<'_>]) -> RgbaImage {
    let mut canvas = RgbaImage::new(CANVAS_SIZE, CANVAS_SIZE);
    composite_onto(&mut canvas, ops);
    canvas
}

pub fn composite_onto(canvas: &mut RgbaImage, ops: &[DrawOp<'_>]) {
    for op in ops {
        match &op.paint {
            Paint::Fill(color) => fill_over(canvas, *color),
            Paint::Image(img) => over_image(canvas, img),
        }
    }
}
