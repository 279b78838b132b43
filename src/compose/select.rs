//! Per-layer draw decisions.

use std::borrow::Cow;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::{
    compose::{
        flags::RenderFlags,
        layer::{FetchedLayer, LayerKind},
        overlays::OverlayAssets,
        scan::{AnchorPolicy, CropAnchor, find_anchor},
        shape::resize_nearest,
    },
    foundation::core::CANVAS_SIZE,
};

/// Bucket that shipped one body asset at a quarter of the canvas size.
pub const LEGACY_BODY_BUCKET: &str = "QmeqeBpsYTuJL8AZhY9fGBeTj9QuvMVqaZeRWFnjA24QEE";
pub const LEGACY_BODY_SUFFIX: &str = "5.png";
const LEGACY_BODY_SIZE: u32 = 300;

#[derive(Clone, Debug)]
pub enum Paint<'a> {
    /// Flat colour over the whole canvas.
    Fill(Rgba<u8>),
    Image(Cow<'a, RgbaImage>),
}

#[derive(Clone, Debug)]
pub struct DrawOp<'a> {
    pub paint: Paint<'a>,
    pub kind: LayerKind,
    pub anchor_candidate: bool,
}

impl DrawOp<'_> {
    pub fn is_background_fill(&self) -> bool {
        matches!(self.paint, Paint::Fill(_))
    }
}

#[derive(Clone, Debug)]
pub struct Selection<'a> {
    /// Draw list, bottom to top, in input order.
    pub ops: Vec<DrawOp<'a>>,
    pub anchor: CropAnchor,
}

/// Compatibility shim for a known malformed body asset; remove once the
/// bucket is re-pinned at full size.
fn needs_body_repair(layer: &FetchedLayer) -> bool {
    layer.kind == LayerKind::Body
        && layer.source.contains(LEGACY_BODY_BUCKET)
        && layer.source.ends_with(LEGACY_BODY_SUFFIX)
        && layer.image.dimensions() == (LEGACY_BODY_SIZE, LEGACY_BODY_SIZE)
}

/// Decide, per layer and in order, whether it is drawn, substituted or
/// dropped, and compute the crop anchor from the head layers.
///
/// The seasonal hat, when requested and available, is appended last so it
/// sits on top.
pub fn select<'a>(
    layers: &'a [FetchedLayer],
    flags: &RenderFlags,
    overlays: &'a OverlayAssets,
    policy: AnchorPolicy,
) -> Selection<'a> {
    let mid_x = i64::from(CANVAS_SIZE / 2);
    let mut anchor = policy.initial_anchor(CANVAS_SIZE);
    let mut ops = Vec::with_capacity(layers.len() + 1);
    let mut background_seen = false;

    for (idx, layer) in layers.iter().enumerate() {
        let anchor_candidate = layer.kind.is_anchor_candidate();
        if anchor_candidate {
            let found = find_anchor(&layer.image, mid_x, policy);
            anchor.raise_to(found);
            debug!(idx, found, anchor = anchor.y(), "head layer scanned");
        }

        let mut image = Cow::Borrowed(&layer.image);
        if needs_body_repair(layer) {
            debug!(idx, source = %layer.source, "upscaling undersized body asset");
            image = Cow::Owned(resize_nearest(&layer.image, CANVAS_SIZE, CANVAS_SIZE));
        }

        if layer.kind == LayerKind::Cloth && flags.no_clothes {
            debug!(idx, "clothing suppressed");
            continue;
        }

        // Only the first background-tagged layer is the scene background.
        let is_background = layer.is_background() && !background_seen;
        if layer.is_background() {
            if background_seen {
                debug!(idx, "extra background role ignored");
            }
            background_seen = true;
        }

        if is_background {
            if let Some(color) = flags.background_override {
                ops.push(DrawOp {
                    paint: Paint::Fill(color),
                    kind: layer.kind,
                    anchor_candidate: false,
                });
                continue;
            }
            if flags.drops_background() {
                debug!(idx, "background dropped");
                continue;
            }
        }

        if flags.snowball_mode {
            match layer.kind {
                LayerKind::Weapon => {
                    debug!(idx, "weapon dropped for snowball");
                    continue;
                }
                LayerKind::Hand => {
                    if let Some(fist) = overlays.snowball_fist() {
                        image = Cow::Borrowed(fist);
                    } else {
                        debug!(idx, "no fist overlay, keeping hand");
                    }
                }
                _ => {}
            }
        }

        ops.push(DrawOp {
            paint: Paint::Image(image),
            kind: layer.kind,
            anchor_candidate,
        });
    }

    if flags.add_hat_overlay {
        match overlays.hat() {
            Some(hat) => ops.push(DrawOp {
                paint: Paint::Image(Cow::Borrowed(hat)),
                kind: LayerKind::Other,
                anchor_candidate: false,
            }),
            None => debug!("hat requested but not loaded"),
        }
    }

    Selection { ops, anchor }
}
