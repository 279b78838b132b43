//! SVG rasterization for part token images.

use std::{path::Path, sync::Arc};

use anyhow::Context as _;
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::foundation::error::{CitizenError, CitizenResult};

/// Part images are rendered at twice their nominal size.
pub const PART_RENDER_SCALE: f32 = 2.0;

const MAX_RASTER_DIM: u32 = 8192;

#[derive(Clone)]
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for SvgRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgRasterizer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::with_fonts(None)
    }
}

impl SvgRasterizer {
    /// System fonts, plus every font file in `extra_dir` when given.
    pub fn with_fonts(extra_dir: Option<&Path>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = extra_dir.filter(|d| d.is_dir()) {
            db.load_fonts_dir(dir);
        }
        debug!(faces = db.len(), "svg font database ready");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Rasterize `svg` at `scale` times its intrinsic size into straight
    /// RGBA8.
    pub fn rasterize(&self, svg: &[u8], scale: f32) -> CitizenResult<RgbaImage> {
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg, &opts).context("parse svg tree")?;

        let size = tree.size();
        let to_px = |v: f32| -> CitizenResult<u32> {
            let px = (v * scale).ceil();
            if !px.is_finite() || px < 1.0 || px > MAX_RASTER_DIM as f32 {
                return Err(CitizenError::decode(format!(
                    "svg raster size out of range: {px}"
                )));
            }
            Ok(px as u32)
        };
        let (w, h) = (to_px(size.width())?, to_px(size.height())?);

        let mut pixmap = resvg::tiny_skia::Pixmap::new(w, h)
            .ok_or_else(|| CitizenError::decode("failed to allocate svg pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let mut out = RgbaImage::new(w, h);
        for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(out)
    }
}
