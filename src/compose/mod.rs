//! The layer compositor: selection, alpha compositing, and output shaping.
//!
//! A render is a pure function of its layers and flags. The only shared
//! state is the read-only [`OverlayAssets`] held by the [`Renderer`].

pub mod blend;
pub mod composite;
pub mod flags;
pub mod layer;
pub mod overlays;
pub mod scan;
pub mod select;
pub mod shape;

use std::sync::Arc;

use image::RgbaImage;
use tracing::info;

use crate::foundation::error::{CitizenError, CitizenResult};

pub use flags::{RenderFlags, parse_background_color};
pub use layer::{FetchedLayer, LayerKind, LayerRole};
pub use overlays::OverlayAssets;
pub use scan::{AnchorPolicy, CropAnchor};

/// Long-lived renderer, built once at startup and shared across requests.
#[derive(Clone, Debug)]
pub struct Renderer {
    overlays: Arc<OverlayAssets>,
    policy: AnchorPolicy,
}

impl Renderer {
    pub fn new(overlays: Arc<OverlayAssets>) -> Self {
        Self {
            overlays,
            policy: AnchorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AnchorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn overlays(&self) -> &OverlayAssets {
        &self.overlays
    }

    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    /// Composite `layers` bottom to top and shape the result.
    ///
    /// The layer list must be non-empty; everything else is infallible.
    #[tracing::instrument(skip_all, fields(layers = layers.len(), female = flags.female_variant))]
    pub fn render(&self, layers: &[FetchedLayer], flags: &RenderFlags) -> CitizenResult<RgbaImage> {
        if layers.is_empty() {
            return Err(CitizenError::validation("no layers to render"));
        }

        let selection = select::select(layers, flags, &self.overlays, self.policy);
        let canvas = composite::composite(&selection.ops);
        let out = shape::shape(canvas, flags, selection.anchor);

        info!(
            drawn = selection.ops.len(),
            anchor = selection.anchor.y(),
            width = out.width(),
            height = out.height(),
            "rendered citizen"
        );
        Ok(out)
    }
}
