use std::path::Path;

use image::RgbaImage;
use tracing::{info, warn};

use crate::compose::blend::over_image;

pub const SANTA_HAT_FILE: &str = "santa_hat.png";
pub const EMPTY_FIST_FILE: &str = "empty_fist.png";
pub const SNOWBALL_FILE: &str = "emptyhand_snowball.png";

/// Static overlay images, loaded once at startup and only read afterwards.
///
/// Every image is optional; a missing one disables the feature that needs it.
#[derive(Clone, Debug, Default)]
pub struct OverlayAssets {
    hat: Option<RgbaImage>,
    fist: Option<RgbaImage>,
    snowball: Option<RgbaImage>,
    /// Fist with the snowball drawn over it at (0, 0).
    snowball_fist: Option<RgbaImage>,
}

impl OverlayAssets {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_images(
        hat: Option<RgbaImage>,
        fist: Option<RgbaImage>,
        snowball: Option<RgbaImage>,
    ) -> Self {
        let snowball_fist = fist.as_ref().map(|fist| {
            let mut out = fist.clone();
            if let Some(ball) = &snowball {
                over_image(&mut out, ball);
            }
            out
        });
        Self {
            hat,
            fist,
            snowball,
            snowball_fist,
        }
    }

    /// Load the overlay files from `dir`. Unreadable files are logged and
    /// skipped, never fatal.
    pub fn load(dir: &Path) -> Self {
        let assets = Self::from_images(
            load_optional(&dir.join(SANTA_HAT_FILE)),
            load_optional(&dir.join(EMPTY_FIST_FILE)),
            load_optional(&dir.join(SNOWBALL_FILE)),
        );
        info!(
            dir = %dir.display(),
            hat = assets.hat.is_some(),
            fist = assets.fist.is_some(),
            snowball = assets.snowball.is_some(),
            "loaded overlay assets"
        );
        assets
    }

    pub fn hat(&self) -> Option<&RgbaImage> {
        self.hat.as_ref()
    }

    pub fn fist(&self) -> Option<&RgbaImage> {
        self.fist.as_ref()
    }

    pub fn snowball(&self) -> Option<&RgbaImage> {
        self.snowball.as_ref()
    }

    /// Replacement for the hand layer in snowball mode.
    pub fn snowball_fist(&self) -> Option<&RgbaImage> {
        self.snowball_fist.as_ref()
    }
}

fn load_optional(path: &Path) -> Option<RgbaImage> {
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "overlay asset unavailable");
            None
        }
    }
}
