//! Locating the top of the head for the portrait crop.

use image::RgbaImage;

/// Half-extent of the square window searched around the column hit.
const REFINE_RADIUS: i64 = 128;

/// Vertical crop origin. Starts at a policy default and only ever moves up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CropAnchor(pub i64);

impl CropAnchor {
    /// Adopt `candidate` if it is higher (smaller) than the current anchor.
    pub fn raise_to(&mut self, candidate: i64) {
        if candidate < self.0 {
            self.0 = candidate;
        }
    }

    pub fn y(self) -> i64 {
        self.0
    }
}

/// How the topmost opaque pixel of a head layer is found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnchorPolicy {
    /// Column scan refined by a neighborhood search, 40px headroom.
    #[default]
    Refined,
    /// Single column scan with 10px headroom. Reproduces early renders only.
    Legacy,
}

impl AnchorPolicy {
    pub fn initial_anchor(self, canvas_height: u32) -> CropAnchor {
        match self {
            Self::Refined => CropAnchor(128),
            Self::Legacy => CropAnchor(i64::from(canvas_height / 12)),
        }
    }

    fn headroom(self) -> i64 {
        match self {
            Self::Refined => 40,
            Self::Legacy => 10,
        }
    }
}

/// Alpha at `(x, y)`; anything outside the image reads as transparent.
fn alpha_at(img: &RgbaImage, x: i64, y: i64) -> u8 {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return 0;
    }
    img.get_pixel(x as u32, y as u32)[3]
}

fn column_top(img: &RgbaImage, x: i64) -> Option<i64> {
    (0..i64::from(img.height())).find(|&y| alpha_at(img, x, y) > 0)
}

/// Smallest row with a visible pixel inside the window around `(x, y)`.
fn window_top(img: &RgbaImage, x: i64, y: i64) -> Option<i64> {
    let x0 = (x - REFINE_RADIUS).max(0);
    let x1 = (x + REFINE_RADIUS).min(i64::from(img.width()));
    let y0 = (y - REFINE_RADIUS).max(0);
    let y1 = (y + REFINE_RADIUS).min(i64::from(img.height()));

    (y0..y1).find(|&row| (x0..x1).any(|col| alpha_at(img, col, row) > 0))
}

/// Find the crop origin contributed by one head layer, scanning down column
/// `x`. The result may be negative; callers clamp when cropping.
pub fn find_anchor(img: &RgbaImage, x: i64, policy: AnchorPolicy) -> i64 {
    match policy {
        AnchorPolicy::Legacy => column_top(img, x).map_or(0, |y| y - policy.headroom()),
        AnchorPolicy::Refined => {
            let mut highest = column_top(img, x).unwrap_or(0);
            if let Some(y) = window_top(img, x, highest) {
                highest = highest.min(y);
            }
            highest - policy.headroom()
        }
    }
}
