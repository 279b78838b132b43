//! Render request parsing and the canonical cache key.

use std::{fmt, str::FromStr};

use image::Rgba;

use crate::{
    compose::{RenderFlags, parse_background_color},
    foundation::{
        core::{Season, Size},
        error::{CitizenError, CitizenResult},
    },
};

/// Query string of a render request. A flag is on when its value is
/// non-empty (`?no-bg=1`, `?no-bg=true`); `?no-bg` alone is off.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
pub struct RenderQuery {
    #[serde(rename = "no-bg")]
    pub no_bg: Option<String>,
    #[serde(rename = "santa-hat")]
    pub santa_hat: Option<String>,
    pub snowball: Option<String>,
    pub female: Option<String>,
    #[serde(rename = "no-clothes")]
    pub no_clothes: Option<String>,
    #[serde(rename = "bg-color")]
    pub bg_color: Option<String>,
    pub crop_preview: Option<String>,
}

fn is_set(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.is_empty())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimensions {
    /// `pfp`: full canvas, cropped to the portrait window.
    Portrait,
    Fixed(Size),
}

impl Dimensions {
    pub fn size(self) -> Size {
        match self {
            Self::Portrait => Size::canvas(),
            Self::Fixed(size) => size,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => f.write_str("pfp"),
            Self::Fixed(size) => fmt::Display::fmt(size, f),
        }
    }
}

impl FromStr for Dimensions {
    type Err = CitizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pfp") {
            Ok(Self::Portrait)
        } else {
            s.parse().map(Self::Fixed)
        }
    }
}

/// A validated render request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderRequest {
    pub season: Season,
    pub dimensions: Dimensions,
    pub id: u64,
    pub no_background: bool,
    pub santa_hat: bool,
    pub snowball: bool,
    pub female: bool,
    pub no_clothes: bool,
    pub preview: bool,
    /// Normalized hex and parsed colour. Always `None` in preview mode.
    pub background: Option<(String, Rgba<u8>)>,
}

impl RenderRequest {
    pub fn new(
        season: Season,
        dimensions: Dimensions,
        id: u64,
        query: &RenderQuery,
    ) -> CitizenResult<Self> {
        let preview = is_set(&query.crop_preview);

        // Preview ignores the colour entirely, even an invalid one.
        let background = match query.bg_color.as_deref() {
            Some(raw) if !preview && !raw.is_empty() => {
                let color = parse_background_color(raw)?;
                let [r, g, b, _] = color.0;
                Some((format!("{r:02x}{g:02x}{b:02x}"), color))
            }
            _ => None,
        };

        Ok(Self {
            season,
            dimensions,
            id,
            no_background: is_set(&query.no_bg),
            santa_hat: is_set(&query.santa_hat),
            snowball: is_set(&query.snowball),
            female: is_set(&query.female),
            no_clothes: is_set(&query.no_clothes),
            preview,
            background,
        })
    }

    /// Parse the raw path segments of `/{season}/{dimensions}/{id}`.
    pub fn from_parts(
        season: &str,
        dimensions: &str,
        id: &str,
        query: &RenderQuery,
    ) -> CitizenResult<Self> {
        let season = season.parse::<Season>()?;
        let dimensions = dimensions.parse::<Dimensions>()?;
        let id = id
            .parse::<u64>()
            .map_err(|e| CitizenError::validation(format!("invalid id '{id}': {e}")))?;
        Self::new(season, dimensions, id, query)
    }

    pub fn portrait(&self) -> bool {
        self.dimensions == Dimensions::Portrait
    }

    pub fn flags(&self) -> RenderFlags {
        RenderFlags {
            no_background: self.no_background,
            add_hat_overlay: self.santa_hat,
            snowball_mode: self.snowball,
            no_clothes: self.no_clothes,
            portrait_mode: self.portrait(),
            preview_mode: self.preview,
            female_variant: self.female,
            background_override: self.background.as_ref().map(|(_, c)| *c),
            size: self.dimensions.size(),
        }
    }

    /// Canonical cache key, `<season>/<dimensions>/<id>` plus one suffix per
    /// option that changes the output.
    ///
    /// Preview replaces the colour, portrait and background suffixes with
    /// `_crop_preview`.
    pub fn cache_key(&self) -> String {
        let mut key = format!("{}/{}/{}", self.season, self.dimensions, self.id);
        if self.preview {
            key.push_str("_crop_preview");
        } else {
            if let Some((hex, _)) = &self.background {
                key.push_str("_bg_color_");
                key.push_str(hex);
            }
            if self.portrait() {
                key.push_str("_pfp_crop");
            }
            if self.no_background {
                key.push_str("_no_bg");
            }
        }
        if self.santa_hat {
            key.push_str("_santa");
        }
        if self.snowball {
            key.push_str("_snowball");
        }
        if self.female {
            key.push_str("_female");
        }
        if self.no_clothes {
            key.push_str("_nc");
        }
        key
    }
}
