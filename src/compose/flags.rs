use image::Rgba;

use crate::foundation::{
    core::Size,
    error::{CitizenError, CitizenResult},
};

/// Named shortcuts accepted wherever a background colour is.
pub const BACKGROUND_ALIASES: [(&str, &str); 3] = [
    ("elite", "faac27"),
    ("default", "849ef3"),
    ("outer", "b0d774"),
];

/// Per-render options. Immutable for the duration of one render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderFlags {
    pub no_background: bool,
    pub add_hat_overlay: bool,
    pub snowball_mode: bool,
    pub no_clothes: bool,
    pub portrait_mode: bool,
    pub preview_mode: bool,
    /// Female trait URLs were substituted upstream; carried for logging only.
    pub female_variant: bool,
    pub background_override: Option<Rgba<u8>>,
    /// Requested output size when not cropping.
    pub size: Size,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            no_background: false,
            add_hat_overlay: false,
            snowball_mode: false,
            no_clothes: false,
            portrait_mode: false,
            preview_mode: false,
            female_variant: false,
            background_override: None,
            size: Size::canvas(),
        }
    }
}

impl RenderFlags {
    /// Portrait and preview both produce the anchored square crop, and win
    /// over any requested size.
    pub fn crops(&self) -> bool {
        self.portrait_mode || self.preview_mode
    }

    /// Whether the background layer is dropped instead of drawn.
    pub fn drops_background(&self) -> bool {
        self.background_override.is_none() && (self.no_background || self.preview_mode)
    }
}

/// Parse a background colour: an alias from [`BACKGROUND_ALIASES`] or six hex
/// digits (with an optional leading `#`). The result is always opaque.
pub fn parse_background_color(value: &str) -> CitizenResult<Rgba<u8>> {
    let value = value.trim();
    let hex = BACKGROUND_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(value))
        .map(|(_, hex)| *hex)
        .unwrap_or_else(|| value.trim_start_matches('#'));

    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CitizenError::validation(
            "background color string is invalid hex",
        ));
    }

    let parsed = u32::from_str_radix(hex, 16)
        .map_err(|_| CitizenError::validation("failed to parse integer"))?;
    Ok(Rgba([
        (parsed >> 16) as u8,
        ((parsed >> 8) & 0xff) as u8,
        (parsed & 0xff) as u8,
        0xff,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_hex() {
        assert_eq!(
            parse_background_color("FAAC27").unwrap(),
            Rgba([0xfa, 0xac, 0x27, 0xff])
        );
        assert_eq!(
            parse_background_color("#010203").unwrap(),
            Rgba([1, 2, 3, 0xff])
        );
    }

    #[test]
    fn resolves_aliases_case_insensitively() {
        assert_eq!(
            parse_background_color("Elite").unwrap(),
            Rgba([0xfa, 0xac, 0x27, 0xff])
        );
        assert_eq!(
            parse_background_color("default").unwrap(),
            Rgba([0x84, 0x9e, 0xf3, 0xff])
        );
        assert_eq!(
            parse_background_color("OUTER").unwrap(),
            Rgba([0xb0, 0xd7, 0x74, 0xff])
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(parse_background_color("gold").is_err());
        assert!(parse_background_color("12345").is_err());
        assert!(parse_background_color("faac27ff").is_err());
        assert!(parse_background_color("zzzzzz").is_err());
    }

    #[test]
    fn crop_modes_take_precedence() {
        let flags = RenderFlags {
            preview_mode: true,
            ..Default::default()
        };
        assert!(flags.crops());
        assert!(flags.drops_background());
        assert!(!RenderFlags::default().crops());
    }

    #[test]
    fn override_keeps_background_slot() {
        let flags = RenderFlags {
            no_background: true,
            background_override: Some(Rgba([1, 2, 3, 255])),
            ..Default::default()
        };
        assert!(!flags.drops_background());
    }
}
