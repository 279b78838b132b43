use std::{fmt, str::FromStr};

use crate::foundation::error::{CitizenError, CitizenResult};

/// Side length of the square compositing canvas every render starts from.
pub const CANVAS_SIZE: u32 = 1200;

/// Side length of the square portrait (PFP) crop.
pub const PORTRAIT_SIZE: u32 = 640;

/// Largest width or height a caller may request.
pub const MAX_OUTPUT_DIM: u32 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> CitizenResult<Self> {
        if width == 0 || height == 0 {
            return Err(CitizenError::validation("width and height must be > 0"));
        }
        if width > MAX_OUTPUT_DIM || height > MAX_OUTPUT_DIM {
            return Err(CitizenError::validation(format!(
                "size {width}x{height} exceeds {MAX_OUTPUT_DIM}x{MAX_OUTPUT_DIM}"
            )));
        }
        Ok(Self { width, height })
    }

    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    pub const fn canvas() -> Self {
        Self::square(CANVAS_SIZE)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WxH`, e.g. `600x600`.
impl FromStr for Size {
    type Err = CitizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| CitizenError::validation("invalid length"))?;
        let width = w
            .parse::<u32>()
            .map_err(|e| CitizenError::validation(format!("invalid width '{w}': {e}")))?;
        let height = h
            .parse::<u32>()
            .map_err(|e| CitizenError::validation(format!("invalid height '{h}': {e}")))?;
        Self::new(width, height)
    }
}

/// Collection season. Each season has its own contracts and IPFS buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Season(pub u8);

impl Season {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);

    pub fn all() -> [Self; 2] {
        [Self::ONE, Self::TWO]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Parses the route prefix form, `s1` / `s2`.
impl FromStr for Season {
    type Err = CitizenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .strip_prefix('s')
            .and_then(|n| n.parse::<u8>().ok())
            .ok_or_else(|| CitizenError::validation(format!("unknown season '{s}'")))?;
        let season = Self(n);
        if !Self::all().contains(&season) {
            return Err(CitizenError::validation(format!("unknown season '{s}'")));
        }
        Ok(season)
    }
}
