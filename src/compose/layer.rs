use image::RgbaImage;

/// Semantic trait category of a layer, assigned by whoever fetched it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Body,
    Cloth,
    Hand,
    Weapon,
    Hair,
    Helmet,
    Other,
}

impl LayerKind {
    /// Classify a trait part name, i.e. the directory segment of a trait URL
    /// such as `helm` in `.../ipfs/<cid>/helm/3.png`.
    ///
    /// Only the part segment is inspected, never the full URL, so a CID or
    /// file name that happens to contain a marker does not change the kind.
    pub fn from_part(part: &str) -> Self {
        let part = part.to_ascii_lowercase();
        if part.contains("helm") {
            Self::Helmet
        } else if part.contains("hair") {
            Self::Hair
        } else if part.contains("weapon") {
            Self::Weapon
        } else if part.contains("hand") {
            Self::Hand
        } else if part.contains("cloth") {
            Self::Cloth
        } else if part.contains("body") {
            Self::Body
        } else {
            Self::Other
        }
    }

    /// Layers whose top edge marks the top of the head.
    pub fn is_anchor_candidate(self) -> bool {
        matches!(self, Self::Hair | Self::Helmet)
    }
}

/// Position of a layer in the stack, independent of its index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    /// The scene background. Upstream tags only the first layer of a token.
    Background,
    #[default]
    Trait,
}

/// One decoded trait image, immutable once fetched.
#[derive(Clone, Debug)]
pub struct FetchedLayer {
    pub image: RgbaImage,
    /// Where the layer came from; used for logging and the body repair shim.
    pub source: String,
    pub kind: LayerKind,
    pub role: LayerRole,
}

impl FetchedLayer {
    pub fn new(image: RgbaImage, source: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            image,
            source: source.into(),
            kind,
            role: LayerRole::Trait,
        }
    }

    pub fn background(image: RgbaImage, source: impl Into<String>) -> Self {
        Self {
            image,
            source: source.into(),
            kind: LayerKind::Other,
            role: LayerRole::Background,
        }
    }

    pub fn with_role(mut self, role: LayerRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_background(&self) -> bool {
        self.role == LayerRole::Background
    }
}
