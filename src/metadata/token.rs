use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    foundation::error::{CitizenError, CitizenResult},
    metadata::data_uri::{DataUri, decode_data_uri},
};

/// Matches the description line of on-chain metadata, which is not always
/// valid JSON (raw quotes inside the text).
static DESCRIPTION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"("description":\s")(.+)(",)"#).expect("static regex"));

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: serde_json::Value,
}

/// ERC-721 token metadata as returned by `tokenURI`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
    pub image: Option<String>,
    pub image_data: Option<String>,
    pub animation_url: Option<String>,
}

impl Metadata {
    /// Parse raw metadata JSON, falling back to stripping the description
    /// line when the document does not parse as-is.
    pub fn parse(raw: &str) -> CitizenResult<Self> {
        match serde_json::from_str(raw) {
            Ok(m) => Ok(m),
            Err(first) => {
                debug!(error = %first, "metadata json invalid, stripping description");
                let stripped = DESCRIPTION_FIELD.replace_all(raw, "");
                serde_json::from_str(&stripped)
                    .map_err(|e| CitizenError::metadata(format!("parse metadata json: {e}")))
            }
        }
    }

    /// Decode a `tokenURI` result (a JSON data URI).
    pub fn from_token_uri(uri: &str) -> CitizenResult<Self> {
        let data = decode_data_uri(uri)?;
        Self::parse(data.text()?)
    }

    /// The embedded SVG that lists the trait images.
    pub fn image_data_svg(&self) -> CitizenResult<DataUri> {
        let uri = self
            .image_data
            .as_deref()
            .ok_or_else(|| CitizenError::metadata("metadata has no image_data"))?;
        decode_data_uri(uri)
    }

    pub fn image_resource(&self) -> CitizenResult<DataUri> {
        let uri = self
            .image
            .as_deref()
            .ok_or_else(|| CitizenError::metadata("metadata has no image"))?;
        decode_data_uri(uri)
    }

    pub fn attribute(&self, trait_type: &str) -> Option<&serde_json::Value> {
        self.attributes
            .iter()
            .find(|a| a.trait_type.eq_ignore_ascii_case(trait_type))
            .map(|a| &a.value)
    }
}
