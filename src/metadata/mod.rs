//! Token metadata: data URIs, the metadata JSON, and the trait SVG.

pub mod data_uri;
pub mod svg;
pub mod token;

pub use data_uri::{DataUri, decode_data_uri};
pub use svg::{TraitRef, collect_trait_refs, teardown_map};
pub use token::{Attribute, Metadata};

use crate::foundation::error::CitizenResult;

/// Token URI -> the ordered trait images it draws.
pub fn trait_refs_from_token_uri(uri: &str) -> CitizenResult<Vec<TraitRef>> {
    let metadata = Metadata::from_token_uri(uri)?;
    let svg = metadata.image_data_svg()?;
    collect_trait_refs(&svg.bytes)
}
