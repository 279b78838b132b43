//! Trait image extraction from the token's `image_data` SVG.

use std::collections::BTreeMap;

use reqwest::Url;

use crate::{
    compose::LayerKind,
    foundation::error::{CitizenError, CitizenResult},
};

/// One `<image>` child of the root `<svg>`, in draw order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TraitRef {
    pub href: String,
    /// Path segment naming the trait category (`body`, `hand`, ...). Empty
    /// when the href has no such segment.
    pub part: String,
}

impl TraitRef {
    pub fn new(href: impl Into<String>) -> Self {
        let href = href.into();
        let part = part_of(&href).unwrap_or_default();
        Self { href, part }
    }

    pub fn kind(&self) -> LayerKind {
        LayerKind::from_part(&self.part)
    }
}

/// `/ipfs/<cid>/<part>/...` -> `<part>`.
fn part_of(href: &str) -> Option<String> {
    let url = Url::parse(href).ok()?;
    url.path()
        .split('/')
        .nth(3)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Collect every `<image>` that is a direct child of the root `<svg>`.
///
/// Both `href` and `xlink:href` are accepted; images without either are
/// skipped.
pub fn collect_trait_refs(svg: &[u8]) -> CitizenResult<Vec<TraitRef>> {
    let text = std::str::from_utf8(svg)
        .map_err(|e| CitizenError::metadata(format!("svg is not utf-8: {e}")))?;
    let doc = roxmltree::Document::parse(text)
        .map_err(|e| CitizenError::metadata(format!("parse svg: {e}")))?;

    let root = doc.root_element();
    if root.tag_name().name() != "svg" {
        return Err(CitizenError::metadata(format!(
            "expected <svg> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let refs = root
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "image")
        .filter_map(|n| {
            n.attributes()
                .find(|a| a.name() == "href")
                .map(|a| TraitRef::new(a.value()))
        })
        .collect();
    Ok(refs)
}

/// Part name -> href. A later image with the same part replaces an earlier
/// one.
pub fn teardown_map(refs: &[TraitRef]) -> BTreeMap<String, String> {
    refs.iter()
        .map(|r| (r.part.clone(), r.href.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="1200" height="1200">
  <image href="https://neotokyo.mypinata.cloud/ipfs/QmA/background/3.png"/>
  <image xlink:href="https://neotokyo.mypinata.cloud/ipfs/QmA/body/0.png"/>
  <g><image href="https://neotokyo.mypinata.cloud/ipfs/QmA/nested/1.png"/></g>
  <image href="https://neotokyo.mypinata.cloud/ipfs/QmA/helm/12.png"/>
  <image/>
</svg>"#;

    #[test]
    fn collects_direct_children_in_order() {
        let refs = collect_trait_refs(SVG.as_bytes()).unwrap();
        let parts: Vec<&str> = refs.iter().map(|r| r.part.as_str()).collect();
        assert_eq!(parts, vec!["background", "body", "helm"]);
        assert_eq!(refs[1].kind(), LayerKind::Body);
        assert_eq!(refs[2].kind(), LayerKind::Helmet);
    }

    #[test]
    fn teardown_maps_part_to_href() {
        let refs = collect_trait_refs(SVG.as_bytes()).unwrap();
        let map = teardown_map(&refs);
        assert_eq!(
            map.get("body").map(String::as_str),
            Some("https://neotokyo.mypinata.cloud/ipfs/QmA/body/0.png")
        );
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn non_svg_root_is_rejected() {
        assert!(collect_trait_refs(b"<html/>").is_err());
        assert!(collect_trait_refs(b"<svg").is_err());
    }

    #[test]
    fn short_paths_have_empty_part() {
        assert_eq!(TraitRef::new("https://host/a.png").part, "");
        assert_eq!(TraitRef::new("not a url").part, "");
    }
}
