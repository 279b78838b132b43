#![allow(dead_code)]

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use base64::Engine as _;
use image::{Rgba, RgbaImage};

use citizen_gen::{
    CitizenError, CitizenResult, CitizenService, OverlayAssets, Renderer,
    cache::DiskCache,
    chain::{Address, CitizenContracts, SeasonContracts, TokenSource},
    codec::encode_png,
    fetch::ByteFetcher,
    parts::SvgRasterizer,
};

pub const GW: &str = "https://neotokyo.mypinata.cloud/ipfs/QmTest";

pub fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn contracts() -> CitizenContracts {
    CitizenContracts {
        season_one: SeasonContracts {
            legacy: Address([1; 20]),
            current: Address([2; 20]),
        },
        season_two: SeasonContracts {
            legacy: Address([3; 20]),
            current: Address([4; 20]),
        },
    }
}

#[derive(Default)]
pub struct FakeChain {
    pub uris: HashMap<(Address, u64), String>,
}

#[async_trait]
impl TokenSource for FakeChain {
    async fn token_uri(&self, contract: Address, id: u64) -> CitizenResult<String> {
        self.uris
            .get(&(contract, id))
            .cloned()
            .ok_or_else(|| CitizenError::chain(format!("execution reverted: {contract} #{id}")))
    }
}

#[derive(Default)]
pub struct FakeIpfs {
    pub files: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl ByteFetcher for FakeIpfs {
    async fn fetch(&self, url: &str) -> CitizenResult<Vec<u8>> {
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| CitizenError::fetch(format!("404 {url}")))
    }
}

pub fn citizen_token_uri(parts: &[&str]) -> String {
    let images: String = parts
        .iter()
        .map(|p| format!(r#"<image href="{GW}/{p}"/>"#))
        .collect();
    let svg = format!(r#"<svg xmlns="http://www.w3.org/2000/svg">{images}</svg>"#);
    let json = serde_json::json!({
        "name": "Citizen",
        "image_data": format!("data:image/svg+xml;base64,{}", b64(svg.as_bytes())),
    });
    format!(
        "data:application/json;base64,{}",
        b64(json.to_string().as_bytes())
    )
}

pub fn full_png(c: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(1200, 1200, Rgba(c))).expect("encode")
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("citizen-gen-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

/// Season one citizen #7 (on the current contract) with a red background and
/// a blue body; season two citizen #9 only on the legacy contract.
pub fn fixture_service(cache_root: PathBuf) -> CitizenService {
    let mut chain = FakeChain::default();
    chain.uris.insert(
        (Address([2; 20]), 7),
        citizen_token_uri(&["background/1.png", "body/1.png"]),
    );
    chain.uris.insert(
        (Address([3; 20]), 9),
        citizen_token_uri(&["background/1.png", "missing/1.png"]),
    );

    let mut ipfs = FakeIpfs::default();
    ipfs.files
        .insert(format!("{GW}/background/1.png"), full_png([255, 0, 0, 255]));
    ipfs.files
        .insert(format!("{GW}/body/1.png"), full_png([0, 0, 255, 255]));

    CitizenService::new(
        Renderer::new(Arc::new(OverlayAssets::empty())),
        Arc::new(chain),
        Arc::new(ipfs),
        contracts(),
        DiskCache::new(cache_root),
        SvgRasterizer::with_fonts(None),
    )
}
