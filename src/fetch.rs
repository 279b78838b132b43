//! Trait image download and decode.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::{
    codec::{DEFAULT_MAX_PIXELS, decode_raster},
    compose::{FetchedLayer, LayerRole},
    foundation::{
        core::Season,
        error::{CitizenError, CitizenResult},
    },
    metadata::{TraitRef, decode_data_uri},
    variant::female_variant,
};

#[async_trait]
pub trait ByteFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> CitizenResult<Vec<u8>>;
}

/// Plain HTTP GET; `data:` URIs are decoded locally.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> CitizenResult<Vec<u8>> {
        if url.starts_with("data:") {
            return Ok(decode_data_uri(url)?.bytes);
        }
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CitizenError::fetch(format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CitizenError::fetch(format!("GET {url}: status {status}")));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CitizenError::fetch(format!("read {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    pub season: Season,
    pub female_variant: bool,
    pub max_pixels: u64,
}

impl FetchOptions {
    pub fn new(season: Season) -> Self {
        Self {
            season,
            female_variant: false,
            max_pixels: DEFAULT_MAX_PIXELS,
        }
    }

    pub fn female(mut self, on: bool) -> Self {
        self.female_variant = on;
        self
    }
}

async fn fetch_one(
    fetcher: &dyn ByteFetcher,
    idx: usize,
    trait_ref: &TraitRef,
    opts: FetchOptions,
) -> CitizenResult<FetchedLayer> {
    let url = if opts.female_variant {
        female_variant(&trait_ref.href, opts.season)
    } else {
        trait_ref.href.clone()
    };

    let bytes = fetcher.fetch(&url).await?;
    let max_pixels = opts.max_pixels;
    let image = tokio::task::spawn_blocking(move || decode_raster(&bytes, max_pixels))
        .await
        .map_err(|e| CitizenError::Other(e.into()))??;

    debug!(idx, part = %trait_ref.part, %url, w = image.width(), h = image.height(), "layer fetched");
    let layer = FetchedLayer::new(image, url, trait_ref.kind());
    Ok(if idx == 0 {
        layer.with_role(LayerRole::Background)
    } else {
        layer
    })
}

/// Fetch and decode every trait concurrently, keeping draw order.
///
/// The first trait of a token is its background. Layers that fail to fetch
/// or decode are skipped with a warning; the rest still render.
pub async fn fetch_layers(
    fetcher: &dyn ByteFetcher,
    refs: &[TraitRef],
    opts: FetchOptions,
) -> Vec<FetchedLayer> {
    let results = join_all(
        refs.iter()
            .enumerate()
            .map(|(idx, r)| fetch_one(fetcher, idx, r, opts)),
    )
    .await;

    results
        .into_iter()
        .zip(refs)
        .filter_map(|(res, r)| match res {
            Ok(layer) => Some(layer),
            Err(err) => {
                warn!(href = %r.href, error = %err, "skipping layer");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::{codec::encode_png, compose::LayerKind};

    struct MapFetcher(HashMap<String, Vec<u8>>);

    #[async_trait]
    impl ByteFetcher for MapFetcher {
        async fn fetch(&self, url: &str) -> CitizenResult<Vec<u8>> {
            self.0
                .get(url)
                .cloned()
                .ok_or_else(|| CitizenError::fetch(format!("404 {url}")))
        }
    }

    fn png(c: [u8; 4]) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(2, 2, Rgba(c))).unwrap()
    }

    const GW: &str = "https://neotokyo.mypinata.cloud/ipfs/QmA";

    #[tokio::test]
    async fn keeps_order_and_tags_layers() {
        let urls = [
            format!("{GW}/background/1.png"),
            format!("{GW}/body/2.png"),
            format!("{GW}/helm/3.png"),
        ];
        let mut map = HashMap::new();
        for (i, u) in urls.iter().enumerate() {
            map.insert(u.clone(), png([i as u8, 0, 0, 255]));
        }
        let refs: Vec<TraitRef> = urls.iter().map(TraitRef::new).collect();

        let layers = fetch_layers(&MapFetcher(map), &refs, FetchOptions::new(Season::ONE)).await;
        assert_eq!(layers.len(), 3);
        assert!(layers[0].is_background());
        assert_eq!(layers[1].kind, LayerKind::Body);
        assert_eq!(layers[2].kind, LayerKind::Helmet);
        assert_eq!(layers[2].image.get_pixel(0, 0).0, [2, 0, 0, 255]);
    }

    #[tokio::test]
    async fn failed_layers_are_skipped() {
        let ok = format!("{GW}/body/2.png");
        let mut map = HashMap::new();
        map.insert(ok.clone(), png([1, 1, 1, 255]));
        map.insert(format!("{GW}/cloth/1.png"), b"garbage".to_vec());
        let refs = vec![
            TraitRef::new(format!("{GW}/background/1.png")),
            TraitRef::new(ok),
            TraitRef::new(format!("{GW}/cloth/1.png")),
        ];

        let layers = fetch_layers(&MapFetcher(map), &refs, FetchOptions::new(Season::ONE)).await;
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].kind, LayerKind::Body);
        assert!(!layers[0].is_background());
    }

    #[tokio::test]
    async fn data_uris_need_no_network() {
        use base64::Engine as _;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png([5, 5, 5, 255]));
        let uri = format!("data:image/png;base64,{b64}");
        let bytes = HttpFetcher::default().fetch(&uri).await.unwrap();
        assert_eq!(bytes, png([5, 5, 5, 255]));
    }
}
