//! Request-level orchestration: token lookup, trait fetch, render, cache.

use std::{collections::BTreeMap, sync::Arc};

use tracing::{info, warn};

use crate::{
    cache::DiskCache,
    chain::{CitizenContracts, PartKind, TokenSource, part_contracts, token_uri_with_fallback},
    codec::{DEFAULT_MAX_PIXELS, decode_raster, encode_png},
    compose::{Renderer, shape::resize_nearest},
    fetch::{ByteFetcher, FetchOptions, fetch_layers},
    foundation::{
        core::{Season, Size},
        error::{CitizenError, CitizenResult},
    },
    metadata::{DataUri, Metadata, TraitRef, teardown_map, trait_refs_from_token_uri},
    parts::{PART_RENDER_SCALE, SvgRasterizer},
    request::RenderRequest,
};

/// A rendered PNG and whether it came from the disk cache.
#[derive(Clone, Debug)]
pub struct RenderedPng {
    pub bytes: Vec<u8>,
    pub cached: bool,
}

#[derive(Clone)]
pub struct CitizenService {
    renderer: Renderer,
    tokens: Arc<dyn TokenSource>,
    fetcher: Arc<dyn ByteFetcher>,
    contracts: CitizenContracts,
    cache: DiskCache,
    rasterizer: SvgRasterizer,
}

impl CitizenService {
    pub fn new(
        renderer: Renderer,
        tokens: Arc<dyn TokenSource>,
        fetcher: Arc<dyn ByteFetcher>,
        contracts: CitizenContracts,
        cache: DiskCache,
        rasterizer: SvgRasterizer,
    ) -> Self {
        Self {
            renderer,
            tokens,
            fetcher,
            contracts,
            cache,
            rasterizer,
        }
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    async fn citizen_traits(&self, season: Season, id: u64) -> CitizenResult<Vec<TraitRef>> {
        let uri = self
            .contracts
            .resolve(self.tokens.as_ref(), season, id)
            .await?;
        trait_refs_from_token_uri(&uri)
    }

    /// Render a citizen, serving from and filling the disk cache.
    ///
    /// A failed cache write is logged and does not fail the request.
    #[tracing::instrument(skip_all, fields(season = %req.season, id = req.id))]
    pub async fn render(&self, req: &RenderRequest) -> CitizenResult<RenderedPng> {
        let key = req.cache_key();
        if let Some(bytes) = self.cache.get(&key).await {
            info!(%key, "served from cache");
            return Ok(RenderedPng {
                bytes,
                cached: true,
            });
        }

        let refs = self.citizen_traits(req.season, req.id).await?;
        let opts = FetchOptions::new(req.season).female(req.female);
        let layers = fetch_layers(self.fetcher.as_ref(), &refs, opts).await;
        if layers.len() < refs.len() {
            warn!(
                fetched = layers.len(),
                wanted = refs.len(),
                "rendering with missing layers"
            );
        }

        let renderer = self.renderer.clone();
        let flags = req.flags();
        let bytes = tokio::task::spawn_blocking(move || -> CitizenResult<Vec<u8>> {
            let img = renderer.render(&layers, &flags)?;
            encode_png(&img)
        })
        .await
        .map_err(|e| CitizenError::Other(e.into()))??;

        if let Err(err) = self.cache.put(&key, &bytes).await {
            warn!(%key, error = %err, "cache write failed");
        }
        info!(%key, bytes = bytes.len(), "rendered");
        Ok(RenderedPng {
            bytes,
            cached: false,
        })
    }

    /// Part name -> trait href for a citizen.
    pub async fn teardown(&self, season: Season, id: u64) -> CitizenResult<BTreeMap<String, String>> {
        let refs = self.citizen_traits(season, id).await?;
        Ok(teardown_map(&refs))
    }

    /// The decoded `image` of a part token (identity, item, vault, land).
    pub async fn part_image(&self, season: Season, kind: PartKind, id: u64) -> CitizenResult<DataUri> {
        let (current, legacy) = part_contracts(season, kind)?;
        let uri = token_uri_with_fallback(self.tokens.as_ref(), current, legacy, id).await?;
        Metadata::from_token_uri(&uri)?.image_resource()
    }

    /// Like [`Self::part_image`], with SVG images rasterized to PNG at 2x.
    /// Non-SVG images are returned as they are.
    pub async fn part_render(&self, season: Season, kind: PartKind, id: u64) -> CitizenResult<DataUri> {
        let image = self.part_image(season, kind, id).await?;
        if !image.is_svg() {
            return Ok(image);
        }
        let rasterizer = self.rasterizer.clone();
        let png = tokio::task::spawn_blocking(move || -> CitizenResult<Vec<u8>> {
            let img = rasterizer.rasterize(&image.bytes, PART_RENDER_SCALE)?;
            encode_png(&img)
        })
        .await
        .map_err(|e| CitizenError::Other(e.into()))??;
        Ok(DataUri {
            content_type: "image/png".to_string(),
            bytes: png,
        })
    }
}

/// Nearest-neighbour resize of an uploaded image to exactly `size`.
pub async fn upscale(bytes: Vec<u8>, size: Size) -> CitizenResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || -> CitizenResult<Vec<u8>> {
        let src = decode_raster(&bytes, DEFAULT_MAX_PIXELS)?;
        let out = resize_nearest(&src, size.width, size.height);
        encode_png(&out)
    })
    .await
    .map_err(|e| CitizenError::Other(e.into()))?
}
