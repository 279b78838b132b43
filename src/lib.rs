#![forbid(unsafe_code)]

//! Citizen portrait renderer.
//!
//! Layers are fetched from the token's on-chain SVG, composited bottom to
//! top onto a 1200x1200 canvas, then cropped (portrait) or resized
//! (nearest-neighbour). The [`server`] module exposes the same pipeline over
//! HTTP.

pub mod cache;
pub mod chain;
pub mod codec;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod foundation;
pub mod metadata;
pub mod parts;
pub mod request;
pub mod server;
pub mod service;
pub mod variant;

pub use compose::{
    AnchorPolicy, CropAnchor, FetchedLayer, LayerKind, LayerRole, OverlayAssets, RenderFlags,
    Renderer, parse_background_color,
};
pub use foundation::core::{CANVAS_SIZE, PORTRAIT_SIZE, Season, Size};
pub use foundation::error::{CitizenError, CitizenResult};
pub use request::{Dimensions, RenderQuery, RenderRequest};
pub use service::CitizenService;
