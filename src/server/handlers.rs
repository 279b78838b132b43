use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::{
    chain::PartKind,
    foundation::{
        core::{Season, Size},
        error::CitizenError,
    },
    metadata::DataUri,
    request::{RenderQuery, RenderRequest},
    server::{AppState, error::ApiError},
    service,
};

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> Result<u64, CitizenError> {
    raw.parse::<u64>()
        .map_err(|e| CitizenError::validation(format!("invalid id '{raw}': {e}")))
}

fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

fn data_response(data: DataUri) -> Response {
    ([(header::CONTENT_TYPE, data.content_type)], data.bytes).into_response()
}

/// GET /healthcheck
pub async fn healthcheck() -> &'static str {
    "OK"
}

/// GET /{season}/{dimensions}/{id}
pub async fn render(
    State(state): State<AppState>,
    Path((season, dimensions, id)): Path<(String, String, String)>,
    Query(query): Query<RenderQuery>,
) -> ApiResult<Response> {
    let req = RenderRequest::from_parts(&season, &dimensions, &id, &query)?;
    let png = state.service.render(&req).await?;
    Ok(png_response(png.bytes))
}

/// GET /{season}/{id}/teardown
pub async fn teardown(
    State(state): State<AppState>,
    Path((season, id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let season: Season = season.parse()?;
    let id = parse_id(&id)?;
    let map = state
        .service
        .teardown(season, id)
        .await
        .map_err(|e| ApiError::with_chain_status(e, StatusCode::NOT_FOUND))?;
    Ok(Json(map).into_response())
}

async fn part_inner(
    state: &AppState,
    season: &str,
    part: &str,
    id: &str,
    rasterize: bool,
) -> ApiResult<Response> {
    let season: Season = season.parse()?;
    let kind: PartKind = part.parse()?;
    let id = parse_id(id)?;
    let data = if rasterize {
        state.service.part_render(season, kind, id).await
    } else {
        state.service.part_image(season, kind, id).await
    }
    .map_err(|e| ApiError::with_chain_status(e, StatusCode::INTERNAL_SERVER_ERROR))?;
    info!(%season, %kind, id, content_type = %data.content_type, "part served");
    Ok(data_response(data))
}

/// GET /{season}/parts/{part}/{id}
pub async fn part(
    State(state): State<AppState>,
    Path((season, part, id)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    part_inner(&state, &season, &part, &id, false).await
}

/// GET /{season}/parts/{part}/{id}/render
pub async fn part_render(
    State(state): State<AppState>,
    Path((season, part, id)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    part_inner(&state, &season, &part, &id, true).await
}

#[derive(Debug, serde::Deserialize)]
pub struct UpscaleQuery {
    #[serde(default)]
    pub size: String,
}

/// POST /upscale?size=WxH
pub async fn upscale(Query(q): Query<UpscaleQuery>, body: Bytes) -> ApiResult<Response> {
    let size: Size = q.size.parse()?;
    let png = service::upscale(body.to_vec(), size)
        .await
        .map_err(|e| match e {
            CitizenError::Decode(_) => ApiError::new(StatusCode::BAD_REQUEST, e.to_string()),
            other => ApiError::from(other),
        })?;
    Ok(png_response(png))
}
