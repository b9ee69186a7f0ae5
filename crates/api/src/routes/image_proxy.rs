use axum::{
    body::Body,
    extract::{Query, State},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::Response,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::image_proxy::ProxyError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImageProxyParams {
    pub url: Option<String>,
}

/// `GET /image-proxy?url=<https url>`: fetch a whitelisted remote image and
/// stream it back with the upstream status and content type.
pub async fn image_proxy(
    State(state): State<AppState>,
    Query(params): Query<ImageProxyParams>,
) -> Result<Response, AppError> {
    let raw = params.url.ok_or(ProxyError::MissingUrl)?;
    let url = state.image_proxy().validate(&raw).map_err(|e| {
        tracing::warn!(url = %raw, "image proxy refused: {e}");
        e
    })?;

    tracing::debug!(%url, "proxying image");
    let upstream = state.image_proxy().fetch(url).await?;

    let mut response = Response::builder()
        .status(upstream.status())
        .header(CACHE_CONTROL, "public, max-age=86400");
    if let Some(content_type) = upstream.headers().get(CONTENT_TYPE) {
        response = response.header(CONTENT_TYPE, content_type.clone());
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| AppError::Internal(format!("Failed to build proxy response: {e}")))
}
