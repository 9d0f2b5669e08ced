use super::{error::ApiError, AppState};
use crate::media::{DownloadedFile, MediaError, TikTokInfo, VideoInfo};
use crate::utils::{attachment_disposition, content_type_for};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(alias = "videoUrl")]
    url: Option<String>,
}

fn requested_url(payload: Result<Json<UrlRequest>, JsonRejection>) -> Result<String, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::bad_request("No URL provided")
    })?;

    request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| MediaError::MissingUrl.into())
}

/// Streams a downloaded file as an attachment. The download directory is
/// removed when the body is dropped, whether or not it was fully sent.
async fn file_response(file: DownloadedFile) -> Result<Response, ApiError> {
    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(MediaError::from)?;
    let length = handle.metadata().await.map_err(MediaError::from)?.len();
    info!("Streaming {} ({} bytes) from {}", file.filename, length, file.dir().display());

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&file.filename)),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&attachment_disposition(&file.filename))
            .map_err(|_| ApiError::bad_request("Invalid download filename"))?,
    );

    let guard = file.into_guard();
    let stream = ReaderStream::new(handle).map(move |chunk| {
        let _guard = &guard;
        chunk
    });

    Ok((headers, Body::from_stream(stream)).into_response())
}

pub async fn video_info_handler(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<VideoInfo>, ApiError> {
    let url = requested_url(payload)?;
    let info = state.media.fetch_metadata(&url).await?;
    Ok(Json(info))
}

pub async fn download_handler(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let url = requested_url(payload)?;
    let file = state.media.download(&url).await?;
    file_response(file).await
}

pub async fn tiktok_info_handler(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<TikTokInfo>, ApiError> {
    let url = requested_url(payload)?;
    let info = state.media.tiktok_info(&url).await?;
    Ok(Json(info))
}

pub async fn tiktok_download_handler(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let url = requested_url(payload)?;
    let file = state.media.tiktok_download(&url).await?;
    file_response(file).await
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    engine: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Reports whether the extraction engine can be run.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let engine = state.media.engine_name();

    match state.media.test_setup().await {
        Ok(version) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                engine,
                version: Some(version),
                error: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                engine,
                version: None,
                error: Some(e.to_string()),
            }),
        ),
    }
}
