//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::config::{MAX_THUMBNAIL_BYTES, MAX_VIDEO_BYTES, VIDEO_MP4};
use common::error::AppError;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, auth_middleware},
    state::AppState,
};

// Room for multipart framing on top of the payload caps.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/videos/:id/upload",
            post(upload_video)
                .layer(DefaultBodyLimit::max(MAX_VIDEO_BYTES as usize + MULTIPART_OVERHEAD)),
        )
        .route(
            "/videos/:id/thumbnail",
            post(upload_thumbnail)
                .layer(DefaultBodyLimit::max(MAX_THUMBNAIL_BYTES as usize + MULTIPART_OVERHEAD)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/videos/:id", get(get_video))
        .route("/videos/:id/thumbnail", get(get_thumbnail))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

/// Get a video record by ID
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .videos
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(record))
}

/// Upload a video file and run it through the ingestion pipeline
///
/// Ownership and the declared media type are checked before any temporary
/// file is created; the body is streamed to local staging with the 1 GiB
/// cap enforced as bytes arrive, not after buffering.
pub async fn upload_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .videos
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if record.user_id != user.id {
        return Err(AppError::Forbidden.into());
    }

    let mut outcome = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("video") {
            continue;
        }

        let content_type = field
            .content_type()
            .ok_or_else(|| AppError::BadRequest("video part has no content type".to_string()))?
            .to_string();

        if content_type != VIDEO_MP4 {
            return Err(AppError::BadRequest(format!(
                "unsupported media type: {}",
                content_type
            ))
            .into());
        }

        let mut staged = state.pipeline.begin_staging(id, MAX_VIDEO_BYTES).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("upload interrupted: {}", e)))?
        {
            staged.write_chunk(&chunk).await?;
        }
        staged.finish().await?;

        outcome = Some((staged, content_type));
        break;
    }

    let (staged, content_type) = outcome
        .ok_or_else(|| AppError::BadRequest("missing video file field".to_string()))?;

    tracing::info!(video_id = %id, user_id = %user.id, bytes = staged.len(), "video staged");

    let updated = state.pipeline.ingest(record, &content_type, staged).await?;

    Ok(Json(updated))
}

/// Upload a thumbnail image for a video
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut record = state
        .videos
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    if record.user_id != user.id {
        return Err(AppError::Forbidden.into());
    }

    let mut outcome = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("thumbnail") {
            continue;
        }

        let media_type = field
            .content_type()
            .ok_or_else(|| AppError::BadRequest("thumbnail part has no content type".to_string()))?
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("upload interrupted: {}", e)))?
        {
            if bytes.len() as u64 + chunk.len() as u64 > MAX_THUMBNAIL_BYTES {
                return Err(AppError::BadRequest(format!(
                    "thumbnail exceeds the {} byte limit",
                    MAX_THUMBNAIL_BYTES
                ))
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        outcome = Some((bytes, media_type));
        break;
    }

    let (bytes, media_type) = outcome
        .ok_or_else(|| AppError::BadRequest("missing thumbnail file field".to_string()))?;

    let url = state.thumbnails.put(id, bytes, &media_type).await?;

    record.thumbnail_url = Some(url);
    state.videos.update(&record).await?;

    Ok(Json(record))
}

/// Serve a video's thumbnail
pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let thumbnail = state
        .thumbnails
        .get(id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((
        [(header::CONTENT_TYPE, thumbnail.media_type)],
        thumbnail.bytes,
    ))
}
