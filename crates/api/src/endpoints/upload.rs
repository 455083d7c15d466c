//! Upload endpoints.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    routing::post,
};
use goty_common::{AppError, AppResult};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request body ceiling for a given file-size limit. Twice the file limit,
/// so oversized files reach the policy check.
fn body_limit(max_file_size: u64) -> usize {
    usize::try_from(max_file_size.saturating_mul(2)).unwrap_or(usize::MAX)
}

/// Uploaded file response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Upload a game cover image via multipart field `file`.
async fn upload_cover(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?.to_vec();

        file = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing file field".to_string()))?;

    let uploaded = state
        .upload_service
        .upload_cover(&user.id, &file_name, &content_type, &data)
        .await?;

    Ok(ApiResponse::ok(UploadResponse {
        key: uploaded.key,
        url: uploaded.url,
        size: uploaded.size,
        content_type: uploaded.content_type,
    }))
}

/// `/upload` routes, accepting files up to `max_file_size` bytes.
pub fn router(max_file_size: u64) -> Router<AppState> {
    Router::new()
        .route("/cover", post(upload_cover))
        .layer(DefaultBodyLimit::max(body_limit(max_file_size)))
}
