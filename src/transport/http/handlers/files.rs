use crate::app::file_service::is_not_certified;
use crate::domain::blob::NOT_CERTIFIED_MESSAGE;
use crate::transport::http::types::{ApiResponse, AppState, DeleteResult};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::error;

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Files of the configured wallet with size and detected type", body = ApiResponse),
        (status = 502, description = "Registry scan failed", body = ApiResponse)
    )
)]
pub async fn list_files_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.files.list_files().await {
        Ok(files) => (
            StatusCode::OK,
            Json(ApiResponse::ok(json!({
                "wallet_address": state.files.wallet_address(),
                "files": files,
            }))),
        ),
        Err(e) => {
            error!(error = %e, "listing files failed");
            (StatusCode::BAD_GATEWAY, Json(ApiResponse::err(e.to_string())))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/files/{blob_id}/download",
    params(
        ("blob_id" = String, Path, description = "Blob id")
    ),
    responses(
        (status = 200, description = "Raw file bytes with detected content type"),
        (status = 404, description = "Blob not certified yet", body = ApiResponse),
        (status = 502, description = "Storage network failure", body = ApiResponse)
    )
)]
pub async fn download_file_handler(
    State(state): State<AppState>,
    Path(blob_id): Path<String>,
) -> impl IntoResponse {
    match state.files.download(&blob_id).await {
        Ok(download) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, download.content_type().to_string()),
                (header::CONTENT_DISPOSITION, download.content_disposition()),
            ],
            download.bytes,
        )
            .into_response(),
        Err(e) if is_not_certified(&e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(NOT_CERTIFIED_MESSAGE)),
        )
            .into_response(),
        Err(e) => {
            error!(%blob_id, error = %e, "download failed");
            (StatusCode::BAD_GATEWAY, Json(ApiResponse::err(e.to_string()))).into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/files/{blob_id}",
    params(
        ("blob_id" = String, Path, description = "Blob id to unlist")
    ),
    responses(
        (status = 200, description = "File id removed from the registry", body = ApiResponse),
        (status = 500, description = "Registry transaction failed", body = ApiResponse)
    )
)]
pub async fn delete_file_handler(
    State(state): State<AppState>,
    Path(blob_id): Path<String>,
) -> impl IntoResponse {
    match state.files.delete(&blob_id).await {
        Ok(digest) => (
            StatusCode::OK,
            Json(ApiResponse::ok(json!(DeleteResult { blob_id, digest }))),
        ),
        Err(e) => {
            error!(%blob_id, error = %e, "delete failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(format!("Error deleting file: {}", e))),
            )
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/files/refetch",
    responses(
        (status = 200, description = "Scan re-run; `error` is set when it failed", body = ApiResponse)
    )
)]
pub async fn refetch_files_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.files.file_ids().refetch().await;
    Json(ApiResponse {
        success: snapshot.error.is_none(),
        data: Some(json!({ "ids": snapshot.ids })),
        error: snapshot.error,
    })
}
