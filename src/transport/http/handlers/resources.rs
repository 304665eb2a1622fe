use crate::app::file_service::is_not_certified;
use crate::domain::download::preview_text;
use crate::domain::file_type;
use crate::domain::blob::NOT_CERTIFIED_MESSAGE;
use crate::transport::http::types::{
    ApiResponse, AppState, ReadResourceQuery, ResourceContent, ResourceDescriptor, URI_SCHEME,
};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use tracing::{error, info, warn};

/// Which parts of a blob resource to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourcePart {
    All,
    Metadata,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    pub blob_id: String,
    pub part: ResourcePart,
}

pub fn resource_uri(blob_id: &str) -> String {
    format!("{}://blob/{}", URI_SCHEME, blob_id)
}

/// Parses `goldfish://blob/<id>[?type=metadata|content]`.
pub fn parse_resource_uri(uri: &str) -> Result<ResourceUri, String> {
    let invalid = || format!("Invalid Goldfish resource URI format: {}", uri);

    let rest = uri
        .strip_prefix(URI_SCHEME)
        .and_then(|r| r.strip_prefix("://blob/"))
        .ok_or_else(invalid)?;
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    let blob_id = path.split('/').next().unwrap_or_default();
    if blob_id.is_empty() {
        return Err(invalid());
    }

    let part = query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "type")
        .map(|(_, value)| match value {
            "metadata" => Ok(ResourcePart::Metadata),
            "content" => Ok(ResourcePart::Content),
            other => Err(format!("Unknown resource part '{}' in {}", other, uri)),
        })
        .transpose()?
        .unwrap_or(ResourcePart::All);

    Ok(ResourceUri {
        blob_id: blob_id.to_string(),
        part,
    })
}

#[utoipa::path(
    get,
    path = "/api/resources",
    responses(
        (status = 200, description = "Resources owned by the configured wallet", body = ApiResponse)
    )
)]
pub async fn list_resources_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!(wallet = state.files.wallet_address(), "listing resources");
    let ids = match state.files.list_file_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            // A failed scan lists nothing rather than failing the request.
            error!(error = %e, "failed to list resources");
            Vec::new()
        }
    };

    let resources: Vec<ResourceDescriptor> = ids
        .iter()
        .map(|blob_id| ResourceDescriptor {
            uri: resource_uri(blob_id),
            name: format!("Goldfish File {}...", blob_id.chars().take(8).collect::<String>()),
            description: format!("Stored file with Blob ID: {}", blob_id),
            mime_type: file_type::UNKNOWN.mime_type.to_string(),
        })
        .collect();

    (
        StatusCode::OK,
        Json(ApiResponse::ok(json!({ "resources": resources }))),
    )
}

#[utoipa::path(
    get,
    path = "/api/resources/read",
    params(ReadResourceQuery),
    responses(
        (status = 200, description = "Resource parts (metadata and/or content)", body = ApiResponse),
        (status = 400, description = "Malformed resource URI", body = ApiResponse),
        (status = 502, description = "Storage network failure", body = ApiResponse)
    )
)]
pub async fn read_resource_handler(
    State(state): State<AppState>,
    Query(query): Query<ReadResourceQuery>,
) -> impl IntoResponse {
    let parsed = match parse_resource_uri(&query.uri) {
        Ok(p) => p,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(ApiResponse::err(e))).into_response(),
    };
    let blob_id = parsed.blob_id.as_str();
    let base_uri = resource_uri(blob_id);
    let mut contents = Vec::new();

    if parsed.part != ResourcePart::Content {
        match state.files.blob_metadata(blob_id).await {
            Ok(metadata) => contents.push(ResourceContent {
                uri: format!("{}?type=metadata", base_uri),
                mime_type: "application/json".to_string(),
                text: Some(serde_json::to_string_pretty(&metadata).unwrap_or_default()),
                blob: None,
            }),
            Err(e) if is_not_certified(&e) => return not_certified(&query.uri),
            Err(e) => return storage_failure(&query.uri, e),
        }
    }

    if parsed.part != ResourcePart::Metadata {
        let result = state.files.fetch_blob(blob_id).await;
        let data = match (result.data, result.error) {
            (Some(data), _) => data,
            (None, _) if result.not_certified => return not_certified(&query.uri),
            (None, error) => {
                return storage_failure(&query.uri, error.unwrap_or_default());
            }
        };
        let detected = file_type::detect(&data);
        let (text, blob) = match std::str::from_utf8(&data) {
            Ok(_) => (Some(preview_text(&data)), None),
            Err(_) => (None, Some(BASE64.encode(&data))),
        };
        contents.push(ResourceContent {
            uri: format!("{}?type=content", base_uri),
            mime_type: detected.mime_type.to_string(),
            text,
            blob,
        });
    }

    (
        StatusCode::OK,
        Json(ApiResponse::ok(json!({ "contents": contents }))),
    )
        .into_response()
}

fn not_certified(uri: &str) -> axum::response::Response {
    warn!(uri, "resource not certified yet");
    let content = ResourceContent {
        uri: uri.to_string(),
        mime_type: "application/json".to_string(),
        text: Some(
            json!({
                "error": "BlobNotCertifiedError",
                "message": NOT_CERTIFIED_MESSAGE,
            })
            .to_string(),
        ),
        blob: None,
    };
    (
        StatusCode::OK,
        Json(ApiResponse::ok(json!({ "contents": [content] }))),
    )
        .into_response()
}

fn storage_failure(uri: &str, error: impl std::fmt::Display) -> axum::response::Response {
    error!(uri, error = %error, "failed to read resource");
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiResponse::err(format!(
            "Failed to read resource {}: {}",
            uri, error
        ))),
    )
        .into_response()
}
