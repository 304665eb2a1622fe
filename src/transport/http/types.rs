use crate::app::FileService;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

pub const URI_SCHEME: &str = "goldfish";
pub const UPLOAD_TOOL_NAME: &str = "upload_goldfish_file";

#[derive(Clone)]
pub struct AppState {
    pub files: Arc<FileService>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// A blob exposed as an addressable resource.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// `goldfish://blob/<blob_id>`
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// One part of a read resource. Exactly one of `text` / `blob` is set.
#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64 content for binary data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReadResourceQuery {
    /// `goldfish://blob/<blob_id>`, optionally with `?type=metadata|content`
    pub uri: String,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[schema(value_type = Object)]
    pub input_schema: JsonValue,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub arguments: JsonValue,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UploadFileArgs {
    /// Name of the file being uploaded (informational; not stored on-chain).
    pub filename: String,
    /// Base64 encoded content of the file.
    pub content_base64: String,
    /// Number of epochs to store the file (server default when omitted).
    #[serde(default)]
    pub storage_epochs: Option<u32>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct UploadResult {
    pub filename: String,
    pub blob_id: String,
    pub blob_object_id: String,
    pub size: u64,
    pub storage_epochs: u32,
    #[schema(value_type = Object)]
    pub metadata: JsonValue,
    pub register_digest: String,
    pub certify_digest: String,
    pub sui_registry_update_digest: String,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DeleteResult {
    pub blob_id: String,
    pub digest: String,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::err(format!(
            "Invalid JSON body: {} (expected: {})",
            err, expected
        ))),
    )
}
