use crate::transport::http::types::{
    json_422, ApiResponse, AppState, ToolCallRequest, ToolDefinition, UploadFileArgs, UploadResult,
    UPLOAD_TOOL_NAME,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use tracing::{error, info};

pub fn upload_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: UPLOAD_TOOL_NAME.to_string(),
        description: "Upload a single file to Goldfish storage for the configured wallet address."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "filename": {
                    "type": "string",
                    "description": "Name of the file being uploaded"
                },
                "content_base64": {
                    "type": "string",
                    "description": "Base64 encoded content of the file"
                },
                "storage_epochs": {
                    "type": "number",
                    "description": "Number of epochs to store the file (default: 3)"
                }
            },
            "required": ["filename", "content_base64"]
        }),
    }
}

#[utoipa::path(
    get,
    path = "/api/tools",
    responses(
        (status = 200, description = "Available tools", body = ApiResponse)
    )
)]
pub async fn list_tools_handler() -> impl IntoResponse {
    Json(ApiResponse::ok(json!({ "tools": [upload_tool_definition()] })))
}

#[utoipa::path(
    post,
    path = "/api/tools/call",
    request_body = ToolCallRequest,
    responses(
        (status = 200, description = "Tool executed", body = ApiResponse),
        (status = 400, description = "Unknown tool or invalid arguments", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Tool failed", body = ApiResponse),
        (status = 503, description = "Recoverable storage error, retry", body = ApiResponse)
    )
)]
pub async fn call_tool_handler(
    State(state): State<AppState>,
    request: Result<Json<ToolCallRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"name\": string, \"arguments\": object}").into_response();
        }
    };
    info!(tool = %request.name, "tool called");

    if request.name != UPLOAD_TOOL_NAME {
        error!(tool = %request.name, "unknown tool");
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err(format!("Unknown tool: {}", request.name))),
        )
            .into_response();
    }

    let args: UploadFileArgs = match serde_json::from_value(request.arguments) {
        Ok(a) => a,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(format!(
                    "Invalid arguments for {}: {}",
                    UPLOAD_TOOL_NAME, e
                ))),
            )
                .into_response();
        }
    };
    if args.storage_epochs == Some(0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("storage_epochs must be at least 1")),
        )
            .into_response();
    }
    let content = match BASE64.decode(args.content_base64.trim()) {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(format!("content_base64 is not valid base64: {}", e))),
            )
                .into_response();
        }
    };

    info!(filename = %args.filename, size = content.len(), "processing upload");
    match state.files.upload(content, args.storage_epochs).await {
        Ok(receipt) => {
            info!(filename = %args.filename, blob_id = %receipt.blob_id, "successfully uploaded");
            let result = UploadResult {
                filename: args.filename,
                blob_id: receipt.blob_id,
                blob_object_id: receipt.blob_object_id,
                size: receipt.size,
                storage_epochs: receipt.storage_epochs,
                metadata: receipt.metadata,
                register_digest: receipt.register_digest,
                certify_digest: receipt.certify_digest,
                sui_registry_update_digest: receipt.registry_digest,
            };
            (StatusCode::OK, Json(ApiResponse::ok(json!(result)))).into_response()
        }
        Err(e) => {
            let status = if e.is_retryable() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(ApiResponse::err(e.user_message()))).into_response()
        }
    }
}
