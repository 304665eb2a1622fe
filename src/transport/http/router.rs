use crate::transport::http::handlers::{files, health, resources, tools};
use crate::transport::http::types::{
    ApiResponse, DeleteResult, ReadResourceQuery, ResourceContent, ResourceDescriptor,
    ToolCallRequest, ToolDefinition, UploadFileArgs, UploadResult,
};
use axum::routing::{delete, get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        resources::list_resources_handler,
        resources::read_resource_handler,
        tools::list_tools_handler,
        tools::call_tool_handler,
        files::list_files_handler,
        files::download_file_handler,
        files::delete_file_handler,
        files::refetch_files_handler
    ),
    components(schemas(
        ApiResponse,
        ResourceDescriptor,
        ResourceContent,
        ReadResourceQuery,
        ToolDefinition,
        ToolCallRequest,
        UploadFileArgs,
        UploadResult,
        DeleteResult
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/resources", get(resources::list_resources_handler))
        .route("/api/resources/read", get(resources::read_resource_handler))
        .route("/api/tools", get(tools::list_tools_handler))
        .route("/api/tools/call", post(tools::call_tool_handler))
        .route("/api/files", get(files::list_files_handler))
        .route("/api/files/refetch", post(files::refetch_files_handler))
        .route("/api/files/:blob_id", delete(files::delete_file_handler))
        .route("/api/files/:blob_id/download", get(files::download_file_handler))
        .with_state(app_state)
}
