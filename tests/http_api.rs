//! HTTP surface: start the router on an ephemeral port and drive it with reqwest.

mod common;

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::{file_service, MockLedger, MockRecord, MockStorage, OWNER};
use goldfish::transport;
use serde_json::{json, Value};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    _handle: tokio::task::JoinHandle<()>,
}

async fn start(ledger: Arc<MockLedger>, storage: Arc<MockStorage>) -> TestServer {
    let files = Arc::new(file_service(ledger, storage));
    let app = transport::http::create_router(transport::http::AppState { files });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        _handle: handle,
    }
}

impl TestServer {
    async fn get(&self, path: &str) -> (u16, Value) {
        let resp = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    async fn call_tool(&self, body: Value) -> (u16, Value) {
        let resp = self
            .client
            .post(format!("{}/api/tools/call", self.base_url))
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }
}

#[tokio::test]
async fn health_and_tool_listing() {
    let server = start(Arc::new(MockLedger::new(OWNER)), Arc::new(MockStorage::new())).await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = server.get("/api/tools").await;
    assert_eq!(status, 200);
    let tool = &body["data"]["tools"][0];
    assert_eq!(tool["name"], "upload_goldfish_file");
    assert_eq!(tool["inputSchema"]["required"], json!(["filename", "content_base64"]));
}

#[tokio::test]
async fn upload_list_read_download_delete() {
    let ledger = Arc::new(MockLedger::new(OWNER));
    let storage = Arc::new(MockStorage::new());
    let server = start(ledger, storage).await;

    let content = br#"{"hello": "goldfish"}"#;
    let (status, body) = server
        .call_tool(json!({
            "name": "upload_goldfish_file",
            "arguments": {
                "filename": "hello.json",
                "content_base64": BASE64.encode(content),
            }
        }))
        .await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], true);
    let blob_id = body["data"]["blob_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["filename"], "hello.json");
    assert_eq!(body["data"]["storage_epochs"], 3);
    assert!(body["data"]["sui_registry_update_digest"].is_string());

    // listing
    let (_, body) = server.get("/api/files").await;
    let files = body["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["blob_id"], blob_id.as_str());
    assert_eq!(files[0]["file_type"]["mime_type"], "application/json");
    assert_eq!(files[0]["file_type"]["category"], "json");
    assert_eq!(files[0]["formatted_size"], format!("{} Bytes", content.len()));

    let (_, body) = server.get("/api/resources").await;
    let uri = format!("goldfish://blob/{}", blob_id);
    assert_eq!(body["data"]["resources"][0]["uri"], uri.as_str());

    // reading both parts
    let (status, body) = server
        .get(&format!("/api/resources/read?uri={}", uri))
        .await;
    assert_eq!(status, 200);
    let contents = body["data"]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0]["uri"], format!("{}?type=metadata", uri));
    assert_eq!(contents[0]["mimeType"], "application/json");
    assert_eq!(contents[1]["mimeType"], "application/json");
    assert_eq!(contents[1]["text"], std::str::from_utf8(content).unwrap());

    // content part only
    let (_, body) = server
        .get(&format!("/api/resources/read?uri={}%3Ftype%3Dcontent", uri))
        .await;
    assert_eq!(body["data"]["contents"].as_array().unwrap().len(), 1);

    // download
    let resp = server
        .client
        .get(format!("{}/api/files/{}/download", server.base_url, blob_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "application/json");
    assert_eq!(
        resp.headers()["content-disposition"],
        format!("attachment; filename=\"{}.json\"", blob_id).as_str()
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), content);

    // delete, then the refetched view is empty
    let resp = server
        .client
        .delete(format!("{}/api/files/{}", server.base_url, blob_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = server
        .client
        .post(format!("{}/api/files/refetch", server.base_url))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["ids"], json!([]));
}

#[tokio::test]
async fn binary_content_is_returned_as_base64() {
    let ledger = Arc::new(
        MockLedger::new(OWNER).with_records(vec![MockRecord::new("k1", OWNER, &["png-blob"])]),
    );
    let storage = Arc::new(MockStorage::new());
    let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0xFF];
    storage.store("png-blob", &png);
    let server = start(ledger, storage).await;

    let (_, body) = server
        .get("/api/resources/read?uri=goldfish://blob/png-blob%3Ftype%3Dcontent")
        .await;
    let part = &body["data"]["contents"][0];
    assert_eq!(part["mimeType"], "image/png");
    assert!(part.get("text").is_none());
    assert_eq!(part["blob"], BASE64.encode(png));
}

#[tokio::test]
async fn not_certified_blob_reads_as_info_message() {
    let server = start(Arc::new(MockLedger::new(OWNER)), Arc::new(MockStorage::new())).await;

    let (status, body) = server
        .get("/api/resources/read?uri=goldfish://blob/unknown")
        .await;
    assert_eq!(status, 200);
    let text = body["data"]["contents"][0]["text"].as_str().unwrap();
    let info: Value = serde_json::from_str(text).unwrap();
    assert_eq!(info["error"], "BlobNotCertifiedError");
    assert_eq!(
        info["message"],
        "Blob is not certified yet. Please wait for certification."
    );

    let resp = server
        .client
        .get(format!("{}/api/files/unknown/download", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn bad_requests_are_rejected() {
    let server = start(Arc::new(MockLedger::new(OWNER)), Arc::new(MockStorage::new())).await;

    let (status, body) = server
        .call_tool(json!({ "name": "format_disk", "arguments": {} }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Unknown tool: format_disk");

    let (status, _) = server
        .call_tool(json!({
            "name": "upload_goldfish_file",
            "arguments": { "filename": "x", "content_base64": "***" }
        }))
        .await;
    assert_eq!(status, 400);

    let (status, _) = server
        .call_tool(json!({
            "name": "upload_goldfish_file",
            "arguments": { "filename": "x" }
        }))
        .await;
    assert_eq!(status, 400);

    let (status, body) = server.get("/api/resources/read?uri=walrus://blob/x").await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn failing_upload_maps_to_error_response() {
    let ledger = Arc::new(MockLedger::new(OWNER));
    ledger
        .fail_register
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let server = start(ledger, Arc::new(MockStorage::new())).await;

    let (status, body) = server
        .call_tool(json!({
            "name": "upload_goldfish_file",
            "arguments": { "filename": "a.txt", "content_base64": BASE64.encode(b"abc") }
        }))
        .await;
    assert_eq!(status, 500);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Error: Failed to register blob on Sui"));
}
