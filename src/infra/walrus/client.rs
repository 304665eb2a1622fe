// HTTP client for the Walrus storage network: encoding service, storage nodes and aggregator.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::future::{join_all, try_join_all};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::infra::config::WalrusConfig;
use crate::infra::sui::MoveCall;
use crate::infra::walrus::{
    BlobStatus, CertifyBlobParams, EncodedBlob, NodeSlivers, RegisterBlobParams, StorageConfirmation,
    StorageNetwork, WriteBlobParams,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const SYSTEM_MODULE: &str = "system";

pub struct WalrusHttpClient {
    http: reqwest::Client,
    config: WalrusConfig,
    /// Blob metadata never changes for a given blob id.
    metadata_cache: Mutex<HashMap<String, JsonValue>>,
}

/// Maps a non-success response to a storage error; 5xx is treated as transient.
async fn check_status(response: Response) -> StorageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    if status.is_server_error() {
        Err(StorageError::Retryable(format!("{}: {}", status, message)))
    } else {
        Err(StorageError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

impl WalrusHttpClient {
    pub fn new(config: WalrusConfig) -> StorageResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            config,
            metadata_cache: Mutex::new(HashMap::new()),
        })
    }

    fn package_id(&self) -> StorageResult<&str> {
        self.config
            .package_id
            .as_deref()
            .ok_or_else(|| StorageError::Config("WALRUS_PACKAGE_ID is not set".to_string()))
    }

    fn system_object_id(&self) -> StorageResult<&str> {
        self.config
            .system_object_id
            .as_deref()
            .ok_or_else(|| StorageError::Config("WALRUS_SYSTEM_OBJECT_ID is not set".to_string()))
    }

    fn node_url(&self, index: usize) -> StorageResult<&str> {
        self.config
            .storage_nodes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| {
                StorageError::Config(format!(
                    "storage node #{} is not configured ({} nodes in WALRUS_STORAGE_NODES)",
                    index,
                    self.config.storage_nodes.len()
                ))
            })
    }

    async fn write_to_node(
        &self,
        params: &WriteBlobParams,
        node: &NodeSlivers,
    ) -> StorageResult<StorageConfirmation> {
        let base = self.node_url(node.node_index)?;
        let blob_id = &params.blob_id;

        let into_node_error = |e: StorageError| match e {
            StorageError::Retryable(_) => e,
            other => StorageError::Node {
                node: base.to_string(),
                message: other.to_string(),
            },
        };

        let response = self
            .http
            .put(format!("{}/v1/blobs/{}/metadata", base, blob_id))
            .json(&params.metadata)
            .send()
            .await
            .map_err(StorageError::from)
            .map_err(into_node_error)?;
        check_status(response).await.map_err(into_node_error)?;

        for sliver in &node.slivers {
            let bytes = BASE64
                .decode(&sliver.data)
                .map_err(|e| StorageError::Decode(format!("sliver {} is not base64: {}", sliver.pair_index, e)))?;
            let response = self
                .http
                .put(format!(
                    "{}/v1/blobs/{}/slivers/{}/{}",
                    base,
                    blob_id,
                    sliver.pair_index,
                    sliver.kind.as_str()
                ))
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(bytes)
                .send()
                .await
                .map_err(StorageError::from)
                .map_err(into_node_error)?;
            check_status(response).await.map_err(into_node_error)?;
        }

        let kind = if params.deletable { "deletable" } else { "permanent" };
        let url = if params.deletable {
            format!("{}/v1/blobs/{}/confirmation/{}/{}", base, blob_id, kind, params.object_id)
        } else {
            format!("{}/v1/blobs/{}/confirmation/{}", base, blob_id, kind)
        };
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(StorageError::from)
            .map_err(into_node_error)?;
        let confirmation: JsonValue = check_status(response)
            .await
            .map_err(into_node_error)?
            .json()
            .await
            .map_err(|e| into_node_error(StorageError::Decode(e.to_string())))?;

        debug!(node = base, blob_id = %blob_id, "storage node confirmed blob");
        Ok(StorageConfirmation {
            node_index: node.node_index,
            confirmation,
        })
    }

    async fn node_status(&self, base: &str, blob_id: &str) -> StorageResult<BlobStatus> {
        let response = self
            .http
            .get(format!("{}/v1/blobs/{}/status", base, blob_id))
            .send()
            .await?;
        let body: JsonValue = check_status(response).await?.json().await?;
        BlobStatus::from_node_json(&body)
            .ok_or_else(|| StorageError::Decode(format!("unrecognized blob status from {}: {}", base, body)))
    }
}

#[async_trait]
impl StorageNetwork for WalrusHttpClient {
    async fn blob_type(&self) -> StorageResult<String> {
        Ok(format!("{}::blob::Blob", self.package_id()?))
    }

    async fn encode_blob(&self, data: &[u8]) -> StorageResult<EncodedBlob> {
        let response = self
            .http
            .post(format!("{}/v1/encode", self.config.encoder_url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await?;
        let encoded: EncodedBlob = check_status(response).await?.json().await?;
        Ok(encoded)
    }

    async fn register_blob_transaction(&self, params: RegisterBlobParams) -> StorageResult<MoveCall> {
        Ok(MoveCall::new(
            self.package_id()?,
            SYSTEM_MODULE,
            "register_blob",
            vec![
                json!(self.system_object_id()?),
                json!(params.blob_id),
                json!(params.root_hash),
                json!(params.size.to_string()),
                json!(params.epochs),
                json!(params.deletable),
                json!(params.owner),
            ],
        ))
    }

    async fn write_encoded_blob_to_nodes(
        &self,
        params: WriteBlobParams,
    ) -> StorageResult<Vec<StorageConfirmation>> {
        if params.slivers_by_node.is_empty() {
            return Err(StorageError::Decode(format!(
                "encoded blob {} has no slivers to write",
                params.blob_id
            )));
        }
        let writes = params
            .slivers_by_node
            .iter()
            .map(|node| self.write_to_node(&params, node));
        try_join_all(writes).await
    }

    async fn certify_blob_transaction(&self, params: CertifyBlobParams) -> StorageResult<MoveCall> {
        let confirmations = serde_json::to_value(&params.confirmations)
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        Ok(MoveCall::new(
            self.package_id()?,
            SYSTEM_MODULE,
            "certify_blob",
            vec![
                json!(self.system_object_id()?),
                json!(params.blob_object_id),
                json!(params.blob_id),
                json!(params.deletable),
                confirmations,
            ],
        ))
    }

    async fn read_blob(&self, blob_id: &str) -> StorageResult<Vec<u8>> {
        let response = self
            .http
            .get(format!("{}/v1/blobs/{}", self.config.aggregator_url, blob_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotCertified(blob_id.to_string()));
        }
        let bytes = check_status(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    async fn get_blob_metadata(&self, blob_id: &str) -> StorageResult<JsonValue> {
        if let Some(cached) = self
            .metadata_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(blob_id).cloned())
        {
            return Ok(cached);
        }

        let base = self.node_url(0)?;
        let response = self
            .http
            .get(format!("{}/v1/blobs/{}/metadata", base, blob_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotCertified(blob_id.to_string()));
        }
        let metadata: JsonValue = check_status(response).await?.json().await?;

        if let Ok(mut cache) = self.metadata_cache.lock() {
            cache.insert(blob_id.to_string(), metadata.clone());
        }
        Ok(metadata)
    }

    /// Asks every node and returns the status reported by most of them.
    async fn get_verified_blob_status(&self, blob_id: &str) -> StorageResult<BlobStatus> {
        if self.config.storage_nodes.is_empty() {
            return Err(StorageError::Config("WALRUS_STORAGE_NODES is empty".to_string()));
        }
        let answers = join_all(
            self.config
                .storage_nodes
                .iter()
                .map(|base| self.node_status(base, blob_id)),
        )
        .await;

        let mut tally: Vec<(BlobStatus, usize)> = Vec::new();
        let mut last_error = None;
        for answer in answers {
            match answer {
                Ok(status) => match tally.iter_mut().find(|(s, _)| *s == status) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((status, 1)),
                },
                Err(e) => {
                    warn!(blob_id, error = %e, "storage node status query failed");
                    last_error = Some(e);
                }
            }
        }

        // max_by_key keeps the last maximum; iterate reversed so ties go to the first reported.
        tally
            .into_iter()
            .rev()
            .max_by_key(|(_, count)| *count)
            .map(|(status, _)| status)
            .ok_or_else(|| {
                last_error.unwrap_or_else(|| StorageError::Decode("no status answers".to_string()))
            })
    }

    fn reset(&self) {
        if let Ok(mut cache) = self.metadata_cache.lock() {
            cache.clear();
        }
    }
}
