//! Storage-network access: the `StorageNetwork` trait and its Walrus HTTP implementation.

pub mod client;

pub use client::WalrusHttpClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::StorageResult;
use crate::infra::sui::MoveCall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliverKind {
    Primary,
    Secondary,
}

impl SliverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SliverKind::Primary => "primary",
            SliverKind::Secondary => "secondary",
        }
    }
}

/// One encoded piece destined for a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sliver {
    pub pair_index: u16,
    pub kind: SliverKind,
    /// Base64 sliver bytes.
    pub data: String,
}

/// The slivers assigned to one storage node (index into the node list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSlivers {
    pub node_index: usize,
    pub slivers: Vec<Sliver>,
}

/// Output of local encoding. Lives only for the duration of one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedBlob {
    pub blob_id: String,
    pub root_hash: String,
    pub metadata: JsonValue,
    pub slivers_by_node: Vec<NodeSlivers>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterBlobParams {
    pub blob_id: String,
    pub root_hash: String,
    pub size: u64,
    pub deletable: bool,
    pub epochs: u32,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteBlobParams {
    pub blob_id: String,
    pub metadata: JsonValue,
    pub slivers_by_node: Vec<NodeSlivers>,
    pub deletable: bool,
    /// Blob object created by the register transaction.
    pub object_id: String,
}

/// A node's signed statement that it stores its slivers of a blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfirmation {
    pub node_index: usize,
    pub confirmation: JsonValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertifyBlobParams {
    pub blob_id: String,
    pub blob_object_id: String,
    pub confirmations: Vec<StorageConfirmation>,
    pub deletable: bool,
}

/// Certification state of a blob as reported by a storage node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BlobStatus {
    Nonexistent,
    Invalid,
    Registered { end_epoch: Option<u64> },
    Certified { end_epoch: Option<u64> },
}

impl BlobStatus {
    pub fn is_certified(&self) -> bool {
        matches!(self, BlobStatus::Certified { .. })
    }

    /// Parses the node's status JSON (`"nonexistent"`, `{"invalid":…}`,
    /// `{"permanent":…}` or `{"deletable":…}`), optionally wrapped in
    /// `{"success":{"data":…}}`.
    pub fn from_node_json(value: &JsonValue) -> Option<Self> {
        let value = value
            .pointer("/success/data")
            .unwrap_or(value);

        if value.as_str() == Some("nonexistent") {
            return Some(BlobStatus::Nonexistent);
        }
        let obj = value.as_object()?;
        if obj.contains_key("invalid") {
            return Some(BlobStatus::Invalid);
        }
        if let Some(permanent) = obj.get("permanent") {
            let end_epoch = permanent.get("endEpoch").and_then(JsonValue::as_u64);
            let certified = permanent
                .get("isCertified")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false);
            return Some(if certified {
                BlobStatus::Certified { end_epoch }
            } else {
                BlobStatus::Registered { end_epoch }
            });
        }
        if let Some(deletable) = obj.get("deletable") {
            let certified_epoch = deletable
                .get("initialCertifiedEpoch")
                .map(|v| !v.is_null())
                .unwrap_or(false);
            let certified_count = deletable
                .pointer("/deletableCounts/countDeletableCertified")
                .and_then(JsonValue::as_u64)
                .unwrap_or(0);
            return Some(if certified_epoch || certified_count > 0 {
                BlobStatus::Certified { end_epoch: None }
            } else {
                BlobStatus::Registered { end_epoch: None }
            });
        }
        None
    }
}

/// The storage-network operations this service consumes.
#[async_trait]
pub trait StorageNetwork: Send + Sync {
    /// Fully qualified Move type of the on-ledger blob object.
    async fn blob_type(&self) -> StorageResult<String>;

    async fn encode_blob(&self, data: &[u8]) -> StorageResult<EncodedBlob>;

    async fn register_blob_transaction(&self, params: RegisterBlobParams) -> StorageResult<MoveCall>;

    /// Pushes metadata and slivers to every node and collects one confirmation per node.
    async fn write_encoded_blob_to_nodes(
        &self,
        params: WriteBlobParams,
    ) -> StorageResult<Vec<StorageConfirmation>>;

    async fn certify_blob_transaction(&self, params: CertifyBlobParams) -> StorageResult<MoveCall>;

    async fn read_blob(&self, blob_id: &str) -> StorageResult<Vec<u8>>;

    async fn get_blob_metadata(&self, blob_id: &str) -> StorageResult<JsonValue>;

    async fn get_verified_blob_status(&self, blob_id: &str) -> StorageResult<BlobStatus>;

    /// Drops cached client state after a retryable failure.
    fn reset(&self);
}
