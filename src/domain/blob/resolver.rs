// Fault-isolated blob reads: one failing id never affects the others.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::infra::walrus::StorageNetwork;

pub const NOT_CERTIFIED_MESSAGE: &str = "Blob is not certified yet. Please wait for certification.";

/// Outcome of reading one blob. Exactly one of `data` / `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobFetchResult {
    pub blob_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the failure is only a pending certification.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_certified: bool,
}

impl BlobFetchResult {
    pub fn ok(blob_id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            blob_id: blob_id.into(),
            data: Some(data),
            error: None,
            not_certified: false,
        }
    }

    pub fn failed(blob_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            blob_id: blob_id.into(),
            data: None,
            error: Some(error.into()),
            not_certified: false,
        }
    }

    fn pending(blob_id: impl Into<String>) -> Self {
        Self {
            not_certified: true,
            ..Self::failed(blob_id, NOT_CERTIFIED_MESSAGE)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.data.is_some()
    }
}

#[derive(Clone)]
pub struct BlobContentResolver {
    storage: Arc<dyn StorageNetwork>,
}

impl BlobContentResolver {
    pub fn new(storage: Arc<dyn StorageNetwork>) -> Self {
        Self { storage }
    }

    /// Reads one blob. Never fails; the error is carried in the result.
    pub async fn resolve(&self, blob_id: &str) -> BlobFetchResult {
        // Status is advisory only; the read below decides the outcome.
        match self.storage.get_verified_blob_status(blob_id).await {
            Ok(status) => debug!(blob_id, ?status, "blob status"),
            Err(e) => debug!(blob_id, error = %e, "blob status unavailable"),
        }

        match self.storage.read_blob(blob_id).await {
            Ok(data) => BlobFetchResult::ok(blob_id, data),
            Err(StorageError::NotCertified(_)) => BlobFetchResult::pending(blob_id),
            Err(e) => {
                warn!(blob_id, error = %e, "blob read failed");
                BlobFetchResult::failed(blob_id, e.to_string())
            }
        }
    }

    /// Reads all `blob_ids` concurrently. The output follows input order.
    pub async fn resolve_all(&self, blob_ids: &[String]) -> Vec<BlobFetchResult> {
        join_all(blob_ids.iter().map(|id| self.resolve(id))).await
    }
}
