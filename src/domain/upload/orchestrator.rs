// Uploads one file: encode, register, write to nodes, certify, add to registry.
//
// Steps run strictly in order. A failing step stops the sequence; nothing is
// retried or resumed here.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::domain::registry::RegistryWriter;
use crate::error::UploadError;
use crate::infra::config::DEFAULT_STORAGE_EPOCHS;
use crate::infra::sui::Ledger;
use crate::infra::walrus::{CertifyBlobParams, RegisterBlobParams, StorageNetwork, WriteBlobParams};

/// Uploaded blobs are always deletable so they can later be unlisted.
const DELETABLE: bool = true;

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub owner: String,
    pub storage_epochs: u32,
}

impl UploadRequest {
    pub fn new(data: Vec<u8>, owner: impl Into<String>) -> Self {
        Self {
            data,
            owner: owner.into(),
            storage_epochs: DEFAULT_STORAGE_EPOCHS,
        }
    }

    pub fn with_epochs(mut self, storage_epochs: u32) -> Self {
        self.storage_epochs = storage_epochs;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub blob_id: String,
    pub blob_object_id: String,
    pub size: u64,
    pub storage_epochs: u32,
    pub deletable: bool,
    pub metadata: JsonValue,
    pub register_digest: String,
    pub certify_digest: String,
    pub registry_digest: String,
}

#[derive(Clone)]
pub struct Uploader {
    ledger: Arc<dyn Ledger>,
    storage: Arc<dyn StorageNetwork>,
    registry: RegistryWriter,
}

impl Uploader {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        storage: Arc<dyn StorageNetwork>,
        registry: RegistryWriter,
    ) -> Self {
        Self {
            ledger,
            storage,
            registry,
        }
    }

    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
        let result = self.run(request).await;
        if let Err(e) = &result {
            error!(error = %e, retryable = e.is_retryable(), "upload failed");
        }
        result
    }

    async fn run(&self, request: UploadRequest) -> Result<UploadReceipt, UploadError> {
        let UploadRequest {
            data,
            owner,
            storage_epochs,
        } = request;
        let size = data.len() as u64;

        // 1. encode
        info!(size, "encoding blob");
        let encoded = self
            .storage
            .encode_blob(&data)
            .await
            .map_err(UploadError::Encode)?;
        let blob_id = encoded.blob_id.clone();
        info!(%blob_id, "blob encoded");

        // 2. register
        let register_call = self
            .storage
            .register_blob_transaction(RegisterBlobParams {
                blob_id: blob_id.clone(),
                root_hash: encoded.root_hash.clone(),
                size,
                deletable: DELETABLE,
                epochs: storage_epochs,
                owner,
            })
            .await
            .map_err(|e| UploadError::Register(e.to_string()))?;
        let registered = self
            .ledger
            .execute(register_call)
            .await
            .map_err(|e| UploadError::Register(e.to_string()))?;
        info!(%blob_id, digest = %registered.digest, "register transaction executed");
        if !registered.status.is_success() {
            return Err(UploadError::Register(
                registered.status.error_message().to_string(),
            ));
        }

        let blob_type = self
            .storage
            .blob_type()
            .await
            .map_err(|e| UploadError::Register(e.to_string()))?;
        let blob_object_id = registered
            .created_object_of_type(&blob_type)
            .map(str::to_string)
            .ok_or_else(|| UploadError::MissingBlobObject {
                digest: registered.digest.clone(),
            })?;
        info!(%blob_id, %blob_object_id, "blob object created");

        // 3. write slivers
        let confirmations = self
            .storage
            .write_encoded_blob_to_nodes(WriteBlobParams {
                blob_id: blob_id.clone(),
                metadata: encoded.metadata.clone(),
                slivers_by_node: encoded.slivers_by_node,
                deletable: DELETABLE,
                object_id: blob_object_id.clone(),
            })
            .await
            .map_err(UploadError::WriteNodes)?;
        info!(%blob_id, confirmations = confirmations.len(), "slivers stored");

        // 4. certify
        let certify_call = self
            .storage
            .certify_blob_transaction(CertifyBlobParams {
                blob_id: blob_id.clone(),
                blob_object_id: blob_object_id.clone(),
                confirmations,
                deletable: DELETABLE,
            })
            .await
            .map_err(|e| UploadError::Certify(e.to_string()))?;
        let certified = self
            .ledger
            .execute(certify_call)
            .await
            .map_err(|e| UploadError::Certify(e.to_string()))?;
        info!(%blob_id, digest = %certified.digest, "certify transaction executed");
        if !certified.status.is_success() {
            return Err(UploadError::Certify(
                certified.status.error_message().to_string(),
            ));
        }

        // 5. registry
        let registry_digest = self
            .registry
            .add_file_id(&blob_id)
            .await
            .map_err(UploadError::Registry)?;
        info!(%blob_id, digest = %registry_digest, "upload complete");

        Ok(UploadReceipt {
            blob_id,
            blob_object_id,
            size,
            storage_epochs,
            deletable: DELETABLE,
            metadata: encoded.metadata,
            register_digest: registered.digest,
            certify_digest: certified.digest,
            registry_digest,
        })
    }
}
