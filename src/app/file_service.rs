//! The file service.
//!
//! Ties the registry, the blob resolver and the uploader to one wallet
//! address. The HTTP layer only talks to this type.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::blob::{BlobContentResolver, BlobFetchResult};
use crate::domain::download::{format_file_size, Download};
use crate::domain::file_type::{self, DetectedFileType};
use crate::domain::registry::{RegistryScanner, RegistryWriter};
use crate::domain::upload::{UploadReceipt, UploadRequest, Uploader};
use crate::error::{LedgerResult, RegistryError, ScanError, StorageError, StorageResult, UploadError};
use crate::infra::config::RegistryConfig;
use crate::infra::sui::Ledger;
use crate::infra::walrus::StorageNetwork;

/// One listed file. Either the type fields or `error` are filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub blob_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<DetectedFileType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&BlobFetchResult> for FileSummary {
    fn from(result: &BlobFetchResult) -> Self {
        match &result.data {
            Some(data) => FileSummary {
                blob_id: result.blob_id.clone(),
                size: Some(data.len() as u64),
                formatted_size: Some(format_file_size(data.len() as u64)),
                file_type: Some(file_type::detect(data)),
                error: None,
            },
            None => FileSummary {
                blob_id: result.blob_id.clone(),
                size: None,
                formatted_size: None,
                file_type: None,
                error: result.error.clone(),
            },
        }
    }
}

/// Last scan outcome. On failure `ids` is empty and `error` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileIdsSnapshot {
    pub ids: Vec<String>,
    pub error: Option<String>,
}

/// Cached listing of an account's file ids, refreshed on demand.
pub struct FileIdsView {
    scanner: RegistryScanner,
    parent_id: String,
    address: String,
    state: RwLock<FileIdsSnapshot>,
}

impl FileIdsView {
    pub fn new(scanner: RegistryScanner, parent_id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            scanner,
            parent_id: parent_id.into(),
            address: address.into(),
            state: RwLock::new(FileIdsSnapshot::default()),
        }
    }

    /// Re-runs the scan and replaces the stored snapshot.
    pub async fn refetch(&self) -> FileIdsSnapshot {
        let snapshot = match self.scanner.scan(&self.parent_id, &self.address).await {
            Ok(ids) => FileIdsSnapshot { ids, error: None },
            Err(e) => {
                warn!(error = %e, "file id scan failed");
                FileIdsSnapshot {
                    ids: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
        *self.state.write().await = snapshot.clone();
        snapshot
    }

    pub async fn snapshot(&self) -> FileIdsSnapshot {
        self.state.read().await.clone()
    }
}

pub struct FileService {
    wallet_address: String,
    registry_config: RegistryConfig,
    default_epochs: u32,
    ledger: Arc<dyn Ledger>,
    storage: Arc<dyn StorageNetwork>,
    scanner: RegistryScanner,
    resolver: BlobContentResolver,
    writer: RegistryWriter,
    uploader: Uploader,
    file_ids: FileIdsView,
}

impl FileService {
    pub fn new(
        wallet_address: impl Into<String>,
        registry_config: RegistryConfig,
        default_epochs: u32,
        ledger: Arc<dyn Ledger>,
        storage: Arc<dyn StorageNetwork>,
    ) -> Self {
        let wallet_address = wallet_address.into();
        let scanner = RegistryScanner::new(ledger.clone());
        let writer = RegistryWriter::new(ledger.clone(), registry_config.clone());
        let uploader = Uploader::new(ledger.clone(), storage.clone(), writer.clone());
        let file_ids = FileIdsView::new(
            scanner.clone(),
            registry_config.table_object_id.clone(),
            wallet_address.clone(),
        );
        Self {
            wallet_address,
            resolver: BlobContentResolver::new(storage.clone()),
            registry_config,
            default_epochs,
            ledger,
            storage,
            scanner,
            writer,
            uploader,
            file_ids,
        }
    }

    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    pub fn default_epochs(&self) -> u32 {
        self.default_epochs
    }

    pub fn file_ids(&self) -> &FileIdsView {
        &self.file_ids
    }

    /// Cheap ledger round trip used by the health endpoint.
    pub async fn ping_ledger(&self) -> LedgerResult<()> {
        self.ledger
            .dynamic_fields(&self.registry_config.table_object_id, None, Some(1))
            .await
            .map(|_| ())
    }

    pub async fn list_file_ids(&self) -> Result<Vec<String>, ScanError> {
        self.scanner
            .scan(&self.registry_config.table_object_id, &self.wallet_address)
            .await
    }

    /// Lists the wallet's files with size and detected type. Unreadable blobs
    /// are reported individually.
    pub async fn list_files(&self) -> Result<Vec<FileSummary>, ScanError> {
        let ids = self.list_file_ids().await?;
        let results = self.resolver.resolve_all(&ids).await;
        Ok(results.iter().map(FileSummary::from).collect())
    }

    pub async fn fetch_blob(&self, blob_id: &str) -> BlobFetchResult {
        self.resolver.resolve(blob_id).await
    }

    pub async fn blob_metadata(&self, blob_id: &str) -> StorageResult<JsonValue> {
        self.storage.get_blob_metadata(blob_id).await
    }

    pub async fn download(&self, blob_id: &str) -> StorageResult<Download> {
        let bytes = self.storage.read_blob(blob_id).await?;
        Ok(Download::from_bytes(blob_id, bytes))
    }

    /// Uploads for the service wallet. Resets the storage client when the
    /// failure is retryable.
    pub async fn upload(&self, data: Vec<u8>, storage_epochs: Option<u32>) -> Result<UploadReceipt, UploadError> {
        let request = UploadRequest::new(data, self.wallet_address.clone())
            .with_epochs(storage_epochs.unwrap_or(self.default_epochs));
        let result = self.uploader.upload(request).await;
        match &result {
            Ok(receipt) => {
                info!(blob_id = %receipt.blob_id, "file uploaded");
                self.file_ids.refetch().await;
            }
            Err(e) if e.is_retryable() => {
                warn!("resetting storage client after retryable error");
                self.storage.reset();
            }
            Err(_) => {}
        }
        result
    }

    /// Unlists `blob_id` from the registry. The blob itself stays stored.
    pub async fn delete(&self, blob_id: &str) -> Result<String, RegistryError> {
        let digest = self.writer.remove_file_id(blob_id).await?;
        self.file_ids.refetch().await;
        Ok(digest)
    }
}

/// Whether a storage failure only means the blob is not certified yet.
pub fn is_not_certified(error: &StorageError) -> bool {
    matches!(error, StorageError::NotCertified(_))
}
