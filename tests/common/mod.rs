//! In-memory `Ledger` and `StorageNetwork` used by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use goldfish::error::{LedgerError, LedgerResult, StorageError, StorageResult};
use goldfish::infra::config::RegistryConfig;
use goldfish::infra::sui::{
    DynamicFieldInfo, DynamicFieldName, DynamicFieldPage, ExecutionStatus, Ledger, MoveCall,
    ObjectChange, TransactionResponse,
};
use goldfish::infra::walrus::{
    BlobStatus, CertifyBlobParams, EncodedBlob, NodeSlivers, RegisterBlobParams, Sliver, SliverKind,
    StorageConfirmation, StorageNetwork, WriteBlobParams,
};
use goldfish::FileService;
use serde_json::{json, Value as JsonValue};

pub const OWNER: &str = "0xa11ce";
pub const BLOB_TYPE: &str = "0xwal::blob::Blob";
pub const BLOB_OBJECT_ID: &str = "0xb10b0b1ec7";

/// One child record of the registry table.
#[derive(Clone, Debug)]
pub struct MockRecord {
    pub key: String,
    pub fields: JsonValue,
}

impl MockRecord {
    pub fn new(key: &str, owner: &str, ids: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            fields: json!({ "id": { "id": format!("0x{}", key) }, "name": owner, "value": ids }),
        }
    }
}

/// Ledger double: a registry table held in memory plus a log of executed calls.
pub struct MockLedger {
    pub sender: String,
    pub records: Mutex<Vec<MockRecord>>,
    pub page_size: usize,
    pub failing_records: Mutex<HashSet<String>>,
    pub fail_pagination: AtomicBool,
    pub fail_register: AtomicBool,
    pub fail_certify: AtomicBool,
    pub fail_add_file_id: AtomicBool,
    pub omit_blob_object: AtomicBool,
    pub executed: Mutex<Vec<MoveCall>>,
    pub page_requests: AtomicUsize,
}

impl MockLedger {
    pub fn new(sender: &str) -> Self {
        Self {
            sender: sender.to_string(),
            records: Mutex::new(Vec::new()),
            page_size: 50,
            failing_records: Mutex::new(HashSet::new()),
            fail_pagination: AtomicBool::new(false),
            fail_register: AtomicBool::new(false),
            fail_certify: AtomicBool::new(false),
            fail_add_file_id: AtomicBool::new(false),
            omit_blob_object: AtomicBool::new(false),
            executed: Mutex::new(Vec::new()),
            page_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_records(mut self, records: Vec<MockRecord>) -> Self {
        self.records = Mutex::new(records);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn fail_record(&self, key: &str) {
        self.failing_records.lock().unwrap().insert(key.to_string());
    }

    pub fn executed_functions(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.function.clone())
            .collect()
    }

    fn digest(&self) -> String {
        format!("digest-{}", self.executed.lock().unwrap().len())
    }

    fn success(&self, object_changes: Vec<ObjectChange>) -> TransactionResponse {
        TransactionResponse {
            digest: self.digest(),
            status: ExecutionStatus::Success,
            object_changes,
        }
    }

    fn failure(&self, error: &str) -> TransactionResponse {
        TransactionResponse {
            digest: self.digest(),
            status: ExecutionStatus::Failure {
                error: error.into(),
            },
            object_changes: vec![],
        }
    }

    fn update_registry(&self, blob_id: &str, add: bool) {
        let mut records = self.records.lock().unwrap();
        let owner = self.sender.to_lowercase();
        let existing = records.iter_mut().find(|r| {
            r.fields["name"].as_str().map(str::to_lowercase).as_deref() == Some(owner.as_str())
        });
        match existing {
            Some(record) => {
                let ids = record.fields["value"].as_array_mut().unwrap();
                if add {
                    ids.push(json!(blob_id));
                } else {
                    ids.retain(|v| v.as_str() != Some(blob_id));
                }
            }
            None if add => records.push(MockRecord::new(&self.sender, &self.sender, &[blob_id])),
            None => {}
        }
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn execute(&self, call: MoveCall) -> LedgerResult<TransactionResponse> {
        self.executed.lock().unwrap().push(call.clone());

        let response = match call.function.as_str() {
            "register_blob" if self.fail_register.load(Ordering::SeqCst) => {
                self.failure("MoveAbort(register_blob, 3)")
            }
            "certify_blob" if self.fail_certify.load(Ordering::SeqCst) => {
                self.failure("MoveAbort(certify_blob, 7)")
            }
            "add_file_id" if self.fail_add_file_id.load(Ordering::SeqCst) => {
                self.failure("MoveAbort(add_file_id, 1)")
            }
            "register_blob" => {
                let mut changes = vec![ObjectChange {
                    kind: "mutated".into(),
                    object_id: Some("0x5".into()),
                    object_type: Some("0x3::system::System".into()),
                }];
                if !self.omit_blob_object.load(Ordering::SeqCst) {
                    changes.push(ObjectChange {
                        kind: "created".into(),
                        object_id: Some(BLOB_OBJECT_ID.into()),
                        object_type: Some(BLOB_TYPE.into()),
                    });
                }
                self.success(changes)
            }
            "add_file_id" => {
                self.update_registry(call.arguments[1].as_str().unwrap_or_default(), true);
                self.success(vec![])
            }
            "remove_file_id" => {
                self.update_registry(call.arguments[1].as_str().unwrap_or_default(), false);
                self.success(vec![])
            }
            _ => self.success(vec![]),
        };
        Ok(response)
    }

    async fn dynamic_fields(
        &self,
        _parent_id: &str,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> LedgerResult<DynamicFieldPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_pagination.load(Ordering::SeqCst) {
            return Err(LedgerError::Rpc {
                code: -32000,
                message: "cursor expired".into(),
            });
        }

        let records = self.records.lock().unwrap();
        let start = cursor.map(|c| c.parse::<usize>().unwrap()).unwrap_or(0);
        let size = limit.unwrap_or(self.page_size).min(self.page_size);
        let end = (start + size).min(records.len());
        let data = records[start..end]
            .iter()
            .map(|r| DynamicFieldInfo {
                name: DynamicFieldName {
                    type_: "address".into(),
                    value: json!(r.key),
                },
                object_id: None,
            })
            .collect();
        let has_next_page = end < records.len();
        Ok(DynamicFieldPage {
            data,
            next_cursor: has_next_page.then(|| end.to_string()),
            has_next_page,
        })
    }

    async fn dynamic_field_object(
        &self,
        _parent_id: &str,
        name: &DynamicFieldName,
    ) -> LedgerResult<Option<JsonValue>> {
        let key = name.value.as_str().unwrap_or_default();
        if self.failing_records.lock().unwrap().contains(key) {
            return Err(LedgerError::Decode(format!("record {} unavailable", key)));
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.key == key)
            .map(|r| r.fields.clone()))
    }
}

/// Storage double: blobs are "stored" once written to nodes.
pub struct MockStorage {
    pub stored: Mutex<HashMap<String, Vec<u8>>>,
    pending: Mutex<HashMap<String, Vec<u8>>>,
    pub failing: Mutex<HashSet<String>>,
    pub fail_writes_retryable: AtomicBool,
    pub encode_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            stored: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            fail_writes_retryable: AtomicBool::new(false),
            encode_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        }
    }

    pub fn store(&self, blob_id: &str, data: &[u8]) {
        self.stored
            .lock()
            .unwrap()
            .insert(blob_id.to_string(), data.to_vec());
    }

    pub fn fail_reads_of(&self, blob_id: &str) {
        self.failing.lock().unwrap().insert(blob_id.to_string());
    }

    pub fn blob_id_for(data: &[u8]) -> String {
        format!("blob-{}-{}", data.len(), hex::encode(&data[..data.len().min(6)]))
    }
}

#[async_trait]
impl StorageNetwork for MockStorage {
    async fn blob_type(&self) -> StorageResult<String> {
        Ok(BLOB_TYPE.to_string())
    }

    async fn encode_blob(&self, data: &[u8]) -> StorageResult<EncodedBlob> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        let blob_id = Self::blob_id_for(data);
        self.pending
            .lock()
            .unwrap()
            .insert(blob_id.clone(), data.to_vec());
        Ok(EncodedBlob {
            blob_id: blob_id.clone(),
            root_hash: format!("root-{}", blob_id),
            metadata: json!({ "blob_id": blob_id, "unencoded_length": data.len() }),
            slivers_by_node: vec![NodeSlivers {
                node_index: 0,
                slivers: vec![Sliver {
                    pair_index: 0,
                    kind: SliverKind::Primary,
                    data: String::new(),
                }],
            }],
        })
    }

    async fn register_blob_transaction(&self, params: RegisterBlobParams) -> StorageResult<MoveCall> {
        Ok(MoveCall::new(
            "0xwal",
            "system",
            "register_blob",
            vec![json!("0x5"), json!(params.blob_id), json!(params.size.to_string())],
        ))
    }

    async fn write_encoded_blob_to_nodes(
        &self,
        params: WriteBlobParams,
    ) -> StorageResult<Vec<StorageConfirmation>> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes_retryable.load(Ordering::SeqCst) {
            return Err(StorageError::Retryable("connection reset by node".into()));
        }
        let data = self
            .pending
            .lock()
            .unwrap()
            .remove(&params.blob_id)
            .ok_or_else(|| StorageError::Decode("blob was never encoded".into()))?;
        self.store(&params.blob_id, &data);
        Ok(params
            .slivers_by_node
            .iter()
            .map(|n| StorageConfirmation {
                node_index: n.node_index,
                confirmation: json!({ "signed": params.object_id }),
            })
            .collect())
    }

    async fn certify_blob_transaction(&self, params: CertifyBlobParams) -> StorageResult<MoveCall> {
        Ok(MoveCall::new(
            "0xwal",
            "system",
            "certify_blob",
            vec![json!("0x5"), json!(params.blob_object_id), json!(params.blob_id)],
        ))
    }

    async fn read_blob(&self, blob_id: &str) -> StorageResult<Vec<u8>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(blob_id) {
            return Err(StorageError::Node {
                node: "http://node-0".into(),
                message: "sliver missing".into(),
            });
        }
        self.stored
            .lock()
            .unwrap()
            .get(blob_id)
            .cloned()
            .ok_or_else(|| StorageError::NotCertified(blob_id.to_string()))
    }

    async fn get_blob_metadata(&self, blob_id: &str) -> StorageResult<JsonValue> {
        if self.stored.lock().unwrap().contains_key(blob_id) {
            Ok(json!({ "blob_id": blob_id }))
        } else {
            Err(StorageError::NotCertified(blob_id.to_string()))
        }
    }

    async fn get_verified_blob_status(&self, blob_id: &str) -> StorageResult<BlobStatus> {
        if self.stored.lock().unwrap().contains_key(blob_id) {
            Ok(BlobStatus::Certified { end_epoch: Some(10) })
        } else {
            Err(StorageError::Retryable("status unavailable".into()))
        }
    }

    fn reset(&self) {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn registry_config() -> RegistryConfig {
    RegistryConfig {
        package_id: "0xgold".into(),
        module: "goldfish_backend".into(),
        registry_object_id: "0xregistry".into(),
        table_object_id: "0xtable".into(),
    }
}

pub fn file_service(ledger: Arc<MockLedger>, storage: Arc<MockStorage>) -> FileService {
    FileService::new(OWNER, registry_config(), 3, ledger, storage)
}
