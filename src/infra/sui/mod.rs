//! Ledger access: the `Ledger` trait and its Sui JSON-RPC implementation.

pub mod client;

pub use client::SuiRpcClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::LedgerResult;

/// A single Move function call to be signed and executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    /// JSON-encoded call arguments (object ids and pure values as strings).
    pub arguments: Vec<JsonValue>,
}

impl MoveCall {
    pub fn new(package: &str, module: &str, function: &str, arguments: Vec<JsonValue>) -> Self {
        Self {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: Vec::new(),
            arguments,
        }
    }

    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }

    pub fn error_message(&self) -> &str {
        match self {
            ExecutionStatus::Success => "",
            ExecutionStatus::Failure { error } => error,
        }
    }
}

/// An object created, mutated or deleted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectChange {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub object_type: Option<String>,
}

impl ObjectChange {
    pub fn is_created(&self) -> bool {
        self.kind == "created"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub digest: String,
    pub status: ExecutionStatus,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
}

impl TransactionResponse {
    /// Id of the first created object whose type equals `object_type`.
    pub fn created_object_of_type(&self, object_type: &str) -> Option<&str> {
        self.object_changes
            .iter()
            .filter(|oc| oc.is_created())
            .find(|oc| oc.object_type.as_deref() == Some(object_type))
            .and_then(|oc| oc.object_id.as_deref())
    }
}

/// Key of a dynamic field: its Move type and JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: JsonValue,
}

/// Descriptor returned by the child-record index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    #[serde(default)]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldPage {
    pub data: Vec<DynamicFieldInfo>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// The slice of the ledger this service depends on.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Signs and executes `call`, waiting for effects.
    async fn execute(&self, call: MoveCall) -> LedgerResult<TransactionResponse>;

    /// One page of dynamic-field descriptors under `parent_id`.
    async fn dynamic_fields(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> LedgerResult<DynamicFieldPage>;

    /// The Move fields of one dynamic-field object, or `None` when the object
    /// is missing or not a Move object.
    async fn dynamic_field_object(
        &self,
        parent_id: &str,
        name: &DynamicFieldName,
    ) -> LedgerResult<Option<JsonValue>>;
}
