// Responsible for all communication with the Sui fullnode (JSON-RPC over HTTP).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::crypto::SuiKeypair;
use crate::error::{LedgerError, LedgerResult};
use crate::infra::sui::{
    DynamicFieldName, DynamicFieldPage, ExecutionStatus, Ledger, MoveCall, ObjectChange,
    TransactionResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBlockBytes {
    tx_bytes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransactionBlock {
    digest: String,
    #[serde(default)]
    effects: Option<RpcEffects>,
    #[serde(default)]
    object_changes: Option<Vec<ObjectChange>>,
}

#[derive(Deserialize)]
struct RpcEffects {
    status: RpcStatus,
}

#[derive(Deserialize)]
struct RpcStatus {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct RpcObjectResponse {
    #[serde(default)]
    data: Option<RpcObjectData>,
}

#[derive(Deserialize)]
struct RpcObjectData {
    #[serde(default)]
    content: Option<JsonValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBalance {
    total_balance: String,
}

/// Sui JSON-RPC client. Signs transactions with the configured keypair as `sender`.
pub struct SuiRpcClient {
    http: reqwest::Client,
    rpc_url: String,
    sender: String,
    signer: Option<Arc<SuiKeypair>>,
    gas_budget: u64,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(
        rpc_url: impl Into<String>,
        sender: impl Into<String>,
        signer: Option<Arc<SuiKeypair>>,
        gas_budget: u64,
    ) -> LedgerResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            rpc_url: rpc_url.into(),
            sender: sender.into(),
            signer,
            gas_budget,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: JsonValue) -> LedgerResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "sui rpc request");

        let envelope: RpcEnvelope = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = envelope.error {
            return Err(LedgerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        let result = envelope
            .result
            .ok_or_else(|| LedgerError::Decode(format!("{} returned neither result nor error", method)))?;
        serde_json::from_value(result).map_err(|e| LedgerError::Decode(format!("{}: {}", method, e)))
    }

    /// Identifier of the chain the fullnode serves (connectivity check).
    pub async fn chain_identifier(&self) -> LedgerResult<String> {
        self.call("sui_getChainIdentifier", json!([])).await
    }

    /// Total SUI balance of `owner`, in MIST.
    pub async fn balance(&self, owner: &str) -> LedgerResult<u128> {
        let balance: RpcBalance = self.call("suix_getBalance", json!([owner])).await?;
        balance
            .total_balance
            .parse::<u128>()
            .map_err(|_| LedgerError::Decode(format!("invalid balance '{}'", balance.total_balance)))
    }
}

#[async_trait]
impl Ledger for SuiRpcClient {
    async fn execute(&self, call: MoveCall) -> LedgerResult<TransactionResponse> {
        let signer = self.signer.as_ref().ok_or(LedgerError::MissingSigner)?;

        let built: TransactionBlockBytes = self
            .call(
                "unsafe_moveCall",
                json!([
                    self.sender,
                    call.package,
                    call.module,
                    call.function,
                    call.type_arguments,
                    call.arguments,
                    JsonValue::Null,
                    self.gas_budget.to_string(),
                ]),
            )
            .await?;

        let tx_bytes = BASE64
            .decode(&built.tx_bytes)
            .map_err(|e| LedgerError::Signing(format!("transaction bytes are not base64: {}", e)))?;
        let signature = signer.sign_transaction(&tx_bytes);

        let executed: RpcTransactionBlock = self
            .call(
                "sui_executeTransactionBlock",
                json!([
                    built.tx_bytes,
                    [signature],
                    {
                        "showEffects": true,
                        "showObjectChanges": true,
                        "showEvents": true,
                    },
                    "WaitForLocalExecution",
                ]),
            )
            .await?;

        let status = match executed.effects {
            Some(effects) if effects.status.status == "success" => ExecutionStatus::Success,
            Some(effects) => ExecutionStatus::Failure {
                error: effects
                    .status
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
            None => ExecutionStatus::Failure {
                error: "transaction effects missing from response".to_string(),
            },
        };

        Ok(TransactionResponse {
            digest: executed.digest,
            status,
            object_changes: executed.object_changes.unwrap_or_default(),
        })
    }

    async fn dynamic_fields(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> LedgerResult<DynamicFieldPage> {
        self.call("suix_getDynamicFields", json!([parent_id, cursor, limit]))
            .await
    }

    async fn dynamic_field_object(
        &self,
        parent_id: &str,
        name: &DynamicFieldName,
    ) -> LedgerResult<Option<JsonValue>> {
        let response: RpcObjectResponse = self
            .call("suix_getDynamicFieldObject", json!([parent_id, name]))
            .await?;

        let fields = response
            .data
            .and_then(|d| d.content)
            .filter(|content| content.get("dataType").and_then(|v| v.as_str()) == Some("moveObject"))
            .and_then(|mut content| content.get_mut("fields").map(JsonValue::take));
        Ok(fields)
    }
}
