// Adds and removes blob ids in the shared registry object.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::error::RegistryError;
use crate::infra::config::RegistryConfig;
use crate::infra::sui::{Ledger, MoveCall};

#[derive(Clone)]
pub struct RegistryWriter {
    ledger: Arc<dyn Ledger>,
    config: RegistryConfig,
}

impl RegistryWriter {
    pub fn new(ledger: Arc<dyn Ledger>, config: RegistryConfig) -> Self {
        Self { ledger, config }
    }

    /// Records `file_id` for the signing account. Returns the transaction digest.
    pub async fn add_file_id(&self, file_id: &str) -> Result<String, RegistryError> {
        self.submit("add_file_id", &self.config.registry_object_id, file_id)
            .await
    }

    /// Unlists `file_id` from the default registry object.
    pub async fn remove_file_id(&self, file_id: &str) -> Result<String, RegistryError> {
        self.remove(file_id, &self.config.registry_object_id).await
    }

    /// Unlists `file_id` from `registry_object_id`. Stored blob bytes are untouched.
    pub async fn remove(&self, file_id: &str, registry_object_id: &str) -> Result<String, RegistryError> {
        self.submit("remove_file_id", registry_object_id, file_id).await
    }

    async fn submit(
        &self,
        function: &str,
        registry_object_id: &str,
        file_id: &str,
    ) -> Result<String, RegistryError> {
        let call = MoveCall::new(
            &self.config.package_id,
            &self.config.module,
            function,
            vec![json!(registry_object_id), json!(file_id)],
        );
        let target = call.target();
        let response = self.ledger.execute(call).await?;

        if !response.status.is_success() {
            return Err(RegistryError::Rejected {
                digest: response.digest,
                error: response.status.error_message().to_string(),
            });
        }

        info!(%target, file_id, digest = %response.digest, "registry updated");
        Ok(response.digest)
    }
}
