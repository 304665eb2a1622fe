// Walks the dynamic fields of the registry table and collects the blob ids
// recorded for one account.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::crypto::hashing::normalize_address;
use crate::error::ScanError;
use crate::infra::sui::{DynamicFieldInfo, Ledger};

/// Descriptors requested per `dynamic_fields` page.
pub const SCAN_PAGE_LIMIT: usize = 50;

#[derive(Clone)]
pub struct RegistryScanner {
    ledger: Arc<dyn Ledger>,
    page_limit: usize,
}

impl RegistryScanner {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            page_limit: SCAN_PAGE_LIMIT,
        }
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// Returns every blob id recorded for `target_address` under `parent_id`,
    /// in discovery order.
    ///
    /// Only pagination failures abort the scan. A child record that cannot be
    /// fetched or has an unexpected shape is logged and skipped.
    pub async fn scan(&self, parent_id: &str, target_address: &str) -> Result<Vec<String>, ScanError> {
        let descriptors = self.collect_descriptors(parent_id).await?;
        debug!(parent_id, count = descriptors.len(), "registry descriptors collected");

        let target = normalize_address(target_address);
        let mut ids = Vec::new();

        for descriptor in &descriptors {
            let fields = match self.ledger.dynamic_field_object(parent_id, &descriptor.name).await {
                Ok(Some(fields)) => fields,
                Ok(None) => {
                    warn!(name = %descriptor.name.value, "registry record has no Move content, skipping");
                    continue;
                }
                Err(e) => {
                    warn!(name = %descriptor.name.value, error = %e, "failed to fetch registry record, skipping");
                    continue;
                }
            };

            let owner = record_owner(&fields, descriptor);
            if owner.as_deref().map(normalize_address).as_deref() != Some(target.as_str()) {
                continue;
            }

            match record_blob_ids(&fields) {
                Some(mut found) => ids.append(&mut found),
                None => warn!(
                    name = %descriptor.name.value,
                    "registry record value is not a list of strings, skipping"
                ),
            }
        }

        Ok(ids)
    }

    async fn collect_descriptors(&self, parent_id: &str) -> Result<Vec<DynamicFieldInfo>, ScanError> {
        let mut descriptors = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .ledger
                .dynamic_fields(parent_id, cursor.as_deref(), Some(self.page_limit))
                .await
                .map_err(ScanError::Pagination)?;

            descriptors.extend(page.data);
            if !page.has_next_page {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                // A page claiming more data without a cursor would loop forever.
                None => break,
            }
        }

        Ok(descriptors)
    }
}

/// The account a record belongs to: its `name` field, else the descriptor key.
fn record_owner(fields: &JsonValue, descriptor: &DynamicFieldInfo) -> Option<String> {
    fields
        .get("name")
        .and_then(JsonValue::as_str)
        .or_else(|| descriptor.name.value.as_str())
        .map(str::to_string)
}

/// The record's blob ids. `None` unless `value` is a list made only of strings.
fn record_blob_ids(fields: &JsonValue) -> Option<Vec<String>> {
    fields
        .get("value")?
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
