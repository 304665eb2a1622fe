//! Error types shared by the ledger client, the storage-network client and the
//! domain flows built on top of them.

use thiserror::Error;

/// Failures talking to the ledger (Sui JSON-RPC).
#[derive(Error, Debug)]
pub enum LedgerError {
    /// HTTP transport error (from reqwest)
    #[error("Ledger transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object
    #[error("Ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The response did not have the expected shape
    #[error("Unexpected ledger response: {0}")]
    Decode(String),

    /// A transaction was requested but no signing key is loaded
    #[error("Server private key not configured. Cannot sign Sui transactions.")]
    MissingSigner,

    #[error("Signing error: {0}")]
    Signing(String),
}

/// Failures talking to the storage network (Walrus).
#[derive(Error, Debug)]
pub enum StorageError {
    /// The blob exists on the ledger but is not certified (or not available) yet
    #[error("Blob {0} is not certified yet")]
    NotCertified(String),

    /// Connectivity or node-side transient failure; the client state should be reset
    #[error("Retryable storage client error: {0}")]
    Retryable(String),

    /// A storage node rejected a write or did not confirm it
    #[error("Storage node {node} failed: {message}")]
    Node { node: String, message: String },

    /// Non-success HTTP status that is not transient
    #[error("Storage request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected storage response: {0}")]
    Decode(String),

    /// Missing client configuration (package ids, endpoints)
    #[error("Storage client misconfigured: {0}")]
    Config(String),
}

impl StorageError {
    /// Whether the caller should reset the storage client and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Retryable(_))
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StorageError::Decode(e.to_string())
        } else {
            StorageError::Retryable(e.to_string())
        }
    }
}

/// The registry scan could not page through the child-record index.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to fetch dynamic field values: {0}")]
    Pagination(#[source] LedgerError),
}

/// Failures updating the application file registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The transaction executed but its effects status is failure
    #[error("Registry transaction {digest} failed: {error}")]
    Rejected { digest: String, error: String },
}

/// One variant per step of the upload sequence.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to encode blob: {0}")]
    Encode(#[source] StorageError),

    #[error("Failed to register blob on Sui: {0}")]
    Register(String),

    #[error("Could not find created Blob object ID in register transaction {digest}")]
    MissingBlobObject { digest: String },

    #[error("Failed to write encoded blob to storage nodes: {0}")]
    WriteNodes(#[source] StorageError),

    #[error("Failed to certify blob on Sui: {0}")]
    Certify(String),

    #[error("Failed to call add_file_id on Sui: {0}")]
    Registry(#[source] RegistryError),
}

impl UploadError {
    /// True when the failure came from a transient storage-client error.
    pub fn is_retryable(&self) -> bool {
        match self {
            UploadError::Encode(e) | UploadError::WriteNodes(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Message surfaced to the caller of the upload operation.
    pub fn user_message(&self) -> String {
        if self.is_retryable() {
            "A recoverable Walrus error occurred. Resetting client state. Please try again."
                .to_string()
        } else {
            format!("Error: {}", self)
        }
    }
}

/// Invalid or missing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Goldfish wallet address not configured. Set GOLDFISH_WALLET_ADDRESS or pass as 1st cmd arg."
    )]
    MissingWalletAddress,

    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Error loading server private key: {0}")]
    Key(#[from] KeyError),
}

/// A signing key could not be parsed.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("private key is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected a 32-byte ed25519 secret key, got {0} bytes")]
    Length(usize),

    #[error("unsupported key scheme flag 0x{0:02x} (only ed25519 is supported)")]
    Scheme(u8),
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Result type alias for storage-network operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_storage_errors_make_upload_retryable() {
        let err = UploadError::WriteNodes(StorageError::Retryable("connection reset".into()));
        assert!(err.is_retryable());
        assert!(err.user_message().contains("Please try again"));

        let err = UploadError::Register("MoveAbort".into());
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Error: Failed to register blob on Sui: MoveAbort");
    }
}
