pub mod app;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod infra;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{FileIdsView, FileService};
pub use crypto::SuiKeypair;
pub use domain::blob::{BlobContentResolver, BlobFetchResult};
pub use domain::file_type::{detect, DetectedFileType, FileCategory};
pub use domain::registry::{RegistryScanner, RegistryWriter};
pub use domain::upload::{UploadReceipt, UploadRequest, Uploader};
pub use infra::config::Config;
pub use infra::sui::{Ledger, SuiRpcClient};
pub use infra::walrus::{StorageNetwork, WalrusHttpClient};
