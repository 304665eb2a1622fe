//! The five-step upload sequence.

pub mod orchestrator;

pub use orchestrator::{UploadReceipt, UploadRequest, Uploader};
