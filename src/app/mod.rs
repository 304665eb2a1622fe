pub mod file_service;

pub use file_service::{FileIdsSnapshot, FileIdsView, FileService, FileSummary};
