pub mod blob;
pub mod download;
pub mod file_type;
pub mod registry;
pub mod upload;
