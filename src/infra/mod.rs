pub mod config;
pub mod sui;
pub mod walrus;
