//! Reading blob contents back from the storage network.

pub mod resolver;

pub use resolver::{BlobContentResolver, BlobFetchResult, NOT_CERTIFIED_MESSAGE};
