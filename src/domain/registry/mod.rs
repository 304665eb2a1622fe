//! The on-ledger file registry: listing an account's blob ids and
//! adding or removing entries.

pub mod scanner;
pub mod writer;

pub use scanner::{RegistryScanner, SCAN_PAGE_LIMIT};
pub use writer::RegistryWriter;
