pub mod hashing;
pub mod keypair;

pub use keypair::SuiKeypair;
