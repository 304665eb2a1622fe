// Blake2b-256 hashing used for Sui addresses and transaction intents.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Signature scheme flag for ed25519 keys.
pub const ED25519_FLAG: u8 = 0x00;

// Intent prefix for a Sui transaction: scope TransactionData, version V0, app Sui.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Hashes the concatenation of `parts` into a 32-byte digest.
pub fn blake2b256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// The message a signer signs for a serialized transaction.
pub fn transaction_intent_digest(tx_bytes: &[u8]) -> [u8; 32] {
    blake2b256(&[&TRANSACTION_INTENT, tx_bytes])
}

/// Derives the `0x`-prefixed account address of an ed25519 public key.
pub fn address_from_ed25519_public_key(public_key: &[u8; 32]) -> String {
    let digest = blake2b256(&[&[ED25519_FLAG], public_key]);
    format!("0x{}", hex::encode(digest))
}

/// Addresses are compared case-insensitively.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_and_split_invariant() {
        let whole = blake2b256(&[b"goldfish"]);
        let split = blake2b256(&[b"gold", b"fish"]);
        assert_eq!(whole, split);
        assert_ne!(whole, blake2b256(&[b"goldfisH"]));
    }

    #[test]
    fn address_is_prefixed_hex_of_32_bytes() {
        let address = address_from_ed25519_public_key(&[7u8; 32]);
        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 66);
        assert_eq!(address, normalize_address(&address.to_uppercase().replacen("0X", "0x", 1)));
    }

    #[test]
    fn intent_digest_differs_from_plain_digest() {
        let tx = b"tx-bytes";
        assert_ne!(transaction_intent_digest(tx), blake2b256(&[tx]));
    }
}
