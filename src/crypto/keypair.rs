//! The server's signing key.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};

use crate::crypto::hashing::{address_from_ed25519_public_key, transaction_intent_digest, ED25519_FLAG};
use crate::error::KeyError;

/// An ed25519 keypair that signs ledger transactions on behalf of the wallet.
pub struct SuiKeypair {
    signing_key: SigningKey,
}

impl SuiKeypair {
    /// Parses a hex secret key.
    ///
    /// Accepts the raw 32-byte secret (with or without `0x`) or the 33-byte
    /// keystore form whose first byte is the scheme flag.
    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let trimmed = secret_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed)?;

        let secret: &[u8] = match bytes.len() {
            32 => &bytes,
            33 if bytes[0] == ED25519_FLAG => &bytes[1..],
            33 => return Err(KeyError::Scheme(bytes[0])),
            n => return Err(KeyError::Length(n)),
        };

        let mut seed = [0u8; 32];
        seed.copy_from_slice(secret);
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The account address controlled by this key.
    pub fn address(&self) -> String {
        address_from_ed25519_public_key(&self.public_key())
    }

    /// Signs serialized transaction bytes and returns the base64 serialized
    /// signature (`flag || signature || public key`).
    pub fn sign_transaction(&self, tx_bytes: &[u8]) -> String {
        let digest = transaction_intent_digest(tx_bytes);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());
        BASE64.encode(serialized)
    }
}

impl std::fmt::Debug for SuiKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuiKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
