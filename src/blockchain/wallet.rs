//! Local key management and message signing.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use ed25519_dalek::{Signer, SigningKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;
use tiny_keccak::{Hasher, Sha3};

use crate::blockchain::types::{AccountAddress, ChainError, ChainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "CONTEST_PRIVATE_KEY";

/// Authentication key scheme byte for single ed25519 keys.
const ED25519_SCHEME: u8 = 0x00;

/// An ed25519 account key held in memory.
pub struct LocalWallet {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded 32-byte private key.
    ///
    /// Accepts the key with or without a `0x` prefix. The key itself is never
    /// logged.
    pub fn from_private_key(private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let mut secret = [0u8; SECRET_KEY_LENGTH];
        hex::decode_to_slice(key_hex, &mut secret).map_err(|e| {
            ChainError::Wallet(format!("Invalid private key format: {}", e))
        })?;

        let wallet = Self::from_signing_key(SigningKey::from_bytes(&secret));
        tracing::info!(address = %wallet.address, "Wallet initialized");
        Ok(wallet)
    }

    /// Load wallet from environment variable.
    ///
    /// Reads `CONTEST_PRIVATE_KEY` from environment.
    pub fn from_env() -> ChainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ChainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = derive_address(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// Get the wallet's account address.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// `0x`-prefixed hex of the public key.
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.verifying_key().as_bytes()))
    }

    /// `0x`-prefixed hex of the private key, for `keygen` output only.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// Sign a message, returning the 64-byte signature as `0x`-prefixed hex.
    pub fn sign(&self, message: &[u8]) -> String {
        let signature = self.signing_key.sign(message);
        format!("0x{}", hex::encode(signature.to_bytes()))
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Account address of a single-key account: SHA3-256(public_key ‖ scheme).
pub fn derive_address(public_key: &[u8]) -> AccountAddress {
    let mut hasher = Sha3::v256();
    hasher.update(public_key);
    hasher.update(&[ED25519_SCHEME]);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    AccountAddress::new(output)
}
