//! crypto/types.rs
//! Shared sizes and error types for the crypto layer.

/// Stable key size for every derived key.
pub const KEY_LEN_32: usize = 32;

/// Standard 12-byte nonce length for AES-GCM and ChaCha20-Poly1305.
pub const NONCE_LEN_12: usize = 12;

/// Fixed AEAD tag length (bytes).
pub const TAG_LEN: usize = 16;

/// Forward-secrecy token length.
pub const TOKEN_LEN: usize = 32;

/// Length of the intermediate backup id derived from master key + account id.
pub const BACKUP_ID_LEN: usize = 16;

/// Credential validation failures.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid master key length: expected={expected}, actual={actual}")]
    InvalidMasterKeyLen { expected: usize, actual: usize },

    #[error("master key must not be all zero")]
    ZeroMasterKey,

    #[error("account id length {len} outside 1..={max}")]
    InvalidAccountId { len: usize, max: usize },

    #[error("invalid forward-secrecy token length: expected={expected}, actual={actual}")]
    InvalidTokenLen { expected: usize, actual: usize },

    #[error("forward-secrecy token must not be all zero")]
    ZeroToken,

    #[error("forward-secrecy metadata length {len} outside 1..={max}")]
    InvalidMetadata { len: usize, max: usize },

    #[error("HKDF expand failed: {0}")]
    Expand(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Invalid key length provided to cipher.
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLen { expected: usize, actual: usize },

    /// Nonce length mismatch (must be 12 bytes for supported ciphers).
    #[error("invalid nonce length: expected={expected}, actual={actual}")]
    InvalidNonceLen { expected: usize, actual: usize },

    /// Container salt is all zeros.
    #[error("invalid salt: all zeros")]
    InvalidSalt,

    /// Chunk counter ran out of nonce space.
    #[error("chunk counter exhausted")]
    CounterExhausted,

    /// Ciphertext shorter than the tag plus chunk prefix.
    #[error("chunk too short: {have} < {need}")]
    ChunkTooShort { have: usize, need: usize },

    /// AEAD tag mismatch (authentication failure).
    #[error("AEAD tag mismatch")]
    TagMismatch,

    /// Container trailer MAC mismatch.
    #[error("container MAC mismatch")]
    MacMismatch,

    /// Subkey derivation failure.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// General runtime error with context.
    #[error("crypto failure: {0}")]
    Failure(String),
}
