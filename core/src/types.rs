use std::io;

use crate::{
    config::ConfigError,
    crypto::{CryptoError, KeyError},
    headers::HeaderError,
    stream::framing::FrameError,
};

/// Unified container error covering I/O, framing, crypto, key derivation and sequencing.
/// - `From<T>` impls let `?` cross every layer.
/// - None of these are retryable here; the caller decides on retry policy.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// A length prefix ended early or exceeded the frame ceiling.
    #[error("malformed length: {0}")]
    MalformedLength(String),

    /// Fewer bytes than announced were available.
    #[error("truncated: {0}")]
    Truncated(String),

    /// Tag or MAC mismatch. Tamper, corruption, or the wrong key profile.
    #[error("authentication failure: {0}")]
    AuthenticationFailure(String),

    /// Writer/reader method called in the wrong state.
    #[error("sequencing error: {0}")]
    Sequencing(String),

    /// Invalid or missing credential input.
    #[error("key derivation error: {0}")]
    KeyDerivation(#[from] KeyError),

    /// Header record failed to decode or validate.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// Invalid container configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Sink or source I/O error.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;

impl From<io::Error> for BackupError {
    fn from(e: io::Error) -> Self {
        // Errors raised inside a decrypting `Read` adapter travel through
        // io::Error; unwrap them back into their original variant.
        if e.get_ref().map_or(false, |inner| inner.is::<BackupError>()) {
            if let Some(inner) = e.into_inner() {
                if let Ok(err) = inner.downcast::<BackupError>() {
                    return *err;
                }
            }
            return BackupError::Io(io::Error::other("unrecoverable wrapped error"));
        }
        BackupError::Io(e)
    }
}

impl From<FrameError> for BackupError {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::PartialPrefix { .. } | FrameError::TooLarge { .. } => {
                BackupError::MalformedLength(e.to_string())
            }
            FrameError::Truncated { .. } => BackupError::Truncated(e.to_string()),
            FrameError::Io(io) => BackupError::from(io),
        }
    }
}

impl From<CryptoError> for BackupError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::TagMismatch | CryptoError::MacMismatch => {
                BackupError::AuthenticationFailure(e.to_string())
            }
            CryptoError::ChunkTooShort { .. } => BackupError::Truncated(e.to_string()),
            CryptoError::Key(k) => BackupError::KeyDerivation(k),
            other => BackupError::AuthenticationFailure(other.to_string()),
        }
    }
}

impl BackupError {
    /// Wrap into an `io::Error` so the error can cross a `Read` boundary intact.
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            BackupError::Io(e) => e,
            other => io::Error::other(other),
        }
    }
}
