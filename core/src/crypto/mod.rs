pub mod types;
pub mod keys;
pub mod kdf;
pub mod aad;
pub mod aead;
pub mod nonce;
pub mod mac;

pub use types::*;
pub use keys::*;
pub use kdf::*;
pub use aad::*;
pub use aead::*;
pub use nonce::*;
pub use mac::*;
