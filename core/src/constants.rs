/// Magic for the AAD domain of every container chunk.
/// "BKC1" = Backup Container v1
pub const MAGIC_BKC1: [u8; 4] = *b"BKC1";

/// Magic for the header record carried as the first frame.
/// "BKH1" = Backup Header v1
pub const MAGIC_BKH1: [u8; 4] = *b"BKH1";

/// Container format version bound into every chunk AAD.
pub const CONTAINER_VERSION: u16 = 1;

/// Header record version.
pub const HEADER_V1: u16 = 1;

/// Defaults when the caller does not pick a chunk size.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB

/// Chunk sizes (plaintext bytes per chunk, including the 4-byte used-length prefix).
pub const ALLOWED_CHUNK_SIZES: &[usize] = &[
    16 * 1024,   // 16 KiB
    32 * 1024,   // 32 KiB
    64 * 1024,   // 64 KiB
    128 * 1024,  // 128 KiB
    256 * 1024,  // 256 KiB
    1024 * 1024, // 1 MiB
];

/// Upper bound for a single frame payload (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Hard ceiling any configuration may raise the frame limit to (256 MiB).
pub const MAX_FRAME_LEN_CEILING: u32 = 256 * 1024 * 1024;

/// Length prefix of a frame on the content stream.
pub const FRAME_PREFIX_LEN: usize = 4;

/// Per-chunk plaintext prefix carrying the count of content bytes.
pub const CHUNK_PREFIX_LEN: usize = 4;

/// Random per-container salt written in the clear at offset 0.
pub const SALT_LEN: usize = 16;

/// HMAC-SHA256 trailer over salt + chunk wire.
pub const MAC_LEN: usize = 32;

/// Smallest padding bucket; everything below pads up to this.
pub const MIN_BUCKET_SIZE: u64 = 16 * 1024;

/// Geometric growth of bucket boundaries: b(k+1) = ceil(b(k) * NUM / DEN).
pub const BUCKET_GROWTH_NUM: u64 = 21;
pub const BUCKET_GROWTH_DEN: u64 = 20;

/// Metadata limits (header metadata and forward-secrecy metadata).
pub const MAX_METADATA_LEN: usize = 64 * 1024;

/// Account identifiers are opaque byte strings of bounded size.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Cipher suite identifiers.
pub mod cipher_ids {
    pub const AES256_GCM: u16        = 0x0001;
    pub const CHACHA20_POLY1305: u16 = 0x0002;
}

/// HKDF info labels. Changing any of these breaks every existing container.
pub mod labels {
    pub const BACKUP_ID: &[u8]      = b"backup-container/v1/backup-id";
    pub const LOCAL: &[u8]          = b"backup-container/v1/local";
    pub const FORWARD_SECRET: &[u8] = b"backup-container/v1/forward-secret";
    pub const CHUNK_KEY: &[u8]      = b"backup-container/v1/chunk-key";
    pub const NONCE: &[u8]          = b"backup-container/v1/nonce";
    pub const MAC_KEY: &[u8]        = b"backup-container/v1/mac-key";
}
