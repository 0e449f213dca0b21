//! constants.rs
//! Stable sizes and algorithm identifiers shared by the adapters.

/// SHA-1 and SHA-256 input block size (bytes).
pub const SHA_BLOCK_SIZE: usize = 64;
/// SHA-512 input block size (bytes).
pub const SHA512_BLOCK_SIZE: usize = 128;
/// Largest block size of any supported digest.
pub const MAX_DIGEST_BLOCK_SIZE: usize = SHA512_BLOCK_SIZE;
/// Largest digest output (SHA-512).
pub const MAX_DIGEST_LEN: usize = 64;

/// AES block size (bytes).
pub const AES_BLOCK_SIZE: usize = 16;

/// GCM tag length produced by the accelerator (bytes).
pub const GCM_TAG_LEN: usize = 16;
/// Default GCM IV length (96-bit nonce).
pub const GCM_DEFAULT_IV_LEN: usize = 12;
/// IV lengths up to this size live inline in the session.
pub const GCM_EMBEDDED_IV_LEN: usize = 16;
/// Minimum fixed IV prefix when the remainder is generated.
pub const GCM_MIN_FIXED_IV_LEN: usize = 4;
/// Minimum generated (invocation) part of the IV.
pub const GCM_MIN_INVOCATION_IV_LEN: usize = 8;

/// Upper bound on total associated data per message (bytes, exclusive).
pub const GCM_MAX_AAD_LEN: u64 = 1 << 61;
/// Upper bound on total payload per message (bytes, exclusive).
pub const GCM_MAX_PAYLOAD_LEN: u64 = (1 << 36) - 32;

/// Record-layer framing: explicit nonce carried in front of each record.
pub const TLS_EXPLICIT_IV_LEN: usize = 8;
/// Record-layer framing: tag appended to each record.
pub const TLS_TAG_LEN: usize = 16;
/// Record-layer framing: pseudo header authenticated as AAD.
pub const TLS_AAD_LEN: usize = 13;

/// Algorithm identifiers (mirrored by `registry::AlgorithmId`).
pub mod alg_ids {
    pub const SHA1: u16   = 0x0101;
    pub const SHA256: u16 = 0x0102;
    pub const SHA512: u16 = 0x0103;

    pub const AES128_ECB: u16 = 0x0201;
    pub const AES128_CBC: u16 = 0x0202;
    pub const AES128_CFB: u16 = 0x0203;
    pub const AES128_OFB: u16 = 0x0204;
    pub const AES128_GCM: u16 = 0x0205;

    pub const AES192_ECB: u16 = 0x0301;
    pub const AES192_CBC: u16 = 0x0302;
    pub const AES192_CFB: u16 = 0x0303;
    pub const AES192_OFB: u16 = 0x0304;
    pub const AES192_GCM: u16 = 0x0305;

    pub const AES256_ECB: u16 = 0x0401;
    pub const AES256_CBC: u16 = 0x0402;
    pub const AES256_CFB: u16 = 0x0403;
    pub const AES256_OFB: u16 = 0x0404;
    pub const AES256_GCM: u16 = 0x0405;
}
