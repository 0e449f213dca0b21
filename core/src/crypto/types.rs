//! crypto/types.rs
//! Algorithm selectors and adapter error types.

use std::convert::TryFrom;
use std::fmt;

use crate::constants::{alg_ids, SHA512_BLOCK_SIZE, SHA_BLOCK_SIZE};
use crate::primitive::PrimitiveError;

/// Supported block digests. One accumulator implementation serves all three.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlg {
    Sha1,
    Sha256,
    Sha512,
}

impl DigestAlg {
    #[inline]
    pub fn block_size(self) -> usize {
        match self {
            DigestAlg::Sha1 | DigestAlg::Sha256 => SHA_BLOCK_SIZE,
            DigestAlg::Sha512 => SHA512_BLOCK_SIZE,
        }
    }

    #[inline]
    pub fn digest_len(self) -> usize {
        match self {
            DigestAlg::Sha1 => 20,
            DigestAlg::Sha256 => 32,
            DigestAlg::Sha512 => 64,
        }
    }

    #[inline]
    pub fn id(self) -> u16 {
        match self {
            DigestAlg::Sha1 => alg_ids::SHA1,
            DigestAlg::Sha256 => alg_ids::SHA256,
            DigestAlg::Sha512 => alg_ids::SHA512,
        }
    }
}

impl TryFrom<u16> for DigestAlg {
    type Error = DigestError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            alg_ids::SHA1 => Ok(DigestAlg::Sha1),
            alg_ids::SHA256 => Ok(DigestAlg::Sha256),
            alg_ids::SHA512 => Ok(DigestAlg::Sha512),
            _ => Err(DigestError::UnknownAlgorithm(value)),
        }
    }
}

impl fmt::Display for DigestAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigestAlg::Sha1 => "sha1",
            DigestAlg::Sha256 => "sha256",
            DigestAlg::Sha512 => "sha512",
        };
        f.write_str(name)
    }
}

/// AES key sizes accepted by the cipher adapters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AesKeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl AesKeySize {
    #[inline]
    pub fn key_len(self) -> usize {
        match self {
            AesKeySize::Aes128 => 16,
            AesKeySize::Aes192 => 24,
            AesKeySize::Aes256 => 32,
        }
    }
}

/// Classic block-cipher modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CipherMode {
    Ecb,
    Cbc,
    /// Full-block (128-bit) cipher feedback.
    Cfb,
    Ofb,
}

impl CipherMode {
    /// ECB and CBC only operate on whole blocks.
    #[inline]
    pub fn requires_whole_blocks(self) -> bool {
        matches!(self, CipherMode::Ecb | CipherMode::Cbc)
    }

    #[inline]
    pub fn uses_iv(self) -> bool {
        !matches!(self, CipherMode::Ecb)
    }
}

/// Digest accumulator errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestError {
    #[error("unknown digest algorithm: 0x{0:04x}")]
    UnknownAlgorithm(u16),

    #[error("digest session already finalized")]
    Finalized,

    #[error("digest output too small: need {need}, have {have}")]
    OutputTooSmall { need: usize, have: usize },

    #[error("digest request failed: {0}")]
    RequestFailed(#[from] PrimitiveError),
}

/// GCM session errors, grouped the way callers must tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GcmError {
    // --- configuration ---
    #[error("key not set")]
    KeyNotSet,
    #[error("iv not set")]
    IvNotSet,
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("invalid iv length: {0}")]
    InvalidIvLength(usize),
    #[error("iv length cannot change after key and iv are installed")]
    IvLengthLocked,
    #[error("invalid tag length: {0}")]
    InvalidTagLength(usize),
    #[error("{op} is not valid on a {direction:?} session")]
    WrongDirection {
        op: &'static str,
        direction: crate::primitive::Direction,
    },
    #[error("iv generation not enabled")]
    IvGenerationDisabled,
    #[error("invalid fixed iv length: fixed={fixed}, iv_len={iv_len}")]
    InvalidFixedIv { fixed: usize, iv_len: usize },
    #[error("invalid record aad")]
    InvalidRecordAad,
    #[error("record too short: {0}")]
    RecordTooShort(usize),
    #[error("output buffer too small: need {need}, have {have}")]
    OutputTooSmall { need: usize, have: usize },
    #[error("tag not available before finalize")]
    TagNotAvailable,
    #[error("expected tag not set")]
    TagNotSet,

    // --- capacity ---
    #[error("aad length limit exceeded")]
    AadLimit,
    #[error("payload length limit exceeded")]
    PayloadLimit,

    // --- ordering ---
    #[error("aad submitted after payload")]
    AadAfterPayload,

    // --- primitive ---
    #[error("gcm request failed: {0}")]
    RequestFailed(#[from] PrimitiveError),

    // --- authentication ---
    #[error("AEAD tag mismatch")]
    TagMismatch,
}

/// Block-cipher session errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("key not set")]
    KeyNotSet,
    #[error("invalid key length: expected={expected}, actual={actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("invalid iv length: {0}")]
    InvalidIvLength(usize),
    #[error("input not block aligned: {0}")]
    NotBlockAligned(usize),
    #[error("stream ended by a partial block")]
    StreamEnded,
    #[error("output buffer too small: need {need}, have {have}")]
    OutputTooSmall { need: usize, have: usize },
    #[error("output buffer required")]
    OutputRequired,
    #[error("cipher request failed: {0}")]
    RequestFailed(#[from] PrimitiveError),
}
