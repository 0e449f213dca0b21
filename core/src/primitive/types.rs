//! primitive/types.rs
//! Value types exchanged with the accelerator.
//!
//! Every call into the accelerator is one-shot: nothing is retained between
//! calls, so all running state (hash chaining value, GCM counter block, tag
//! material) lives in these caller-owned types and is passed in and out.

use std::collections::BTreeSet;
use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{AES_BLOCK_SIZE, MAX_DIGEST_LEN};
use crate::registry::AlgorithmId;

/// One AES/GCM block (counter block, subkey, tag material).
pub type GcmBlock = [u8; AES_BLOCK_SIZE];

/// Position of a block sequence within a message, as the hash primitive
/// needs to know it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// First whole-block segment of a multi-segment message.
    First,
    /// Interior whole-block segment.
    Middle,
    /// Trailing (possibly empty, possibly partial) segment after a `First`.
    Final,
    /// Entire message in a single call.
    Only,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::First  => "first",
            SegmentKind::Middle => "middle",
            SegmentKind::Final  => "final",
            SegmentKind::Only   => "only",
        };
        f.write_str(name)
    }
}

/// Transform direction. Fixed per session at key-install time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Encrypt,
    Decrypt,
}

impl Direction {
    #[inline]
    pub fn is_encrypt(self) -> bool {
        self == Direction::Encrypt
    }
}

/// Caller-owned running hash context.
///
/// `running_length` counts bytes already folded into the chaining value.
/// The chaining value is an opaque buffer owned by the accelerator's format;
/// the soft backend stores big-endian state words in it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HashContext {
    running_length: u64,
    chaining: [u8; MAX_DIGEST_LEN],
}

impl HashContext {
    pub fn new() -> Self {
        Self {
            running_length: 0,
            chaining: [0u8; MAX_DIGEST_LEN],
        }
    }

    /// Bytes already folded into completed blocks.
    #[inline]
    pub fn running_length(&self) -> u64 {
        self.running_length
    }

    /// Record `n` more bytes as folded in.
    #[inline]
    pub fn advance(&mut self, n: u64) {
        self.running_length = self.running_length.wrapping_add(n);
    }

    #[inline]
    pub fn chaining_value(&self) -> &[u8; MAX_DIGEST_LEN] {
        &self.chaining
    }

    #[inline]
    pub fn chaining_value_mut(&mut self) -> &mut [u8; MAX_DIGEST_LEN] {
        &mut self.chaining
    }
}

impl Default for HashContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HashContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashContext")
            .field("running_length", &self.running_length)
            .finish_non_exhaustive()
    }
}

/// Material derived by `gcm_initialize` from (key, IV).
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct GcmDerived {
    /// Initial counter block (J0), consumed at tag time.
    pub icb: GcmBlock,
    /// Usage counter block, threaded through every intermediate call.
    pub ucb: GcmBlock,
    /// Hash subkey H.
    pub subkey: GcmBlock,
}

/// Result of platform capability probing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether a crypto card (as opposed to CPU-only assist) is online.
    pub card_online: bool,
    /// Algorithms the accelerator can execute.
    pub algorithms: BTreeSet<AlgorithmId>,
}

impl Capabilities {
    #[inline]
    pub fn supports(&self, id: AlgorithmId) -> bool {
        self.algorithms.contains(&id)
    }
}

/// Accelerator call failures. Fail-fast and never retried by the adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrimitiveError {
    #[error("accelerator request failed: {op}")]
    RequestFailed { op: &'static str },

    #[error("segment kind {kind} rejected (running_length={running_length}, len={len})")]
    InvalidSegment {
        kind: SegmentKind,
        running_length: u64,
        len: usize,
    },

    #[error("invalid length for {what}: {len}")]
    InvalidLength { what: &'static str, len: usize },

    #[error("operation not supported by accelerator: {0}")]
    Unsupported(&'static str),

    #[error("random source unavailable")]
    RandomUnavailable,
}
