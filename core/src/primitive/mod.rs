//! primitive/mod.rs
//! Fixed Primitive Interface.
//!
//! Design notes:
//! - These are the only calls the adapters make into the accelerator.
//! - Each call is a complete, synchronous operation; the accelerator keeps no
//!   state between calls. Callers pass every running value in and out.
//! - Failures are fail-fast and are not retried by the adapters.
//! - `SoftAccelerator` is the in-process reference backend. Hardware
//!   backends implement the same traits.

pub mod types;
pub mod soft;

pub use types::*;
pub use soft::SoftAccelerator;

use crate::crypto::types::{CipherMode, DigestAlg};

/// Block-oriented hash compression with segment-kind signalling.
pub trait HashPrimitive {
    /// Fold `data` into `ctx`.
    ///
    /// `First` and `Middle` accept whole blocks only. `Final` and `Only`
    /// accept the trailing bytes and write the digest into `out`; for
    /// `First`/`Middle` the intermediate chaining value is written instead.
    fn hash_segment(
        &self,
        alg: DigestAlg,
        kind: SegmentKind,
        data: &[u8],
        ctx: &mut HashContext,
        out: &mut [u8],
    ) -> Result<(), PrimitiveError>;
}

/// Call-once-per-step AES-GCM.
pub trait GcmPrimitive {
    /// Derive the initial counter block, usage counter block and subkey.
    fn gcm_initialize(
        &self,
        iv: &[u8],
        key: &[u8],
        direction: Direction,
    ) -> Result<GcmDerived, PrimitiveError>;

    /// Transform `buf` in place and fold `aad` then the ciphertext into
    /// `tag_material`. An AAD-only call passes an empty `buf`.
    #[allow(clippy::too_many_arguments)]
    fn gcm_intermediate(
        &self,
        buf: &mut [u8],
        ucb: &mut GcmBlock,
        aad: &[u8],
        tag_material: &mut GcmBlock,
        key: &[u8],
        subkey: &GcmBlock,
        direction: Direction,
    ) -> Result<(), PrimitiveError>;

    /// Combine the tag material with the total lengths into the full tag.
    #[allow(clippy::too_many_arguments)]
    fn gcm_last(
        &self,
        icb: &GcmBlock,
        aad_len: u64,
        payload_len: u64,
        tag_material: &GcmBlock,
        key: &[u8],
        subkey: &GcmBlock,
        direction: Direction,
    ) -> Result<GcmBlock, PrimitiveError>;
}

/// One-shot AES in a classic block mode.
pub trait BlockCipherPrimitive {
    /// Transform `buf` in place. The key size is taken from `key.len()`.
    ///
    /// For CFB/OFB the feedback register `iv` is advanced in place; for
    /// ECB/CBC it is left untouched and chaining is the caller's job.
    fn block_cipher(
        &self,
        mode: CipherMode,
        direction: Direction,
        key: &[u8],
        iv: &mut GcmBlock,
        buf: &mut [u8],
    ) -> Result<(), PrimitiveError>;
}

/// Random-byte passthrough.
pub trait RandomSource {
    fn random_bytes(&self, buf: &mut [u8]) -> Result<(), PrimitiveError>;
}

/// Platform capability probing.
pub trait CapabilityProbe {
    fn capabilities(&self) -> Result<Capabilities, PrimitiveError>;
}

/// Everything the adapters need from one accelerator.
pub trait Accelerator:
    HashPrimitive + GcmPrimitive + BlockCipherPrimitive + RandomSource + CapabilityProbe + Send + Sync
{
    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
