//! primitive/soft/mod.rs
//! In-process reference accelerator.
//!
//! Implements the Fixed Primitive Interface on top of the RustCrypto
//! compression functions and block ciphers. It enforces the same call
//! contract a hardware backend would (segment kinds, whole blocks), so any
//! adapter misuse surfaces as a `PrimitiveError`.

mod block;
mod gcm;
mod hash;

use std::collections::BTreeSet;

use rand::RngCore;
use rand::rngs::OsRng;

use crate::crypto::types::{CipherMode, DigestAlg};
use crate::primitive::types::{
    Capabilities, Direction, GcmBlock, GcmDerived, HashContext, PrimitiveError, SegmentKind,
};
use crate::primitive::{
    Accelerator, BlockCipherPrimitive, CapabilityProbe, GcmPrimitive, HashPrimitive, RandomSource,
};
use crate::registry::AlgorithmId;

#[derive(Clone, Debug)]
pub struct SoftAccelerator {
    capabilities: Capabilities,
}

impl SoftAccelerator {
    /// Backend advertising every algorithm it implements.
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                card_online: true,
                algorithms: AlgorithmId::ALL.iter().copied().collect(),
            },
        }
    }

    /// Backend advertising only `algorithms` (simulates a partially equipped
    /// platform for capability probing).
    pub fn with_algorithms(card_online: bool, algorithms: impl IntoIterator<Item = AlgorithmId>) -> Self {
        Self {
            capabilities: Capabilities {
                card_online,
                algorithms: algorithms.into_iter().collect::<BTreeSet<_>>(),
            },
        }
    }
}

impl Default for SoftAccelerator {
    fn default() -> Self {
        Self::new()
    }
}

impl HashPrimitive for SoftAccelerator {
    fn hash_segment(
        &self,
        alg: DigestAlg,
        kind: SegmentKind,
        data: &[u8],
        ctx: &mut HashContext,
        out: &mut [u8],
    ) -> Result<(), PrimitiveError> {
        hash::hash_segment(alg, kind, data, ctx, out)
    }
}

impl GcmPrimitive for SoftAccelerator {
    fn gcm_initialize(
        &self,
        iv: &[u8],
        key: &[u8],
        direction: Direction,
    ) -> Result<GcmDerived, PrimitiveError> {
        gcm::initialize(iv, key, direction)
    }

    fn gcm_intermediate(
        &self,
        buf: &mut [u8],
        ucb: &mut GcmBlock,
        aad: &[u8],
        tag_material: &mut GcmBlock,
        key: &[u8],
        subkey: &GcmBlock,
        direction: Direction,
    ) -> Result<(), PrimitiveError> {
        gcm::intermediate(buf, ucb, aad, tag_material, key, subkey, direction)
    }

    fn gcm_last(
        &self,
        icb: &GcmBlock,
        aad_len: u64,
        payload_len: u64,
        tag_material: &GcmBlock,
        key: &[u8],
        subkey: &GcmBlock,
        _direction: Direction,
    ) -> Result<GcmBlock, PrimitiveError> {
        gcm::last(icb, aad_len, payload_len, tag_material, key, subkey)
    }
}

impl BlockCipherPrimitive for SoftAccelerator {
    fn block_cipher(
        &self,
        mode: CipherMode,
        direction: Direction,
        key: &[u8],
        iv: &mut GcmBlock,
        buf: &mut [u8],
    ) -> Result<(), PrimitiveError> {
        block::block_cipher(mode, direction, key, iv, buf)
    }
}

impl RandomSource for SoftAccelerator {
    fn random_bytes(&self, buf: &mut [u8]) -> Result<(), PrimitiveError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|_| PrimitiveError::RandomUnavailable)
    }
}

impl CapabilityProbe for SoftAccelerator {
    fn capabilities(&self) -> Result<Capabilities, PrimitiveError> {
        Ok(self.capabilities.clone())
    }
}

impl Accelerator for SoftAccelerator {
    fn name(&self) -> &'static str {
        "soft"
    }
}
