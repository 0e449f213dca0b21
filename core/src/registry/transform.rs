//! registry/transform.rs
//! Capability-set traits implemented by the adapters.
//!
//! Each adapter also has a richer inherent API (record framing, tag control,
//! IV generation on `GcmSession`); the traits cover what every algorithm of
//! a kind shares.

use crate::crypto::{BlockCipherSession, DigestAccumulator, DigestAlg, GcmSession};
use crate::constants::{AES_BLOCK_SIZE, GCM_TAG_LEN};
use crate::primitive::Direction;
use crate::types::EngineError;

// Send so sessions can move to the worker that drives them.
pub trait DigestTransform: Send {
    fn algorithm(&self) -> DigestAlg;
    fn init(&mut self);
    fn update(&mut self, data: &[u8]) -> Result<(), EngineError>;
    /// Write the digest into `out`; returns its length.
    fn finalize(&mut self, out: &mut [u8]) -> Result<usize, EngineError>;
    fn digest_len(&self) -> usize;
    fn block_size(&self) -> usize;
}

pub trait CipherTransform: Send {
    fn init(&mut self, key: Option<&[u8]>, iv: Option<&[u8]>, direction: Direction) -> Result<(), EngineError>;
    /// `output == None` is only meaningful for AEAD (associated data).
    fn update(&mut self, input: &[u8], output: Option<&mut [u8]>) -> Result<usize, EngineError>;
    fn finalize(&mut self) -> Result<(), EngineError>;
    fn key_len(&self) -> usize;
    fn iv_len(&self) -> usize;
    fn block_size(&self) -> usize;
    /// Tag length for AEAD transforms, 0 otherwise.
    fn tag_len(&self) -> usize {
        0
    }
}

impl DigestTransform for DigestAccumulator {
    fn algorithm(&self) -> DigestAlg {
        DigestAccumulator::algorithm(self)
    }

    fn init(&mut self) {
        DigestAccumulator::init(self)
    }

    fn update(&mut self, data: &[u8]) -> Result<(), EngineError> {
        Ok(DigestAccumulator::update(self, data)?)
    }

    fn finalize(&mut self, out: &mut [u8]) -> Result<usize, EngineError> {
        Ok(DigestAccumulator::finalize(self, out)?)
    }

    fn digest_len(&self) -> usize {
        DigestAccumulator::digest_len(self)
    }

    fn block_size(&self) -> usize {
        DigestAccumulator::block_size(self)
    }
}

impl CipherTransform for BlockCipherSession {
    fn init(&mut self, key: Option<&[u8]>, iv: Option<&[u8]>, direction: Direction) -> Result<(), EngineError> {
        Ok(BlockCipherSession::init(self, key, iv, direction)?)
    }

    fn update(&mut self, input: &[u8], output: Option<&mut [u8]>) -> Result<usize, EngineError> {
        let out = output.ok_or(crate::crypto::CipherError::OutputRequired)?;
        Ok(BlockCipherSession::update(self, input, out)?)
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        Ok(BlockCipherSession::finalize(self)?)
    }

    fn key_len(&self) -> usize {
        self.key_size().key_len()
    }

    fn iv_len(&self) -> usize {
        if self.mode().uses_iv() { AES_BLOCK_SIZE } else { 0 }
    }

    fn block_size(&self) -> usize {
        if self.mode().requires_whole_blocks() { AES_BLOCK_SIZE } else { 1 }
    }
}

impl CipherTransform for GcmSession {
    fn init(&mut self, key: Option<&[u8]>, iv: Option<&[u8]>, direction: Direction) -> Result<(), EngineError> {
        Ok(GcmSession::init(self, key, iv, direction)?)
    }

    fn update(&mut self, input: &[u8], output: Option<&mut [u8]>) -> Result<usize, EngineError> {
        Ok(GcmSession::update(self, input, output)?)
    }

    fn finalize(&mut self) -> Result<(), EngineError> {
        Ok(GcmSession::finalize(self)?)
    }

    fn key_len(&self) -> usize {
        self.key_size().key_len()
    }

    fn iv_len(&self) -> usize {
        GcmSession::iv_len(self)
    }

    fn block_size(&self) -> usize {
        1
    }

    fn tag_len(&self) -> usize {
        GCM_TAG_LEN
    }
}
