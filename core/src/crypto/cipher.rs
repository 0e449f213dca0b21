//! crypto/cipher.rs
//! AES block-mode session (ECB, CBC, CFB128, OFB) over the one-shot
//! block-cipher primitive.
//!
//! Design notes:
//! - The primitive is stateless, so the session carries the chaining value
//!   between calls. How it moves depends on the mode:
//!   - ECB: no chaining value.
//!   - CBC: the last ciphertext block of the call. On encrypt that is the
//!     last output block; on decrypt it is the last input block, captured
//!     before the in-place transform overwrites it.
//!   - CFB/OFB: the primitive advances the feedback register itself.
//! - ECB/CBC calls must be whole blocks. CFB/OFB accept any length, but a
//!   call that ends mid-block ends the stream: the primitive cannot resume
//!   inside a block.
//! - No padding at this layer.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use zeroize::Zeroize;

use crate::constants::AES_BLOCK_SIZE;
use crate::crypto::types::{AesKeySize, CipherError, CipherMode};
use crate::primitive::{Accelerator, Direction, GcmBlock};
use crate::telemetry::{SessionCounters, Stage, StageTimes};

#[derive(Clone)]
pub struct BlockCipherSession {
    accel: Arc<dyn Accelerator>,
    key_size: AesKeySize,
    mode: CipherMode,
    key: [u8; 32],
    key_set: bool,
    iv: GcmBlock,
    direction: Direction,
    ended: bool,
    counters: SessionCounters,
    times: StageTimes,
}

impl BlockCipherSession {
    pub fn new(accel: Arc<dyn Accelerator>, key_size: AesKeySize, mode: CipherMode) -> Self {
        Self {
            accel,
            key_size,
            mode,
            key: [0u8; 32],
            key_set: false,
            iv: [0u8; AES_BLOCK_SIZE],
            direction: Direction::Encrypt,
            ended: false,
            counters: SessionCounters::default(),
            times: StageTimes::default(),
        }
    }

    /// Install key and/or IV. ECB ignores the IV.
    pub fn init(&mut self, key: Option<&[u8]>, iv: Option<&[u8]>, direction: Direction) -> Result<(), CipherError> {
        if let Some(k) = key {
            let expected = self.key_size.key_len();
            if k.len() != expected {
                return Err(CipherError::InvalidKeyLength { expected, actual: k.len() });
            }
        }
        if let Some(v) = iv {
            if self.mode.uses_iv() && v.len() != AES_BLOCK_SIZE {
                return Err(CipherError::InvalidIvLength(v.len()));
            }
        }

        if let Some(k) = key {
            self.key.zeroize();
            self.key[..k.len()].copy_from_slice(k);
            self.key_set = true;
            self.direction = direction;
        }
        if let Some(v) = iv {
            if self.mode.uses_iv() {
                self.iv.copy_from_slice(v);
            }
        }
        self.ended = false;
        debug!(mode = ?self.mode, key_size = ?self.key_size, direction = ?self.direction, "cipher init");
        Ok(())
    }

    /// Transform `input` into `output[..input.len()]`.
    pub fn update(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CipherError> {
        if !self.key_set {
            return Err(CipherError::KeyNotSet);
        }
        if self.ended {
            return Err(CipherError::StreamEnded);
        }
        if output.len() < input.len() {
            return Err(CipherError::OutputTooSmall { need: input.len(), have: output.len() });
        }
        if input.is_empty() {
            return Ok(0);
        }
        if self.mode.requires_whole_blocks() && input.len() % AES_BLOCK_SIZE != 0 {
            return Err(CipherError::NotBlockAligned(input.len()));
        }

        let n = input.len();
        let out = &mut output[..n];
        out.copy_from_slice(input);

        // CBC decrypt chains on the last ciphertext block, which the
        // in-place transform is about to overwrite.
        let mut next_iv = [0u8; AES_BLOCK_SIZE];
        if self.mode == CipherMode::Cbc && !self.direction.is_encrypt() {
            next_iv.copy_from_slice(&input[n - AES_BLOCK_SIZE..]);
        }

        let accel = &*self.accel;
        let (mode, direction) = (self.mode, self.direction);
        let key = &self.key[..self.key_size.key_len()];
        let mut iv = self.iv;

        trace!(mode = ?mode, len = n, "block cipher");
        let res = self
            .times
            .measure(Stage::Cipher, || accel.block_cipher(mode, direction, key, &mut iv, &mut *out));
        self.counters.add_call(res.is_ok());
        if let Err(e) = res {
            warn!(mode = ?mode, error = %e, "block cipher failed");
            out.zeroize();
            return Err(e.into());
        }

        match (mode, direction) {
            (CipherMode::Ecb, _) => {}
            (CipherMode::Cbc, Direction::Encrypt) => self.iv.copy_from_slice(&out[n - AES_BLOCK_SIZE..]),
            (CipherMode::Cbc, Direction::Decrypt) => self.iv = next_iv,
            (CipherMode::Cfb | CipherMode::Ofb, _) => {
                self.iv = iv;
                if n % AES_BLOCK_SIZE != 0 {
                    self.ended = true;
                }
            }
        }
        iv.zeroize();
        self.counters.payload_bytes += n as u64;
        Ok(n)
    }

    /// No padding, nothing buffered: only closes the stream.
    pub fn finalize(&mut self) -> Result<(), CipherError> {
        if !self.key_set {
            return Err(CipherError::KeyNotSet);
        }
        self.ended = true;
        self.counters.messages_finalized += 1;
        debug!(mode = ?self.mode, bytes = self.counters.payload_bytes, "cipher finalized");
        Ok(())
    }

    #[inline]
    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    #[inline]
    pub fn key_size(&self) -> AesKeySize {
        self.key_size
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current chaining value / feedback register.
    #[inline]
    pub fn iv(&self) -> &GcmBlock {
        &self.iv
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn stage_times(&self) -> &StageTimes {
        &self.times
    }
}

impl Drop for BlockCipherSession {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl fmt::Debug for BlockCipherSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCipherSession")
            .field("key_size", &self.key_size)
            .field("mode", &self.mode)
            .field("direction", &self.direction)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}
