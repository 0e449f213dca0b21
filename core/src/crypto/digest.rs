//! crypto/digest.rs
//! Digest block accumulator.
//!
//! Design notes:
//! - Turns arbitrarily sized `update` calls into whole-block submissions for
//!   the stateless hash primitive, and tells it which segment of the message
//!   each submission is (first, middle, final, only).
//! - One generic accumulator serves SHA-1, SHA-256 and SHA-512; only the
//!   block size and digest length differ.
//! - Nothing but whole blocks reaches the primitive before `finalize`.
//! - Buffer copies happen before the primitive call and `partial_len` is
//!   committed only after it succeeds.
//!
//! Industry notes:
//! - Same shape as an EVP digest method table: init/update/final over a
//!   caller-owned context. Intermediate state is copyable via `Clone`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};
use zeroize::Zeroize;

use crate::constants::MAX_DIGEST_BLOCK_SIZE;
use crate::crypto::types::{DigestAlg, DigestError};
use crate::primitive::{Accelerator, HashContext, SegmentKind};
use crate::telemetry::{SessionCounters, Stage, StageTimes};

#[derive(Clone)]
pub struct DigestAccumulator {
    accel: Arc<dyn Accelerator>,
    alg: DigestAlg,
    ctx: HashContext,
    partial: [u8; MAX_DIGEST_BLOCK_SIZE],
    partial_len: usize,
    finalized: bool,
    counters: SessionCounters,
    times: StageTimes,
}

impl DigestAccumulator {
    pub fn new(accel: Arc<dyn Accelerator>, alg: DigestAlg) -> Self {
        Self {
            accel,
            alg,
            ctx: HashContext::new(),
            partial: [0u8; MAX_DIGEST_BLOCK_SIZE],
            partial_len: 0,
            finalized: false,
            counters: SessionCounters::default(),
            times: StageTimes::default(),
        }
    }

    /// Reset to an empty message. Counters survive re-initialization.
    pub fn init(&mut self) {
        self.ctx = HashContext::new();
        self.partial.zeroize();
        self.partial_len = 0;
        self.finalized = false;
        debug!(alg = %self.alg, backend = self.accel.name(), "digest init");
    }

    pub fn update(&mut self, data: &[u8]) -> Result<(), DigestError> {
        if self.finalized {
            return Err(DigestError::Finalized);
        }
        if data.is_empty() {
            return Ok(());
        }
        self.counters.bytes_hashed += data.len() as u64;

        let bs = self.alg.block_size();
        let mut data = data;

        // Top up a pending partial block first.
        if self.partial_len > 0 {
            let need = bs - self.partial_len;
            if data.len() < need {
                self.partial[self.partial_len..self.partial_len + data.len()].copy_from_slice(data);
                self.partial_len += data.len();
                return Ok(());
            }
            self.partial[self.partial_len..bs].copy_from_slice(&data[..need]);
            let kind = self.next_kind();
            Self::submit(
                &*self.accel,
                self.alg,
                &mut self.ctx,
                &mut self.counters,
                &mut self.times,
                kind,
                &self.partial[..bs],
            )?;
            self.partial_len = 0;
            data = &data[need..];
        }

        let tail = data.len() % bs;
        let whole = data.len() - tail;
        if tail > 0 {
            self.partial[..tail].copy_from_slice(&data[whole..]);
        }
        if whole > 0 {
            let kind = self.next_kind();
            Self::submit(
                &*self.accel,
                self.alg,
                &mut self.ctx,
                &mut self.counters,
                &mut self.times,
                kind,
                &data[..whole],
            )?;
        }
        self.partial_len = tail;
        Ok(())
    }

    /// Write the digest into `out` and return its length.
    ///
    /// The session is unusable until `init` is called again, even if the
    /// final call fails.
    pub fn finalize(&mut self, out: &mut [u8]) -> Result<usize, DigestError> {
        if self.finalized {
            return Err(DigestError::Finalized);
        }
        let need = self.alg.digest_len();
        if out.len() < need {
            return Err(DigestError::OutputTooSmall { need, have: out.len() });
        }

        let kind = if self.ctx.running_length() == 0 {
            SegmentKind::Only
        } else {
            SegmentKind::Final
        };
        self.finalized = true;

        let accel = &*self.accel;
        let alg = self.alg;
        let ctx = &mut self.ctx;
        let tail = &self.partial[..self.partial_len];
        trace!(alg = %alg, kind = %kind, len = tail.len(), "hash segment");
        let res = self
            .times
            .measure(Stage::HashFinal, || accel.hash_segment(alg, kind, tail, ctx, &mut out[..need]));
        self.counters.add_call(res.is_ok());
        self.partial.zeroize();
        self.partial_len = 0;

        if let Err(e) = res {
            warn!(alg = %alg, error = %e, "digest final failed");
            return Err(e.into());
        }
        self.counters.messages_finalized += 1;
        debug!(alg = %alg, total = self.ctx.running_length(), "digest finalized");
        Ok(need)
    }

    #[inline]
    pub fn algorithm(&self) -> DigestAlg {
        self.alg
    }

    #[inline]
    pub fn digest_len(&self) -> usize {
        self.alg.digest_len()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.alg.block_size()
    }

    /// Bytes currently held back waiting for a full block.
    #[inline]
    pub fn pending(&self) -> usize {
        self.partial_len
    }

    /// Bytes already folded into completed blocks.
    #[inline]
    pub fn running_length(&self) -> u64 {
        self.ctx.running_length()
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn stage_times(&self) -> &StageTimes {
        &self.times
    }

    #[inline]
    fn next_kind(&self) -> SegmentKind {
        if self.ctx.running_length() == 0 {
            SegmentKind::First
        } else {
            SegmentKind::Middle
        }
    }

    fn submit(
        accel: &dyn Accelerator,
        alg: DigestAlg,
        ctx: &mut HashContext,
        counters: &mut SessionCounters,
        times: &mut StageTimes,
        kind: SegmentKind,
        blocks: &[u8],
    ) -> Result<(), DigestError> {
        trace!(alg = %alg, kind = %kind, len = blocks.len(), "hash segment");
        let res = times.measure(Stage::Hash, || accel.hash_segment(alg, kind, blocks, ctx, &mut []));
        counters.add_call(res.is_ok());
        match res {
            Ok(()) => {
                counters.add_blocks((blocks.len() / alg.block_size()) as u64);
                Ok(())
            }
            Err(e) => {
                warn!(alg = %alg, kind = %kind, error = %e, "hash segment failed");
                Err(e.into())
            }
        }
    }
}

impl Drop for DigestAccumulator {
    fn drop(&mut self) {
        self.partial.zeroize();
    }
}

impl fmt::Debug for DigestAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestAccumulator")
            .field("alg", &self.alg)
            .field("running_length", &self.ctx.running_length())
            .field("partial_len", &self.partial_len)
            .field("finalized", &self.finalized)
            .finish()
    }
}
