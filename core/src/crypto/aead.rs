//! crypto/aead.rs
//! AES-GCM session controller over a call-once-per-step primitive.
//!
//! Design notes:
//! - Key and IV may be installed independently and in either order; the
//!   derived material (counter blocks, subkey) is recomputed as soon as both
//!   are present and every per-message counter is reset with it.
//! - AAD and payload may arrive in chunks of any size. The primitive cannot
//!   resume in the middle of a block, so the session keeps a checkpoint
//!   (counter block and tag material as of the last whole block) plus the
//!   pending input bytes, and re-runs the trailing partial block from that
//!   checkpoint when more data arrives.
//! - Direction is fixed when the key is installed.
//! - Decrypt verification is constant-time and fails closed: tag material is
//!   wiped and record plaintext is zeroed before the error is returned.
//!
//! Industry notes:
//! - Record framing follows the 8-byte explicit nonce / 16-byte tag
//!   convention of AES-GCM transport records, with a 13-byte pseudo header
//!   as associated data.
//! - IV generation keeps a fixed prefix and a 64-bit big-endian invocation
//!   counter in the trailing 8 bytes.

use std::fmt;
use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, trace, warn};
use zeroize::Zeroize;

use crate::constants::{
    AES_BLOCK_SIZE, GCM_MAX_AAD_LEN, GCM_MAX_PAYLOAD_LEN, GCM_MIN_FIXED_IV_LEN,
    GCM_MIN_INVOCATION_IV_LEN, GCM_TAG_LEN, TLS_EXPLICIT_IV_LEN, TLS_TAG_LEN,
};
use crate::crypto::aad::RecordAad;
use crate::crypto::nonce::IvBuffer;
use crate::crypto::types::{AesKeySize, GcmError};
use crate::primitive::{Accelerator, Direction, GcmBlock, GcmDerived};
use crate::telemetry::{SessionCounters, Stage, StageTimes};

/// Externally visible lifecycle of a GCM session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GcmState {
    Uninitialized,
    KeySet,
    IvSet,
    Aad,
    Payload,
    Finalized,
}

impl fmt::Display for GcmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GcmState::Uninitialized => "uninitialized",
            GcmState::KeySet        => "key_set",
            GcmState::IvSet         => "iv_set",
            GcmState::Aad           => "aad",
            GcmState::Payload       => "payload",
            GcmState::Finalized     => "finalized",
        };
        f.write_str(name)
    }
}

/// Running values as of the last whole block, plus the input bytes of the
/// trailing partial block.
#[derive(Clone, Default, Zeroize)]
struct Checkpoint {
    ucb: GcmBlock,
    tag_material: GcmBlock,
    pending: GcmBlock,
    pending_len: usize,
}

#[derive(Clone)]
pub struct GcmSession {
    accel: Arc<dyn Accelerator>,
    key_size: AesKeySize,
    key: [u8; 32],
    key_set: bool,
    direction: Direction,

    iv: IvBuffer,
    iv_set: bool,
    iv_gen: bool,
    // Start of the invocation part still owed its random fill (prefix
    // installed before the key fixed the direction).
    iv_fill_from: Option<usize>,

    derived: GcmDerived,
    tag_material: GcmBlock,
    checkpoint: Checkpoint,
    aad_len: u64,
    payload_len: u64,

    tag: GcmBlock,
    expected_tag: GcmBlock,
    expected_len: Option<usize>,
    record_aad: Option<RecordAad>,

    state: GcmState,
    counters: SessionCounters,
    times: StageTimes,
}

impl GcmSession {
    pub fn new(accel: Arc<dyn Accelerator>, key_size: AesKeySize, iv_len: usize) -> Result<Self, GcmError> {
        if iv_len == 0 {
            return Err(GcmError::InvalidIvLength(iv_len));
        }
        Ok(Self {
            accel,
            key_size,
            key: [0u8; 32],
            key_set: false,
            direction: Direction::Encrypt,
            iv: IvBuffer::with_len(iv_len),
            iv_set: false,
            iv_gen: false,
            iv_fill_from: None,
            derived: GcmDerived::default(),
            tag_material: [0u8; AES_BLOCK_SIZE],
            checkpoint: Checkpoint::default(),
            aad_len: 0,
            payload_len: 0,
            tag: [0u8; AES_BLOCK_SIZE],
            expected_tag: [0u8; AES_BLOCK_SIZE],
            expected_len: None,
            record_aad: None,
            state: GcmState::Uninitialized,
            counters: SessionCounters::default(),
            times: StageTimes::default(),
        })
    }

    // ---------------------------------------------------------------------
    // Key / IV installation
    // ---------------------------------------------------------------------

    /// Combined install. Either part may be absent; when both end up present
    /// the session material is derived once.
    pub fn init(&mut self, key: Option<&[u8]>, iv: Option<&[u8]>, direction: Direction) -> Result<(), GcmError> {
        if let Some(k) = key {
            self.check_key(k)?;
        }
        if let Some(v) = iv {
            self.check_iv(v)?;
        }

        if let Some(v) = iv {
            self.iv.as_mut_slice().copy_from_slice(v);
            self.iv_set = true;
            self.iv_gen = false;
            self.iv_fill_from = None;
        }
        match key {
            Some(k) => self.install_key(k, direction),
            None if iv.is_some() && self.key_set => self.derive(),
            None => Ok(()),
        }
    }

    /// Install the key and fix the direction. Derives immediately when an
    /// IV is already present.
    pub fn set_key(&mut self, key: &[u8], direction: Direction) -> Result<(), GcmError> {
        self.check_key(key)?;
        self.install_key(key, direction)
    }

    pub fn set_iv(&mut self, iv: &[u8]) -> Result<(), GcmError> {
        self.check_iv(iv)?;
        self.iv.as_mut_slice().copy_from_slice(iv);
        self.iv_set = true;
        self.iv_gen = false;
        self.iv_fill_from = None;
        if self.key_set {
            self.derive()?;
        }
        Ok(())
    }

    /// Change the IV length. Only allowed before key and IV are both
    /// installed.
    pub fn set_iv_length(&mut self, len: usize) -> Result<(), GcmError> {
        if len == 0 {
            return Err(GcmError::InvalidIvLength(len));
        }
        if self.key_set && self.iv_set {
            return Err(GcmError::IvLengthLocked);
        }
        self.iv.resize(len);
        self.iv_set = false;
        self.iv_gen = false;
        self.iv_fill_from = None;
        Ok(())
    }

    /// Install a fixed IV prefix for generated IVs.
    ///
    /// A prefix as long as the IV installs the whole IV. Otherwise the prefix
    /// must be at least 4 bytes and leave at least 8 bytes for the invocation
    /// part, which is filled with random bytes on encrypt and supplied by the
    /// peer (`set_external_iv_low`) on decrypt. Without a key yet, the fill
    /// waits for the first `next_iv`. IVs shorter than 8 bytes cannot carry
    /// the invocation counter and are rejected.
    pub fn set_iv_fixed(&mut self, fixed: &[u8]) -> Result<(), GcmError> {
        let iv_len = self.iv.len();
        // The counter lives in the trailing 8 bytes; a shorter IV could not
        // advance and every generated IV would repeat.
        if iv_len < GCM_MIN_INVOCATION_IV_LEN {
            return Err(GcmError::InvalidFixedIv { fixed: fixed.len(), iv_len });
        }
        if fixed.len() == iv_len {
            self.iv.as_mut_slice().copy_from_slice(fixed);
            self.iv_gen = true;
            self.iv_fill_from = None;
            return Ok(());
        }
        if fixed.len() < GCM_MIN_FIXED_IV_LEN || iv_len.saturating_sub(fixed.len()) < GCM_MIN_INVOCATION_IV_LEN {
            return Err(GcmError::InvalidFixedIv { fixed: fixed.len(), iv_len });
        }
        self.iv.as_mut_slice().zeroize();
        self.iv.as_mut_slice()[..fixed.len()].copy_from_slice(fixed);
        self.iv_fill_from = None;
        if !self.key_set {
            self.iv_fill_from = Some(fixed.len());
        } else if self.direction.is_encrypt() {
            self.fill_invocation(fixed.len())?;
        }
        self.iv_gen = true;
        debug!(fixed = fixed.len(), iv_len, direction = ?self.direction, "gcm iv generation enabled");
        Ok(())
    }

    /// Derive material for the current IV, emit its low `out.len()` bytes,
    /// then advance the trailing 64-bit counter.
    pub fn next_iv(&mut self, out: &mut [u8]) -> Result<(), GcmError> {
        if !self.direction.is_encrypt() {
            return Err(GcmError::WrongDirection { op: "next_iv", direction: self.direction });
        }
        self.check_iv_gen()?;
        let iv_len = self.iv.len();
        if out.is_empty() || out.len() > iv_len {
            return Err(GcmError::InvalidIvLength(out.len()));
        }
        if let Some(from) = self.iv_fill_from {
            self.fill_invocation(from)?;
            self.iv_fill_from = None;
        }
        self.derive()?;
        out.copy_from_slice(&self.iv.as_slice()[iv_len - out.len()..]);
        self.iv.increment_counter();
        self.iv_set = true;
        Ok(())
    }

    /// Install the peer-supplied low IV bytes and derive from the full IV.
    pub fn set_external_iv_low(&mut self, low: &[u8]) -> Result<(), GcmError> {
        if self.direction.is_encrypt() {
            return Err(GcmError::WrongDirection { op: "set_external_iv_low", direction: self.direction });
        }
        self.check_iv_gen()?;
        let iv_len = self.iv.len();
        if low.is_empty() || low.len() > iv_len {
            return Err(GcmError::InvalidIvLength(low.len()));
        }
        self.iv.as_mut_slice()[iv_len - low.len()..].copy_from_slice(low);
        self.iv_fill_from = None;
        self.derive()?;
        self.iv_set = true;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tags
    // ---------------------------------------------------------------------

    /// Expected tag for a decrypting session; checked at finalize.
    pub fn set_tag(&mut self, tag: &[u8]) -> Result<(), GcmError> {
        if self.direction.is_encrypt() {
            return Err(GcmError::WrongDirection { op: "set_tag", direction: self.direction });
        }
        if tag.is_empty() || tag.len() > GCM_TAG_LEN {
            return Err(GcmError::InvalidTagLength(tag.len()));
        }
        self.expected_tag.zeroize();
        self.expected_tag[..tag.len()].copy_from_slice(tag);
        self.expected_len = Some(tag.len());
        Ok(())
    }

    /// Copy the leading `out.len()` bytes of the computed tag. Encrypting
    /// sessions only, after finalize.
    pub fn get_tag(&self, out: &mut [u8]) -> Result<(), GcmError> {
        if !self.direction.is_encrypt() {
            return Err(GcmError::WrongDirection { op: "get_tag", direction: self.direction });
        }
        if out.is_empty() || out.len() > GCM_TAG_LEN {
            return Err(GcmError::InvalidTagLength(out.len()));
        }
        if self.state != GcmState::Finalized {
            return Err(GcmError::TagNotAvailable);
        }
        out.copy_from_slice(&self.tag[..out.len()]);
        Ok(())
    }

    pub fn tag(&self, len: usize) -> Result<Vec<u8>, GcmError> {
        let mut out = vec![0u8; len];
        self.get_tag(&mut out)?;
        Ok(out)
    }

    // ---------------------------------------------------------------------
    // Data
    // ---------------------------------------------------------------------

    pub fn update_aad(&mut self, aad: &[u8]) -> Result<(), GcmError> {
        self.require_ready()?;
        if self.payload_len > 0 {
            return Err(GcmError::AadAfterPayload);
        }
        let total = self
            .aad_len
            .checked_add(aad.len() as u64)
            .filter(|t| *t < GCM_MAX_AAD_LEN)
            .ok_or(GcmError::AadLimit)?;

        self.absorb_aad(aad)?;
        self.aad_len = total;
        self.counters.aad_bytes += aad.len() as u64;
        self.state = GcmState::Aad;
        Ok(())
    }

    /// Transform `input` into `output[..input.len()]` and return the number
    /// of bytes written.
    pub fn update_payload(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, GcmError> {
        if output.len() < input.len() {
            return Err(GcmError::OutputTooSmall { need: input.len(), have: output.len() });
        }
        let out = &mut output[..input.len()];
        self.require_ready()?;
        self.check_payload_len(input.len())?;
        out.copy_from_slice(input);
        self.absorb_payload(out)?;
        Ok(input.len())
    }

    /// Same as `update_payload`, transforming `buf` in place.
    pub fn update_payload_in_place(&mut self, buf: &mut [u8]) -> Result<usize, GcmError> {
        self.require_ready()?;
        self.check_payload_len(buf.len())?;
        self.absorb_payload(buf)?;
        Ok(buf.len())
    }

    /// Cipher-style dispatch: without an output buffer the input is
    /// associated data, with one it is payload.
    pub fn update(&mut self, input: &[u8], output: Option<&mut [u8]>) -> Result<usize, GcmError> {
        match output {
            None => {
                self.update_aad(input)?;
                Ok(input.len())
            }
            Some(out) => self.update_payload(input, out),
        }
    }

    /// Close the message. Encrypt: compute and keep the 16-byte tag.
    /// Decrypt: verify against the tag given to `set_tag`.
    ///
    /// A new IV is required before the next message either way.
    pub fn finalize(&mut self) -> Result<(), GcmError> {
        self.require_ready()?;
        let expected_len = match self.direction {
            Direction::Encrypt => None,
            Direction::Decrypt => Some(self.expected_len.ok_or(GcmError::TagNotSet)?),
        };

        let computed = self.compute_tag();
        self.iv_set = false;
        let mut computed = computed?;
        self.state = GcmState::Finalized;
        self.counters.messages_finalized += 1;

        match expected_len {
            None => {
                self.tag = computed;
                computed.zeroize();
                debug!(aad = self.aad_len, payload = self.payload_len, "gcm seal finalized");
                Ok(())
            }
            Some(len) => {
                let ok: bool = computed[..len].ct_eq(&self.expected_tag[..len]).into();
                computed.zeroize();
                self.expected_tag.zeroize();
                self.expected_len = None;
                if ok {
                    debug!(aad = self.aad_len, payload = self.payload_len, "gcm open finalized");
                    Ok(())
                } else {
                    self.fail_auth();
                    Err(GcmError::TagMismatch)
                }
            }
        }
    }

    /// `finalize`, zeroing `written` (the plaintext produced so far) when
    /// authentication fails.
    pub fn finalize_with_output(&mut self, written: &mut [u8]) -> Result<(), GcmError> {
        let res = self.finalize();
        if matches!(res, Err(GcmError::TagMismatch)) {
            written.zeroize();
        }
        res
    }

    // ---------------------------------------------------------------------
    // Record framing
    // ---------------------------------------------------------------------

    /// Install the 13-byte pseudo header for the next `process_record` call
    /// and patch its length field. Returns the tag length the record carries.
    pub fn set_record_aad(&mut self, header: &[u8]) -> Result<usize, GcmError> {
        let mut aad = RecordAad::from_bytes(header)?;
        let payload = aad.patch_len(self.direction)?;
        trace!(payload, direction = ?self.direction, "record aad installed");
        self.record_aad = Some(aad);
        Ok(TLS_TAG_LEN)
    }

    /// Seal or open one record in place.
    ///
    /// Layout: `[explicit_iv(8) | payload | tag(16)]`. Encrypt fills the
    /// explicit IV and tag and returns the full record length; decrypt
    /// returns the plaintext length and zeroes the payload region on
    /// authentication failure. The record header and IV state are consumed
    /// on every path.
    pub fn process_record(&mut self, buf: &mut [u8]) -> Result<usize, GcmError> {
        let res = self.process_record_inner(buf);
        self.iv_set = false;
        self.record_aad = None;
        if let Err(e) = &res {
            debug!(error = %e, len = buf.len(), "record rejected");
        }
        res
    }

    fn process_record_inner(&mut self, buf: &mut [u8]) -> Result<usize, GcmError> {
        let aad = self.record_aad.ok_or(GcmError::InvalidRecordAad)?;
        let total = buf.len();
        if buf.len() < TLS_EXPLICIT_IV_LEN + TLS_TAG_LEN {
            return Err(GcmError::RecordTooShort(buf.len()));
        }

        let (explicit_iv, rest) = buf.split_at_mut(TLS_EXPLICIT_IV_LEN);
        let payload_len = rest.len() - TLS_TAG_LEN;
        let (payload, tag_field) = rest.split_at_mut(payload_len);

        match self.direction {
            Direction::Encrypt => self.next_iv(explicit_iv)?,
            Direction::Decrypt => self.set_external_iv_low(explicit_iv)?,
        }

        self.update_aad(aad.as_bytes())?;
        self.check_payload_len(payload.len())?;
        self.absorb_payload(payload)?;

        let mut computed = self.compute_tag()?;
        self.state = GcmState::Finalized;

        match self.direction {
            Direction::Encrypt => {
                tag_field.copy_from_slice(&computed);
                computed.zeroize();
                self.counters.records_sealed += 1;
                trace!(payload = payload_len, "record sealed");
                Ok(total)
            }
            Direction::Decrypt => {
                let ok: bool = computed.ct_eq(tag_field).into();
                computed.zeroize();
                if !ok {
                    payload.zeroize();
                    self.fail_auth();
                    return Err(GcmError::TagMismatch);
                }
                self.counters.records_opened += 1;
                trace!(payload = payload_len, "record opened");
                Ok(payload_len)
            }
        }
    }

    /// Independent copy of the session. IV storage is never shared.
    pub fn copy_session(&self) -> Self {
        self.clone()
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[inline]
    pub fn state(&self) -> GcmState {
        self.state
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn key_size(&self) -> AesKeySize {
        self.key_size
    }

    #[inline]
    pub fn iv_len(&self) -> usize {
        self.iv.len()
    }

    /// Current IV bytes (not secret).
    #[inline]
    pub fn iv(&self) -> &[u8] {
        self.iv.as_slice()
    }

    #[inline]
    pub fn iv_is_embedded(&self) -> bool {
        self.iv.is_embedded()
    }

    #[inline]
    pub fn is_key_set(&self) -> bool {
        self.key_set
    }

    #[inline]
    pub fn is_iv_set(&self) -> bool {
        self.iv_set
    }

    #[inline]
    pub fn aad_len(&self) -> u64 {
        self.aad_len
    }

    #[inline]
    pub fn payload_len(&self) -> u64 {
        self.payload_len
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn stage_times(&self) -> &StageTimes {
        &self.times
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn check_key(&self, key: &[u8]) -> Result<(), GcmError> {
        let expected = self.key_size.key_len();
        if key.len() != expected {
            return Err(GcmError::InvalidKeyLength { expected, actual: key.len() });
        }
        Ok(())
    }

    fn check_iv(&self, iv: &[u8]) -> Result<(), GcmError> {
        if iv.len() != self.iv.len() {
            return Err(GcmError::InvalidIvLength(iv.len()));
        }
        Ok(())
    }

    fn check_iv_gen(&self) -> Result<(), GcmError> {
        if !self.key_set {
            return Err(GcmError::KeyNotSet);
        }
        if !self.iv_gen || self.iv.len() < GCM_MIN_INVOCATION_IV_LEN {
            return Err(GcmError::IvGenerationDisabled);
        }
        Ok(())
    }

    /// Random-fill the IV from `from` onward.
    fn fill_invocation(&mut self, from: usize) -> Result<(), GcmError> {
        let res = self.accel.random_bytes(&mut self.iv.as_mut_slice()[from..]);
        self.counters.add_call(res.is_ok());
        res.map_err(|e| {
            warn!(error = %e, "iv random fill failed");
            GcmError::from(e)
        })
    }

    fn require_ready(&self) -> Result<(), GcmError> {
        if !self.key_set {
            return Err(GcmError::KeyNotSet);
        }
        if !self.iv_set {
            return Err(GcmError::IvNotSet);
        }
        Ok(())
    }

    fn check_payload_len(&self, len: usize) -> Result<(), GcmError> {
        self.payload_len
            .checked_add(len as u64)
            .filter(|t| *t < GCM_MAX_PAYLOAD_LEN)
            .map(|_| ())
            .ok_or(GcmError::PayloadLimit)
    }

    fn install_key(&mut self, key: &[u8], direction: Direction) -> Result<(), GcmError> {
        let n = key.len();
        self.key.zeroize();
        self.key[..n].copy_from_slice(key);
        self.key_set = true;
        self.direction = direction;
        debug!(key_size = ?self.key_size, direction = ?direction, backend = self.accel.name(), "gcm key installed");
        if self.iv_set {
            self.derive()
        } else {
            self.state = GcmState::KeySet;
            Ok(())
        }
    }

    /// Recompute counter blocks and subkey from (key, IV) and reset every
    /// per-message counter.
    fn derive(&mut self) -> Result<(), GcmError> {
        let accel = &*self.accel;
        let key = &self.key[..self.key_size.key_len()];
        let iv = self.iv.as_slice();
        let direction = self.direction;

        trace!(iv_len = iv.len(), "gcm initialize");
        let res = self
            .times
            .measure(Stage::Derive, || accel.gcm_initialize(iv, key, direction));
        self.counters.add_call(res.is_ok());
        let derived = res.map_err(|e| {
            warn!(error = %e, "gcm initialize failed");
            GcmError::from(e)
        })?;

        self.derived = derived;
        self.tag_material.zeroize();
        self.tag.zeroize();
        self.checkpoint.zeroize();
        self.checkpoint.ucb = self.derived.ucb;
        self.aad_len = 0;
        self.payload_len = 0;
        self.state = GcmState::IvSet;
        Ok(())
    }

    /// One intermediate primitive call on explicit running values.
    fn step(
        &mut self,
        stage: Stage,
        buf: &mut [u8],
        ucb: &mut GcmBlock,
        aad: &[u8],
        tag_material: &mut GcmBlock,
    ) -> Result<(), GcmError> {
        let accel = &*self.accel;
        let key = &self.key[..self.key_size.key_len()];
        let subkey = &self.derived.subkey;
        let direction = self.direction;

        trace!(stage = %stage, len = buf.len(), aad = aad.len(), "gcm intermediate");
        let res = self.times.measure(stage, || {
            accel.gcm_intermediate(buf, ucb, aad, tag_material, key, subkey, direction)
        });
        self.counters.add_call(res.is_ok());
        res.map_err(|e| {
            warn!(stage = %stage, error = %e, "gcm intermediate failed");
            GcmError::from(e)
        })
    }

    fn compute_tag(&mut self) -> Result<GcmBlock, GcmError> {
        let accel = &*self.accel;
        let key = &self.key[..self.key_size.key_len()];
        let derived = &self.derived;
        let tag_material = &self.tag_material;
        let (aad_len, payload_len, direction) = (self.aad_len, self.payload_len, self.direction);

        let res = self.times.measure(Stage::Tag, || {
            accel.gcm_last(&derived.icb, aad_len, payload_len, tag_material, key, &derived.subkey, direction)
        });
        self.counters.add_call(res.is_ok());
        res.map_err(|e| {
            warn!(error = %e, "gcm tag computation failed");
            GcmError::from(e)
        })
    }

    fn absorb_aad(&mut self, aad: &[u8]) -> Result<(), GcmError> {
        let mut data = aad;

        if self.checkpoint.pending_len > 0 && !data.is_empty() {
            let pl = self.checkpoint.pending_len;
            let take = (AES_BLOCK_SIZE - pl).min(data.len());
            let mut block = self.checkpoint.pending;
            block[pl..pl + take].copy_from_slice(&data[..take]);

            let (mut ucb, mut tm) = (self.checkpoint.ucb, self.checkpoint.tag_material);
            self.step(Stage::Aad, &mut [], &mut ucb, &block[..pl + take], &mut tm)?;
            self.commit(ucb, tm, &block, pl + take);
            block.zeroize();
            data = &data[take..];
        }
        if data.is_empty() {
            return Ok(());
        }

        let tail = data.len() % AES_BLOCK_SIZE;
        let whole = data.len() - tail;
        let (mut ucb, mut tm) = (self.checkpoint.ucb, self.checkpoint.tag_material);
        if whole > 0 {
            self.step(Stage::Aad, &mut [], &mut ucb, &data[..whole], &mut tm)?;
            self.commit(ucb, tm, &[0u8; AES_BLOCK_SIZE], AES_BLOCK_SIZE);
        }
        if tail > 0 {
            let mut block = [0u8; AES_BLOCK_SIZE];
            block[..tail].copy_from_slice(&data[whole..]);
            self.step(Stage::Aad, &mut [], &mut ucb, &block[..tail], &mut tm)?;
            self.commit(ucb, tm, &block, tail);
            block.zeroize();
        }
        Ok(())
    }

    fn absorb_payload(&mut self, buf: &mut [u8]) -> Result<(), GcmError> {
        if buf.is_empty() {
            return Ok(());
        }
        if self.state != GcmState::Payload {
            // Pending AAD bytes are already folded into the tag material.
            self.checkpoint.ucb = self.derived.ucb;
            self.checkpoint.tag_material = self.tag_material;
            self.checkpoint.pending.zeroize();
            self.checkpoint.pending_len = 0;
            self.state = GcmState::Payload;
        }
        let total = buf.len() as u64;
        let mut offset = 0;

        if self.checkpoint.pending_len > 0 {
            let pl = self.checkpoint.pending_len;
            let take = (AES_BLOCK_SIZE - pl).min(buf.len());
            let mut input = self.checkpoint.pending;
            input[pl..pl + take].copy_from_slice(&buf[..take]);
            let mut block = input;

            let (mut ucb, mut tm) = (self.checkpoint.ucb, self.checkpoint.tag_material);
            self.step(Stage::Payload, &mut block[..pl + take], &mut ucb, &[], &mut tm)?;
            buf[..take].copy_from_slice(&block[pl..pl + take]);
            self.commit(ucb, tm, &input, pl + take);
            block.zeroize();
            input.zeroize();
            offset = take;
        }

        let rest = &mut buf[offset..];
        if !rest.is_empty() {
            let tail = rest.len() % AES_BLOCK_SIZE;
            let whole = rest.len() - tail;
            let (head, last) = rest.split_at_mut(whole);
            let (mut ucb, mut tm) = (self.checkpoint.ucb, self.checkpoint.tag_material);
            if whole > 0 {
                self.step(Stage::Payload, head, &mut ucb, &[], &mut tm)?;
                self.commit(ucb, tm, &[0u8; AES_BLOCK_SIZE], AES_BLOCK_SIZE);
            }
            if tail > 0 {
                let mut input = [0u8; AES_BLOCK_SIZE];
                input[..tail].copy_from_slice(last);
                self.step(Stage::Payload, last, &mut ucb, &[], &mut tm)?;
                self.commit(ucb, tm, &input, tail);
                input.zeroize();
            }
        }

        self.payload_len += total;
        self.counters.payload_bytes += total;
        Ok(())
    }

    /// Publish new running values. A full block also moves the checkpoint;
    /// a partial one keeps it and records the pending input instead.
    fn commit(&mut self, ucb: GcmBlock, tag_material: GcmBlock, input: &GcmBlock, filled: usize) {
        self.derived.ucb = ucb;
        self.tag_material = tag_material;
        if filled == AES_BLOCK_SIZE {
            self.checkpoint.ucb = ucb;
            self.checkpoint.tag_material = tag_material;
            self.checkpoint.pending.zeroize();
            self.checkpoint.pending_len = 0;
        } else {
            self.checkpoint.pending = *input;
            self.checkpoint.pending_len = filled;
        }
    }

    fn fail_auth(&mut self) {
        self.tag_material.zeroize();
        self.checkpoint.zeroize();
        self.tag.zeroize();
        self.counters.auth_failures += 1;
        warn!(aad = self.aad_len, payload = self.payload_len, "gcm authentication failed");
    }
}

impl Drop for GcmSession {
    fn drop(&mut self) {
        self.key.zeroize();
        self.tag.zeroize();
        self.expected_tag.zeroize();
        self.tag_material.zeroize();
        self.checkpoint.zeroize();
    }
}

impl fmt::Debug for GcmSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcmSession")
            .field("key_size", &self.key_size)
            .field("direction", &self.direction)
            .field("state", &self.state)
            .field("iv", &self.iv)
            .field("aad_len", &self.aad_len)
            .field("payload_len", &self.payload_len)
            .finish_non_exhaustive()
    }
}
