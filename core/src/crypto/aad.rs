//! crypto/aad.rs
//! Record-layer pseudo header authenticated as GCM associated data.
//!
//! Wire layout (13 bytes):
//!
//! ```text
//! seq_num   (u64 BE)
//! type      (u8)
//! version   (u16 BE)
//! length    (u16 BE)   offsets 11..13
//! ```
//!
//! The length field arrives as the full record length and must be reduced
//! by the explicit IV (and, when opening, the tag) before it is fed to GCM.

use crate::constants::{TLS_AAD_LEN, TLS_EXPLICIT_IV_LEN, TLS_TAG_LEN};
use crate::crypto::types::GcmError;
use crate::primitive::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordAad {
    bytes: [u8; TLS_AAD_LEN],
}

impl RecordAad {
    pub const LEN: usize = TLS_AAD_LEN;

    pub fn new(seq: u64, content_type: u8, version: u16, len: u16) -> Self {
        let mut bytes = [0u8; TLS_AAD_LEN];
        bytes[..8].copy_from_slice(&seq.to_be_bytes());
        bytes[8] = content_type;
        bytes[9..11].copy_from_slice(&version.to_be_bytes());
        bytes[11..].copy_from_slice(&len.to_be_bytes());
        Self { bytes }
    }

    /// Parse a caller-provided header. Anything but 13 bytes is rejected.
    pub fn from_bytes(header: &[u8]) -> Result<Self, GcmError> {
        let bytes: [u8; TLS_AAD_LEN] = header.try_into().map_err(|_| GcmError::InvalidRecordAad)?;
        Ok(Self { bytes })
    }

    #[inline]
    pub fn len_field(&self) -> u16 {
        u16::from_be_bytes([self.bytes[TLS_AAD_LEN - 2], self.bytes[TLS_AAD_LEN - 1]])
    }

    /// Rewrite the length field from record length to payload length.
    ///
    /// Fails without modifying the header when the record length cannot
    /// hold the framing overhead.
    pub fn patch_len(&mut self, direction: Direction) -> Result<u16, GcmError> {
        let mut len = self.len_field() as usize;
        len = len
            .checked_sub(TLS_EXPLICIT_IV_LEN)
            .ok_or(GcmError::InvalidRecordAad)?;
        if !direction.is_encrypt() {
            len = len.checked_sub(TLS_TAG_LEN).ok_or(GcmError::InvalidRecordAad)?;
        }
        let len = len as u16;
        self.bytes[TLS_AAD_LEN - 2..].copy_from_slice(&len.to_be_bytes());
        Ok(len)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; TLS_AAD_LEN] {
        &self.bytes
    }
}

impl AsRef<[u8]> for RecordAad {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
