//! crypto/nonce.rs
//! Owned GCM IV storage and record sequencing.
//!
//! Design notes:
//! - IVs up to `GCM_EMBEDDED_IV_LEN` bytes live inline in the session; longer
//!   IVs get their own heap allocation.
//! - Duplication is a total match over the two variants, so a copied session
//!   never shares IV storage with its source.
//! - The trailing 8 bytes of the IV act as a big-endian 64-bit invocation
//!   counter for per-record nonces.

use zeroize::Zeroize;

use crate::constants::GCM_EMBEDDED_IV_LEN;

#[derive(PartialEq, Eq)]
pub enum IvBuffer {
    Embedded { bytes: [u8; GCM_EMBEDDED_IV_LEN], len: usize },
    Heap(Vec<u8>),
}

impl IvBuffer {
    /// Zero-filled buffer of exactly `len` bytes.
    pub fn with_len(len: usize) -> Self {
        if len <= GCM_EMBEDDED_IV_LEN {
            IvBuffer::Embedded { bytes: [0u8; GCM_EMBEDDED_IV_LEN], len }
        } else {
            IvBuffer::Heap(vec![0u8; len])
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            IvBuffer::Embedded { len, .. } => *len,
            IvBuffer::Heap(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_embedded(&self) -> bool {
        matches!(self, IvBuffer::Embedded { .. })
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            IvBuffer::Embedded { bytes, len } => &bytes[..*len],
            IvBuffer::Heap(v) => v.as_slice(),
        }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            IvBuffer::Embedded { bytes, len } => &mut bytes[..*len],
            IvBuffer::Heap(v) => v.as_mut_slice(),
        }
    }

    /// Independent copy: inline stays inline, heap gets a fresh allocation.
    pub fn duplicate(&self) -> Self {
        match self {
            IvBuffer::Embedded { bytes, len } => IvBuffer::Embedded { bytes: *bytes, len: *len },
            IvBuffer::Heap(v) => IvBuffer::Heap(v.as_slice().to_vec()),
        }
    }

    /// Resize to `len`, keeping the buffer zeroed. Old contents are wiped.
    pub fn resize(&mut self, len: usize) {
        self.zeroize();
        *self = IvBuffer::with_len(len);
    }

    /// Advance the trailing 64-bit counter (no-op for IVs shorter than 8).
    pub fn increment_counter(&mut self) {
        increment_counter_be(self.as_mut_slice());
    }
}

impl Clone for IvBuffer {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl Zeroize for IvBuffer {
    fn zeroize(&mut self) {
        match self {
            IvBuffer::Embedded { bytes, .. } => bytes.zeroize(),
            IvBuffer::Heap(v) => v.as_mut_slice().zeroize(),
        }
    }
}

impl Drop for IvBuffer {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for IvBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.is_embedded() { "embedded" } else { "heap" };
        f.debug_struct("IvBuffer")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Increment the last 8 bytes of `iv` as a big-endian u64, wrapping on
/// overflow.
#[inline]
pub fn increment_counter_be(iv: &mut [u8]) {
    let n = iv.len();
    if n < 8 {
        return;
    }
    let mut ctr = [0u8; 8];
    ctr.copy_from_slice(&iv[n - 8..]);
    let next = u64::from_be_bytes(ctr).wrapping_add(1);
    iv[n - 8..].copy_from_slice(&next.to_be_bytes());
}
