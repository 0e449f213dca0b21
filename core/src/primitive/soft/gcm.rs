//! primitive/soft/gcm.rs
//! Stateless AES-GCM steps: initialize / intermediate / last.
//!
//! GHASH state is carried between calls in the caller's tag material. The
//! `ghash` crate always starts from a zero accumulator, so continuing from a
//! non-zero accumulator Y is done by XOR-ing Y into the first block fed:
//! (0 ^ (Y ^ X1)) * H == (Y ^ X1) * H.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use ghash::GHash;
use ghash::universal_hash::UniversalHash;

use crate::constants::{AES_BLOCK_SIZE, GCM_DEFAULT_IV_LEN};
use crate::primitive::types::{Direction, GcmBlock, GcmDerived, PrimitiveError};

/// AES block cipher keyed for one call.
pub(crate) enum AesKey {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl AesKey {
    pub(crate) fn new(key: &[u8]) -> Result<Self, PrimitiveError> {
        let invalid = |_| PrimitiveError::InvalidLength { what: "aes key", len: key.len() };
        match key.len() {
            16 => Ok(Self::Aes128(Aes128::new_from_slice(key).map_err(invalid)?)),
            24 => Ok(Self::Aes192(Aes192::new_from_slice(key).map_err(invalid)?)),
            32 => Ok(Self::Aes256(Aes256::new_from_slice(key).map_err(invalid)?)),
            other => Err(PrimitiveError::InvalidLength { what: "aes key", len: other }),
        }
    }

    #[inline]
    pub(crate) fn encrypt_block(&self, block: &mut GcmBlock) {
        let b = GenericArray::from_mut_slice(block);
        match self {
            AesKey::Aes128(c) => c.encrypt_block(b),
            AesKey::Aes192(c) => c.encrypt_block(b),
            AesKey::Aes256(c) => c.encrypt_block(b),
        }
    }

    #[inline]
    pub(crate) fn decrypt_block(&self, block: &mut GcmBlock) {
        let b = GenericArray::from_mut_slice(block);
        match self {
            AesKey::Aes128(c) => c.decrypt_block(b),
            AesKey::Aes192(c) => c.decrypt_block(b),
            AesKey::Aes256(c) => c.decrypt_block(b),
        }
    }
}

/// Continue GHASH from accumulator `y` over `data` (zero padded).
fn ghash_fold(subkey: &GcmBlock, y: &mut GcmBlock, data: &[u8]) {
    if data.is_empty() {
        return;
    }
    let mut gh = GHash::new(GenericArray::from_slice(subkey));

    let n = data.len().min(AES_BLOCK_SIZE);
    let mut first = [0u8; AES_BLOCK_SIZE];
    first[..n].copy_from_slice(&data[..n]);
    xor_in_place(&mut first, y);
    gh.update(&[GenericArray::clone_from_slice(&first)]);
    gh.update_padded(&data[n..]);

    y.copy_from_slice(gh.finalize().as_slice());
}

/// Increment the low 32 bits of a counter block (big-endian, wrapping).
#[inline]
fn inc32(block: &mut GcmBlock) {
    let mut ctr = [0u8; 4];
    ctr.copy_from_slice(&block[12..]);
    let next = u32::from_be_bytes(ctr).wrapping_add(1);
    block[12..].copy_from_slice(&next.to_be_bytes());
}

#[inline]
fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// CTR keystream from `ucb`; the counter advances once per (partial) block.
fn ctr_apply(cipher: &AesKey, ucb: &mut GcmBlock, buf: &mut [u8]) {
    for chunk in buf.chunks_mut(AES_BLOCK_SIZE) {
        let mut ks = *ucb;
        cipher.encrypt_block(&mut ks);
        xor_in_place(chunk, &ks);
        inc32(ucb);
    }
}

pub(crate) fn initialize(iv: &[u8], key: &[u8], _direction: Direction) -> Result<GcmDerived, PrimitiveError> {
    if iv.is_empty() {
        return Err(PrimitiveError::InvalidLength { what: "gcm iv", len: 0 });
    }
    let cipher = AesKey::new(key)?;

    let mut derived = GcmDerived::default();
    cipher.encrypt_block(&mut derived.subkey);

    if iv.len() == GCM_DEFAULT_IV_LEN {
        derived.icb[..GCM_DEFAULT_IV_LEN].copy_from_slice(iv);
        derived.icb[AES_BLOCK_SIZE - 1] = 1;
    } else {
        let mut y = [0u8; AES_BLOCK_SIZE];
        ghash_fold(&derived.subkey, &mut y, iv);
        let mut len_block = [0u8; AES_BLOCK_SIZE];
        len_block[8..].copy_from_slice(&((iv.len() as u64) * 8).to_be_bytes());
        ghash_fold(&derived.subkey, &mut y, &len_block);
        derived.icb = y;
    }

    derived.ucb = derived.icb;
    inc32(&mut derived.ucb);
    Ok(derived)
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn intermediate(
    buf: &mut [u8],
    ucb: &mut GcmBlock,
    aad: &[u8],
    tag_material: &mut GcmBlock,
    key: &[u8],
    subkey: &GcmBlock,
    direction: Direction,
) -> Result<(), PrimitiveError> {
    let cipher = AesKey::new(key)?;

    ghash_fold(subkey, tag_material, aad);

    match direction {
        Direction::Encrypt => {
            ctr_apply(&cipher, ucb, buf);
            ghash_fold(subkey, tag_material, buf);
        }
        Direction::Decrypt => {
            ghash_fold(subkey, tag_material, buf);
            ctr_apply(&cipher, ucb, buf);
        }
    }
    Ok(())
}

pub(crate) fn last(
    icb: &GcmBlock,
    aad_len: u64,
    payload_len: u64,
    tag_material: &GcmBlock,
    key: &[u8],
    subkey: &GcmBlock,
) -> Result<GcmBlock, PrimitiveError> {
    let cipher = AesKey::new(key)?;

    let mut y = *tag_material;
    let mut len_block = [0u8; AES_BLOCK_SIZE];
    len_block[..8].copy_from_slice(&aad_len.wrapping_mul(8).to_be_bytes());
    len_block[8..].copy_from_slice(&payload_len.wrapping_mul(8).to_be_bytes());
    ghash_fold(subkey, &mut y, &len_block);

    let mut tag = *icb;
    cipher.encrypt_block(&mut tag);
    xor_in_place(&mut tag, &y);
    Ok(tag)
}
