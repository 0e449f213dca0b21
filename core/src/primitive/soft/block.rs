//! primitive/soft/block.rs
//! One-shot AES ECB/CBC/CFB128/OFB.

use crate::constants::AES_BLOCK_SIZE;
use crate::crypto::types::CipherMode;
use crate::primitive::soft::gcm::AesKey;
use crate::primitive::types::{Direction, GcmBlock, PrimitiveError};

pub(crate) fn block_cipher(
    mode: CipherMode,
    direction: Direction,
    key: &[u8],
    iv: &mut GcmBlock,
    buf: &mut [u8],
) -> Result<(), PrimitiveError> {
    if mode.requires_whole_blocks() && buf.len() % AES_BLOCK_SIZE != 0 {
        return Err(PrimitiveError::InvalidLength { what: "block-mode input", len: buf.len() });
    }
    let cipher = AesKey::new(key)?;

    match (mode, direction) {
        (CipherMode::Ecb, dir) => {
            for chunk in buf.chunks_exact_mut(AES_BLOCK_SIZE) {
                let mut block = load(chunk);
                if dir.is_encrypt() {
                    cipher.encrypt_block(&mut block);
                } else {
                    cipher.decrypt_block(&mut block);
                }
                chunk.copy_from_slice(&block);
            }
        }
        (CipherMode::Cbc, Direction::Encrypt) => {
            let mut prev = *iv;
            for chunk in buf.chunks_exact_mut(AES_BLOCK_SIZE) {
                let mut block = load(chunk);
                xor(&mut block, &prev);
                cipher.encrypt_block(&mut block);
                chunk.copy_from_slice(&block);
                prev = block;
            }
        }
        (CipherMode::Cbc, Direction::Decrypt) => {
            let mut prev = *iv;
            for chunk in buf.chunks_exact_mut(AES_BLOCK_SIZE) {
                let saved = load(chunk);
                let mut block = saved;
                cipher.decrypt_block(&mut block);
                xor(&mut block, &prev);
                chunk.copy_from_slice(&block);
                prev = saved;
            }
        }
        (CipherMode::Cfb, dir) => {
            for chunk in buf.chunks_mut(AES_BLOCK_SIZE) {
                let mut ks = *iv;
                cipher.encrypt_block(&mut ks);
                let n = chunk.len();
                if dir.is_encrypt() {
                    xor(chunk, &ks);
                    iv[..n].copy_from_slice(chunk);
                } else {
                    let saved = load(chunk);
                    xor(chunk, &ks);
                    iv[..n].copy_from_slice(&saved[..n]);
                }
            }
        }
        (CipherMode::Ofb, _) => {
            for chunk in buf.chunks_mut(AES_BLOCK_SIZE) {
                cipher.encrypt_block(iv);
                xor(chunk, iv);
            }
        }
    }
    Ok(())
}

/// Copy up to one block out of `chunk`, zero padded.
#[inline]
fn load(chunk: &[u8]) -> GcmBlock {
    let mut block = [0u8; AES_BLOCK_SIZE];
    let n = chunk.len().min(AES_BLOCK_SIZE);
    block[..n].copy_from_slice(&chunk[..n]);
    block
}

#[inline]
fn xor(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
