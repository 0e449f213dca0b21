//! primitive/soft/hash.rs
//! SHA-1/SHA-256/SHA-512 segment hashing over a caller-owned context.
//!
//! The chaining value is kept in `HashContext` as big-endian state words, so
//! the digest is simply its leading `digest_len` bytes after the last call.

use sha2::digest::generic_array::GenericArray;
use sha2::digest::generic_array::typenum::{U128, U64};

use crate::crypto::types::DigestAlg;
use crate::primitive::types::{HashContext, PrimitiveError, SegmentKind};

const SHA1_IV: [u32; 5] = [0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476, 0xC3D2E1F0];

const SHA256_IV: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const SHA512_IV: [u64; 8] = [
    0x6a09e667f3bcc908, 0xbb67ae8584caa73b, 0x3c6ef372fe94f82b, 0xa54ff53a5f1d36f1,
    0x510e527fade682d1, 0x9b05688c2b3e6c1f, 0x1f83d9abfb41bd6b, 0x5be0cd19137e2179,
];

pub(crate) fn hash_segment(
    alg: DigestAlg,
    kind: SegmentKind,
    data: &[u8],
    ctx: &mut HashContext,
    out: &mut [u8],
) -> Result<(), PrimitiveError> {
    let bs = alg.block_size();
    let reject = |ctx: &HashContext| PrimitiveError::InvalidSegment {
        kind,
        running_length: ctx.running_length(),
        len: data.len(),
    };

    match kind {
        SegmentKind::First => {
            if ctx.running_length() != 0 || data.is_empty() || data.len() % bs != 0 {
                return Err(reject(ctx));
            }
            load_iv(alg, ctx.chaining_value_mut());
        }
        SegmentKind::Middle => {
            if ctx.running_length() == 0 || data.is_empty() || data.len() % bs != 0 {
                return Err(reject(ctx));
            }
        }
        SegmentKind::Final => {
            if ctx.running_length() == 0 {
                return Err(reject(ctx));
            }
        }
        SegmentKind::Only => {
            if ctx.running_length() != 0 {
                return Err(reject(ctx));
            }
            load_iv(alg, ctx.chaining_value_mut());
        }
    }

    match kind {
        SegmentKind::First | SegmentKind::Middle => {
            compress_blocks(alg, ctx.chaining_value_mut(), data);
            ctx.advance(data.len() as u64);
            let n = out.len().min(alg.digest_len());
            out[..n].copy_from_slice(&ctx.chaining_value()[..n]);
        }
        SegmentKind::Final | SegmentKind::Only => {
            if out.len() < alg.digest_len() {
                return Err(PrimitiveError::InvalidLength { what: "digest output", len: out.len() });
            }
            let total = ctx.running_length().wrapping_add(data.len() as u64);
            pad_and_finish(alg, ctx.chaining_value_mut(), total, data);
            ctx.advance(data.len() as u64);
            out[..alg.digest_len()].copy_from_slice(&ctx.chaining_value()[..alg.digest_len()]);
        }
    }

    Ok(())
}

fn load_iv(alg: DigestAlg, chaining: &mut [u8; 64]) {
    chaining.fill(0);
    match alg {
        DigestAlg::Sha1 => store_u32(&SHA1_IV, chaining),
        DigestAlg::Sha256 => store_u32(&SHA256_IV, chaining),
        DigestAlg::Sha512 => store_u64(&SHA512_IV, chaining),
    }
}

/// Run the compression function over whole blocks of `blocks`.
fn compress_blocks(alg: DigestAlg, chaining: &mut [u8; 64], blocks: &[u8]) {
    match alg {
        DigestAlg::Sha1 => {
            let mut st = [0u32; 5];
            load_u32(chaining, &mut st);
            for b in blocks.chunks_exact(alg.block_size()) {
                sha1::compress(&mut st, std::slice::from_ref(GenericArray::<u8, U64>::from_slice(b)));
            }
            store_u32(&st, chaining);
        }
        DigestAlg::Sha256 => {
            let mut st = [0u32; 8];
            load_u32(chaining, &mut st);
            for b in blocks.chunks_exact(alg.block_size()) {
                sha2::compress256(&mut st, std::slice::from_ref(GenericArray::<u8, U64>::from_slice(b)));
            }
            store_u32(&st, chaining);
        }
        DigestAlg::Sha512 => {
            let mut st = [0u64; 8];
            load_u64(chaining, &mut st);
            for b in blocks.chunks_exact(alg.block_size()) {
                sha2::compress512(&mut st, std::slice::from_ref(GenericArray::<u8, U128>::from_slice(b)));
            }
            store_u64(&st, chaining);
        }
    }
}

/// Merkle–Damgård padding: 0x80, zeros, then the message bit length
/// (64-bit field for 64-byte blocks, 128-bit field for 128-byte blocks).
fn pad_and_finish(alg: DigestAlg, chaining: &mut [u8; 64], total_len: u64, tail: &[u8]) {
    let bs = alg.block_size();
    let len_field = if bs == 128 { 16 } else { 8 };

    let whole = tail.len() / bs * bs;
    compress_blocks(alg, chaining, &tail[..whole]);
    let rem = &tail[whole..];

    let mut buf = [0u8; 256];
    buf[..rem.len()].copy_from_slice(rem);
    buf[rem.len()] = 0x80;
    let padded = if rem.len() + 1 + len_field <= bs { bs } else { 2 * bs };

    let bits = u128::from(total_len) * 8;
    if len_field == 16 {
        buf[padded - 16..padded].copy_from_slice(&bits.to_be_bytes());
    } else {
        buf[padded - 8..padded].copy_from_slice(&(bits as u64).to_be_bytes());
    }
    compress_blocks(alg, chaining, &buf[..padded]);
}

fn load_u32(src: &[u8; 64], dst: &mut [u32]) {
    for (w, c) in dst.iter_mut().zip(src.chunks_exact(4)) {
        *w = u32::from_be_bytes([c[0], c[1], c[2], c[3]]);
    }
}

fn store_u32(src: &[u32], dst: &mut [u8; 64]) {
    for (w, c) in src.iter().zip(dst.chunks_exact_mut(4)) {
        c.copy_from_slice(&w.to_be_bytes());
    }
}

fn load_u64(src: &[u8; 64], dst: &mut [u64; 8]) {
    for (w, c) in dst.iter_mut().zip(src.chunks_exact(8)) {
        let mut b = [0u8; 8];
        b.copy_from_slice(c);
        *w = u64::from_be_bytes(b);
    }
}

fn store_u64(src: &[u64; 8], dst: &mut [u8; 64]) {
    for (w, c) in src.iter().zip(dst.chunks_exact_mut(8)) {
        c.copy_from_slice(&w.to_be_bytes());
    }
}
