//! registry/ids.rs
//! Stable algorithm identifiers.

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::crypto::types::{AesKeySize, CipherMode, DigestAlg};

/// Wire/config identifier for every algorithm the engine can serve.
/// Values match `constants::alg_ids`.
#[repr(u16)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmId {
    Sha1   = 0x0101,
    Sha256 = 0x0102,
    Sha512 = 0x0103,

    Aes128Ecb = 0x0201,
    Aes128Cbc = 0x0202,
    Aes128Cfb = 0x0203,
    Aes128Ofb = 0x0204,
    Aes128Gcm = 0x0205,

    Aes192Ecb = 0x0301,
    Aes192Cbc = 0x0302,
    Aes192Cfb = 0x0303,
    Aes192Ofb = 0x0304,
    Aes192Gcm = 0x0305,

    Aes256Ecb = 0x0401,
    Aes256Cbc = 0x0402,
    Aes256Cfb = 0x0403,
    Aes256Ofb = 0x0404,
    Aes256Gcm = 0x0405,
}

/// What kind of adapter serves an id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    Digest(DigestAlg),
    Cipher(AesKeySize, CipherMode),
    Gcm(AesKeySize),
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 18] = [
        AlgorithmId::Sha1,
        AlgorithmId::Sha256,
        AlgorithmId::Sha512,
        AlgorithmId::Aes128Ecb,
        AlgorithmId::Aes128Cbc,
        AlgorithmId::Aes128Cfb,
        AlgorithmId::Aes128Ofb,
        AlgorithmId::Aes128Gcm,
        AlgorithmId::Aes192Ecb,
        AlgorithmId::Aes192Cbc,
        AlgorithmId::Aes192Cfb,
        AlgorithmId::Aes192Ofb,
        AlgorithmId::Aes192Gcm,
        AlgorithmId::Aes256Ecb,
        AlgorithmId::Aes256Cbc,
        AlgorithmId::Aes256Cfb,
        AlgorithmId::Aes256Ofb,
        AlgorithmId::Aes256Gcm,
    ];

    #[inline]
    pub fn id(self) -> u16 {
        self.into()
    }

    pub fn kind(self) -> AlgorithmKind {
        use AlgorithmId::*;
        use AesKeySize::{Aes128, Aes192, Aes256};
        match self {
            Sha1 => AlgorithmKind::Digest(DigestAlg::Sha1),
            Sha256 => AlgorithmKind::Digest(DigestAlg::Sha256),
            Sha512 => AlgorithmKind::Digest(DigestAlg::Sha512),

            Aes128Ecb => AlgorithmKind::Cipher(Aes128, CipherMode::Ecb),
            Aes128Cbc => AlgorithmKind::Cipher(Aes128, CipherMode::Cbc),
            Aes128Cfb => AlgorithmKind::Cipher(Aes128, CipherMode::Cfb),
            Aes128Ofb => AlgorithmKind::Cipher(Aes128, CipherMode::Ofb),
            Aes128Gcm => AlgorithmKind::Gcm(Aes128),

            Aes192Ecb => AlgorithmKind::Cipher(Aes192, CipherMode::Ecb),
            Aes192Cbc => AlgorithmKind::Cipher(Aes192, CipherMode::Cbc),
            Aes192Cfb => AlgorithmKind::Cipher(Aes192, CipherMode::Cfb),
            Aes192Ofb => AlgorithmKind::Cipher(Aes192, CipherMode::Ofb),
            Aes192Gcm => AlgorithmKind::Gcm(Aes192),

            Aes256Ecb => AlgorithmKind::Cipher(Aes256, CipherMode::Ecb),
            Aes256Cbc => AlgorithmKind::Cipher(Aes256, CipherMode::Cbc),
            Aes256Cfb => AlgorithmKind::Cipher(Aes256, CipherMode::Cfb),
            Aes256Ofb => AlgorithmKind::Cipher(Aes256, CipherMode::Ofb),
            Aes256Gcm => AlgorithmKind::Gcm(Aes256),
        }
    }

    pub fn name(self) -> &'static str {
        use AlgorithmId::*;
        match self {
            Sha1      => "sha1",
            Sha256    => "sha256",
            Sha512    => "sha512",
            Aes128Ecb => "aes128_ecb",
            Aes128Cbc => "aes128_cbc",
            Aes128Cfb => "aes128_cfb",
            Aes128Ofb => "aes128_ofb",
            Aes128Gcm => "aes128_gcm",
            Aes192Ecb => "aes192_ecb",
            Aes192Cbc => "aes192_cbc",
            Aes192Cfb => "aes192_cfb",
            Aes192Ofb => "aes192_ofb",
            Aes192Gcm => "aes192_gcm",
            Aes256Ecb => "aes256_ecb",
            Aes256Cbc => "aes256_cbc",
            Aes256Cfb => "aes256_cfb",
            Aes256Ofb => "aes256_ofb",
            Aes256Gcm => "aes256_gcm",
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
