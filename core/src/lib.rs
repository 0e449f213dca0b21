//! crypto-accel
//!
//! Incremental digest, AES block-mode and AES-GCM adapters over a one-shot
//! crypto accelerator.
//!
//! - `primitive`: the fixed, stateless call interface of the accelerator and
//!   an in-process reference backend (`SoftAccelerator`).
//! - `crypto`: the adapters. `DigestAccumulator` turns arbitrary chunks into
//!   whole-block hash submissions; `GcmSession` manages key/IV lifecycle,
//!   streaming AAD/payload, tags and record framing; `BlockCipherSession`
//!   chains ECB/CBC/CFB/OFB calls.
//! - `registry`: algorithm ids, transform traits and the immutable `Engine`.
//!
//! No global state: build an `Engine` once and pass it where sessions are
//! needed.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Layers
pub mod primitive;
pub mod crypto;
pub mod registry;
pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::crypto::{
        AesKeySize, BlockCipherSession, CipherMode, DigestAccumulator, DigestAlg, GcmSession,
        GcmState, RecordAad,
    };
    pub use crate::primitive::{Accelerator, Direction, SoftAccelerator};
    pub use crate::registry::{AlgorithmId, CipherTransform, DigestTransform, Engine};
    pub use crate::types::EngineError;
}
