//! crypto/mod.rs
//! Streaming adapters over the fixed primitive interface.

pub mod types;
pub mod aad;
pub mod aead;
pub mod cipher;
pub mod nonce;
pub mod digest;

pub use types::*;
pub use aad::*;
pub use aead::*;
pub use cipher::*;
pub use nonce::*;
pub use digest::*;
