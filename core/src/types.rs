//! types.rs
//! Unified engine error.

use crate::config::ConfigError;
use crate::crypto::{CipherError, DigestError, GcmError};
use crate::primitive::PrimitiveError;
use crate::registry::RegistryError;

/// Unified error covering every adapter, the registry and configuration.
/// - `From<T>` impls enable `?` across layers.
/// - `is_auth_failure` lets callers single out unauthenticated data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("digest error: {0}")]
    Digest(#[from] DigestError),

    #[error("gcm error: {0}")]
    Gcm(#[from] GcmError),

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("primitive error: {0}")]
    Primitive(#[from] PrimitiveError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// True only for a failed tag check.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, EngineError::Gcm(GcmError::TagMismatch))
    }

    /// True when the accelerator call itself failed; the session should be
    /// re-initialized before reuse.
    pub fn is_primitive_failure(&self) -> bool {
        matches!(
            self,
            EngineError::Primitive(_)
                | EngineError::Digest(DigestError::RequestFailed(_))
                | EngineError::Gcm(GcmError::RequestFailed(_))
                | EngineError::Cipher(CipherError::RequestFailed(_))
        )
    }
}
