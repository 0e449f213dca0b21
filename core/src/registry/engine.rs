//! registry/engine.rs
//! Immutable engine: enabled algorithm table plus session factories.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::crypto::{BlockCipherSession, DigestAccumulator, GcmSession};
use crate::primitive::{Accelerator, Capabilities};
use crate::registry::{AlgorithmId, AlgorithmKind, CipherTransform, DigestTransform};
use crate::types::EngineError;
use crate::utils::enum_name_or_hex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown algorithm id: {0}")]
    UnknownAlgorithm(String),

    #[error("algorithm not enabled: {0}")]
    Disabled(AlgorithmId),

    #[error("algorithm {id} is not a {expected}")]
    WrongKind { id: AlgorithmId, expected: &'static str },

    #[error("crypto card required but offline")]
    CardOffline,
}

/// One enabled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmInfo {
    pub id: AlgorithmId,
    pub name: &'static str,
    pub kind: AlgorithmKind,
}

/// Frozen id → adapter table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<AlgorithmId, AlgorithmInfo>,
}

impl Registry {
    /// Keep every id the platform supports and the config allows.
    pub fn build(caps: &Capabilities, config: &EngineConfig) -> Self {
        let entries = AlgorithmId::ALL
            .iter()
            .copied()
            .filter(|id| caps.supports(*id) && config.allows(*id))
            .map(|id| (id, AlgorithmInfo { id, name: id.name(), kind: id.kind() }))
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: AlgorithmId) -> Result<&AlgorithmInfo, RegistryError> {
        self.entries.get(&id).ok_or(RegistryError::Disabled(id))
    }

    #[inline]
    pub fn contains(&self, id: AlgorithmId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AlgorithmId> + '_ {
        self.entries.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Accelerator handle plus the frozen registry. Cheap to clone.
#[derive(Clone)]
pub struct Engine {
    accel: Arc<dyn Accelerator>,
    registry: Arc<Registry>,
    config: Arc<EngineConfig>,
    card_online: bool,
}

impl Engine {
    /// Probe capabilities once and build the registry.
    pub fn new(accel: Arc<dyn Accelerator>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let caps = accel.capabilities().map_err(|e| {
            warn!(backend = accel.name(), error = %e, "capability probe failed");
            e
        })?;
        if config.require_card && !caps.card_online {
            warn!(backend = accel.name(), "crypto card offline");
            return Err(RegistryError::CardOffline.into());
        }

        let registry = Registry::build(&caps, &config);
        let names: Vec<&'static str> = registry.ids().map(AlgorithmId::name).collect();
        info!(
            backend = accel.name(),
            card_online = caps.card_online,
            enabled = ?names,
            "engine ready"
        );

        Ok(Self {
            accel,
            registry: Arc::new(registry),
            config: Arc::new(config),
            card_online: caps.card_online,
        })
    }

    /// Resolve a raw wire id.
    pub fn lookup(&self, raw: u16) -> Result<AlgorithmId, RegistryError> {
        let id = AlgorithmId::try_from(raw)
            .map_err(|_| RegistryError::UnknownAlgorithm(enum_name_or_hex::<AlgorithmId>(raw)))?;
        self.registry.get(id)?;
        Ok(id)
    }

    pub fn digest(&self, id: AlgorithmId) -> Result<DigestAccumulator, RegistryError> {
        match self.registry.get(id)?.kind {
            AlgorithmKind::Digest(alg) => {
                debug!(alg = %id, "digest session");
                Ok(DigestAccumulator::new(Arc::clone(&self.accel), alg))
            }
            _ => Err(RegistryError::WrongKind { id, expected: "digest" }),
        }
    }

    pub fn gcm(&self, id: AlgorithmId) -> Result<GcmSession, EngineError> {
        match self.registry.get(id)?.kind {
            AlgorithmKind::Gcm(key_size) => {
                debug!(alg = %id, iv_len = self.config.gcm_iv_len, "gcm session");
                Ok(GcmSession::new(Arc::clone(&self.accel), key_size, self.config.gcm_iv_len)?)
            }
            _ => Err(RegistryError::WrongKind { id, expected: "gcm cipher" }.into()),
        }
    }

    pub fn block_cipher(&self, id: AlgorithmId) -> Result<BlockCipherSession, RegistryError> {
        match self.registry.get(id)?.kind {
            AlgorithmKind::Cipher(key_size, mode) => {
                debug!(alg = %id, "cipher session");
                Ok(BlockCipherSession::new(Arc::clone(&self.accel), key_size, mode))
            }
            _ => Err(RegistryError::WrongKind { id, expected: "block cipher" }),
        }
    }

    /// Any digest behind the trait.
    pub fn digest_transform(&self, id: AlgorithmId) -> Result<Box<dyn DigestTransform>, RegistryError> {
        Ok(Box::new(self.digest(id)?))
    }

    /// Any cipher (block mode or GCM) behind the trait.
    pub fn cipher(&self, id: AlgorithmId) -> Result<Box<dyn CipherTransform>, EngineError> {
        match self.registry.get(id)?.kind {
            AlgorithmKind::Cipher(..) => Ok(Box::new(self.block_cipher(id)?)),
            AlgorithmKind::Gcm(_) => Ok(Box::new(self.gcm(id)?)),
            AlgorithmKind::Digest(_) => Err(RegistryError::WrongKind { id, expected: "cipher" }.into()),
        }
    }

    pub fn algorithms(&self) -> Vec<AlgorithmId> {
        self.registry.ids().collect()
    }

    #[inline]
    pub fn is_enabled(&self, id: AlgorithmId) -> bool {
        self.registry.contains(id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn card_online(&self) -> bool {
        self.card_online
    }

    pub fn accelerator(&self) -> &Arc<dyn Accelerator> {
        &self.accel
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.accel.name())
            .field("card_online", &self.card_online)
            .field("algorithms", &self.registry.len())
            .finish()
    }
}
