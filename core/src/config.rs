//! config.rs
//! Startup configuration for the engine.
//!
//! Loaded once (usually from JSON), validated, then frozen inside `Engine`.
//!
//! ```json
//! { "disabled": ["aes128_ecb"], "gcm_iv_len": 12, "require_card": false }
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::GCM_DEFAULT_IV_LEN;
use crate::registry::AlgorithmId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("invalid gcm iv length: {0}")]
    InvalidIvLength(usize),

    #[error("algorithm both enabled and disabled: {0}")]
    Conflict(AlgorithmId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Allow-list. `None` allows everything the accelerator supports.
    pub enabled: Option<Vec<AlgorithmId>>,
    /// Deny-list, applied after `enabled`.
    pub disabled: Vec<AlgorithmId>,
    /// IV length given to new GCM sessions.
    pub gcm_iv_len: usize,
    /// Refuse to start when no crypto card is online.
    pub require_card: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: None,
            disabled: Vec::new(),
            gcm_iv_len: GCM_DEFAULT_IV_LEN,
            require_card: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gcm_iv_len == 0 {
            return Err(ConfigError::InvalidIvLength(self.gcm_iv_len));
        }
        if let Some(enabled) = &self.enabled {
            if let Some(id) = enabled.iter().find(|id| self.disabled.contains(id)) {
                return Err(ConfigError::Conflict(*id));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn allows(&self, id: AlgorithmId) -> bool {
        let listed = self.enabled.as_ref().map_or(true, |e| e.contains(&id));
        listed && !self.disabled.contains(&id)
    }
}
