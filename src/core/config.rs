//! Gate configuration.
//!
//! Optional `.warden/config.toml`. A missing or malformed file falls back
//! to defaults; configuration problems never block the gate.

use crate::core::store::Store;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GateConfig {
    pub memory: MemoryProbeConfig,
}

/// External memory-status probe: the command whose exit status stands in
/// for "memory subsystem healthy".
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MemoryProbeConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Probe runs longer than this are killed and count as unhealthy.
    pub timeout_secs: u64,
}

impl Default for MemoryProbeConfig {
    fn default() -> Self {
        MemoryProbeConfig {
            command: "p-cli".to_string(),
            args: vec!["memory-stats".to_string()],
            timeout_secs: 10,
        }
    }
}

impl GateConfig {
    pub fn load(store: &Store) -> GateConfig {
        let path = store.config_path();
        if !path.exists() {
            return GateConfig::default();
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            return GateConfig::default();
        };
        toml::from_str(&content).unwrap_or_default()
    }
}
