//! Store handle for the `.warden/` workspace.
//!
//! Every operation receives a `Store` and resolves artifact paths through
//! it; nothing reaches for ambient globals.

use std::path::{Path, PathBuf};

pub const STORE_DIR: &str = ".warden";

/// Handle for a warden state workspace.
#[derive(Debug, Clone)]
pub struct Store {
    /// Path of the `.warden` directory (may not exist yet).
    pub root: PathBuf,
}

impl Store {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    /// Walk up from `start` to the nearest ancestor containing `.warden/`.
    /// Falls back to `start/.warden` when none exists; the store directory
    /// is created lazily on first save.
    pub fn discover(start: &Path) -> Self {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(STORE_DIR);
            if candidate.is_dir() {
                return Store { root: candidate };
            }
            if !current.pop() {
                return Store {
                    root: start.join(STORE_DIR),
                };
            }
        }
    }

    /// Persisted compliance state, rewritten wholesale on every save.
    pub fn state_path(&self) -> PathBuf {
        self.root.join("compliance-state.json")
    }

    /// Append-only free-text evidence log. Never deleted by reset.
    pub fn log_path(&self) -> PathBuf {
        self.root.join("compliance.log")
    }

    /// Archetype marker; existence alone is the signal.
    pub fn marker_path(&self) -> PathBuf {
        self.root.join("archetype-selected")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Append-only JSONL audit trail of gate decisions.
    pub fn events_path(&self) -> PathBuf {
        self.root.join("gate.events.jsonl")
    }
}
