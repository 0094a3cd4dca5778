//! External evidence the gate reads: compliance-log lines, the archetype
//! marker, and the memory-status probe.
//!
//! All I/O happens in [`Evidence::gather`]; evaluation over a gathered
//! snapshot is pure, which keeps the evaluator testable without a
//! filesystem.

use crate::core::config::GateConfig;
use crate::core::state::ComplianceState;
use crate::core::store::Store;
use std::fs;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct Evidence {
    pub log_lines: Vec<String>,
    pub memory_ok: bool,
    pub archetype_marker: bool,
}

impl Evidence {
    /// Snapshot every external signal the requirement list can consult.
    /// The memory probe is skipped when the state flag already satisfies
    /// that check.
    pub fn gather(store: &Store, config: &GateConfig, state: &ComplianceState) -> Evidence {
        Evidence {
            log_lines: read_log_lines(store),
            memory_ok: state.memory_initialized || probe_memory(config),
            archetype_marker: store.marker_path().exists(),
        }
    }

    /// Exact-line evidence match; surrounding whitespace is ignored.
    pub fn log_contains(&self, line: &str) -> bool {
        self.log_lines.iter().any(|l| l.trim() == line)
    }
}

// An unreadable or absent log is "no evidence", never an error.
fn read_log_lines(store: &Store) -> Vec<String> {
    match fs::read_to_string(store.log_path()) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

/// Run the configured memory-status command and reduce every outcome to a
/// boolean. Spawn failure, non-zero exit, and timeout all mean "not
/// healthy"; this path must never abort the gate.
fn probe_memory(config: &GateConfig) -> bool {
    let probe = &config.memory;
    let mut child = match Command::new(&probe.command)
        .args(&probe.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(_) => return false,
    };

    let deadline = Instant::now() + Duration::from_secs(probe.timeout_secs);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return status.success(),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return false;
                }
                std::thread::sleep(Duration::from_millis(25));
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MemoryProbeConfig;

    fn probe_config(command: &str, args: &[&str], timeout_secs: u64) -> GateConfig {
        GateConfig {
            memory: MemoryProbeConfig {
                command: command.to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                timeout_secs,
            },
        }
    }

    #[test]
    fn probe_success_is_healthy() {
        assert!(probe_memory(&probe_config("true", &[], 5)));
    }

    #[test]
    fn probe_nonzero_exit_is_unhealthy() {
        assert!(!probe_memory(&probe_config("false", &[], 5)));
    }

    #[test]
    fn probe_missing_binary_is_unhealthy() {
        assert!(!probe_memory(&probe_config("warden-no-such-binary", &[], 5)));
    }

    #[test]
    fn probe_timeout_is_unhealthy() {
        assert!(!probe_memory(&probe_config("sleep", &["5"], 1)));
    }
}
