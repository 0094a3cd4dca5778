//! Gate controller: the only path that mutates the persisted history
//! sequences or the `implementation_allowed` verdict.

use crate::core::config::GateConfig;
use crate::core::error::WardenError;
use crate::core::evidence::Evidence;
use crate::core::requirements::{self, Violation};
use crate::core::state::{self, ComplianceRecord, ViolationRecord};
use crate::core::store::Store;
use crate::core::time;
use colored::Colorize;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;

/// Audit envelope appended to `gate.events.jsonl` for every decision.
#[derive(Debug, Serialize)]
struct GateEvent {
    ts: String,
    event_id: String,
    action: String,
    status: String,
    violations: usize,
}

/// Run the full gate cycle for one guarded action: load, gather evidence,
/// evaluate, report, persist. Returns whether the action may proceed.
pub fn enforce(store: &Store, config: &GateConfig, action: &str) -> Result<bool, WardenError> {
    let mut state = state::load(store)?;
    let evidence = Evidence::gather(store, config, &state);
    let violations = requirements::evaluate(&state, &evidence);

    if violations.is_empty() {
        state.compliance_checks.push(ComplianceRecord {
            ts: time::now_epoch_z(),
            action: action.to_string(),
            status: "compliant".to_string(),
        });
        state.implementation_allowed = true;
        state::save(store, &state)?;
        log_gate_event(store, action, "compliant", 0);
        println!(
            "{} Compliance verified for '{}': implementation allowed",
            "✓".bright_green(),
            action
        );
        Ok(true)
    } else {
        render_report(action, &violations);
        state.violations.push(ViolationRecord {
            ts: time::now_epoch_z(),
            action: action.to_string(),
            count: violations.len(),
            details: violations.clone(),
        });
        state.implementation_allowed = false;
        state::save(store, &state)?;
        log_gate_event(store, action, "violation", violations.len());
        Ok(false)
    }
}

fn render_report(action: &str, violations: &[Violation]) {
    println!();
    println!(
        "{} '{}' blocked: {} unmet requirements",
        "✗ COMPLIANCE GATE".bright_red().bold(),
        action,
        violations.len()
    );
    println!();
    for (i, v) in violations.iter().enumerate() {
        println!(
            "  {}. {} {}",
            i + 1,
            v.requirement.bold(),
            format!("[{}]", v.status).bright_yellow()
        );
        println!("     {} {}", "▸".bright_cyan(), v.action);
        if let Some(cmd) = &v.log_command {
            println!("     {} Then run: {}", "▸".bright_cyan(), cmd.bright_cyan());
        }
        println!();
    }
    println!("  Resolve the steps above, then re-run the gate.");
}

/// Best-effort append; an audit gap never changes the gate verdict.
fn log_gate_event(store: &Store, action: &str, status: &str, count: usize) {
    let event = GateEvent {
        ts: time::now_epoch_z(),
        event_id: time::new_event_id(),
        action: action.to_string(),
        status: status.to_string(),
        violations: count,
    };
    let _ = append_event(store, &event);
}

fn append_event(store: &Store, event: &GateEvent) -> Result<(), WardenError> {
    std::fs::create_dir_all(&store.root)?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(store.events_path())?;
    writeln!(f, "{}", serde_json::to_string(event).unwrap())?;
    Ok(())
}
