//! The fixed requirement checklist and its evaluator.
//!
//! Requirements are static data: a stable, ordered list, so the Nth entry
//! of a violation report is reproducible across runs and parseable by
//! tooling. Each check passes on either a recorded state flag or external
//! evidence; the two proof paths are deliberately redundant.

use crate::core::evidence::Evidence;
use crate::core::state::ComplianceState;
use serde::{Deserialize, Serialize};

/// Context documents that must be acknowledged before implementation work,
/// in evaluation order.
pub const REQUIRED_CONTEXT_FILES: [&str; 3] =
    ["about-ben.md", "process-overview.md", "error-recovery.md"];

/// Literal compliance-log line that proves the persona document was read.
pub const SCIENTIST_LOADED_LINE: &str = "ML/LLM scientist loaded";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementCheck {
    PersonaLoaded,
    ContextFile(&'static str),
    MemoryHealthy,
    ArchetypeSelected,
}

/// One named precondition the gate verifies.
#[derive(Debug, Clone)]
pub struct Requirement {
    pub name: String,
    pub check: RequirementCheck,
    pub status: &'static str,
    pub action: String,
    /// Shell line the operator is told to run once the action is done;
    /// `None` when no log evidence applies to this check.
    pub log_command: Option<String>,
}

/// A failed requirement check, with its remediation text. Serialized into
/// the persisted violation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub requirement: String,
    pub status: String,
    pub action: String,
    pub log_command: Option<String>,
}

/// The checklist, in its fixed evaluation order.
pub fn requirements() -> Vec<Requirement> {
    let mut list = vec![Requirement {
        name: "ML/LLM Scientist Persona".to_string(),
        check: RequirementCheck::PersonaLoaded,
        status: "NOT LOADED",
        action: "Read the ML/LLM scientist persona document".to_string(),
        log_command: Some(format!(
            "echo \"{}\" >> .warden/compliance.log",
            SCIENTIST_LOADED_LINE
        )),
    }];

    for file in REQUIRED_CONTEXT_FILES {
        list.push(Requirement {
            name: format!("Context File: {}", file),
            check: RequirementCheck::ContextFile(file),
            status: "NOT LOADED",
            action: format!("Read {}", file),
            log_command: Some(format!(
                "echo \"{} loaded\" >> .warden/compliance.log",
                file
            )),
        });
    }

    list.push(Requirement {
        name: "Memory System".to_string(),
        check: RequirementCheck::MemoryHealthy,
        status: "NOT INITIALIZED",
        action: "Initialize the memory subsystem (the memory-stats probe must exit 0), \
                 or record it manually: warden update memory_initialized true"
            .to_string(),
        log_command: None,
    });

    list.push(Requirement {
        name: "Archetype Selection".to_string(),
        check: RequirementCheck::ArchetypeSelected,
        status: "NOT SELECTED",
        action: "Choose a behavioral archetype: warden update archetype_selected <name>"
            .to_string(),
        log_command: None,
    });

    list
}

impl Requirement {
    /// State flag OR external evidence; either proof suffices.
    pub fn satisfied(&self, state: &ComplianceState, evidence: &Evidence) -> bool {
        match self.check {
            RequirementCheck::PersonaLoaded => {
                state.ml_llm_scientist_loaded || evidence.log_contains(SCIENTIST_LOADED_LINE)
            }
            RequirementCheck::ContextFile(file) => {
                state.context_files_loaded.iter().any(|f| f == file)
                    || evidence.log_contains(&format!("{} loaded", file))
            }
            RequirementCheck::MemoryHealthy => state.memory_initialized || evidence.memory_ok,
            RequirementCheck::ArchetypeSelected => {
                state.archetype_selected.is_some() || evidence.archetype_marker
            }
        }
    }

    fn to_violation(&self) -> Violation {
        Violation {
            requirement: self.name.clone(),
            status: self.status.to_string(),
            action: self.action.clone(),
            log_command: self.log_command.clone(),
        }
    }
}

/// Pure query over state plus a gathered evidence snapshot: walks the fixed
/// requirement order and returns one violation per unsatisfied check. An
/// empty result means compliant. Mutates nothing.
pub fn evaluate(state: &ComplianceState, evidence: &Evidence) -> Vec<Violation> {
    requirements()
        .iter()
        .filter(|r| !r.satisfied(state, evidence))
        .map(Requirement::to_violation)
        .collect()
}
