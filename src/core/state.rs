//! Persisted compliance state: the single record every command loads,
//! transforms, and saves.

use crate::core::error::WardenError;
use crate::core::requirements::Violation;
use crate::core::store::Store;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// One passing gate evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComplianceRecord {
    pub ts: String,
    pub action: String,
    pub status: String,
}

/// One failing gate evaluation, with the full violation list of that run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViolationRecord {
    pub ts: String,
    pub action: String,
    pub count: usize,
    pub details: Vec<Violation>,
}

/// The persisted compliance record.
///
/// All fields default so state written by older versions loads cleanly. An
/// unparseable file is a hard error, never a silent reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceState {
    pub ml_llm_scientist_loaded: bool,
    pub context_files_loaded: Vec<String>,
    pub memory_initialized: bool,
    pub archetype_selected: Option<String>,
    pub compliance_checks: Vec<ComplianceRecord>,
    pub violations: Vec<ViolationRecord>,
    pub implementation_allowed: bool,
}

pub fn load(store: &Store) -> Result<ComplianceState, WardenError> {
    let path = store.state_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(ComplianceState::default());
        }
        Err(e) => return Err(WardenError::IoError(e)),
    };
    serde_json::from_str(&content)
        .map_err(|e| WardenError::StateFormatError(format!("{}: {}", path.display(), e)))
}

/// Serialize into a temp sibling, then swap into place so a crash mid-write
/// never leaves a truncated state file.
pub fn save(store: &Store, state: &ComplianceState) -> Result<(), WardenError> {
    fs::create_dir_all(&store.root)?;
    let tmp_path = store.root.join(".compliance-state.json.tmp");
    let content = serde_json::to_string_pretty(state)
        .map_err(|e| WardenError::StateFormatError(e.to_string()))?;
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, store.state_path())?;
    Ok(())
}

/// Delete the state file. The compliance log is never touched. Idempotent.
pub fn reset(store: &Store) -> Result<(), WardenError> {
    match fs::remove_file(store.state_path()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(WardenError::IoError(e)),
    }
}

/// The closed set of fields `update` may touch. Unknown keys are rejected
/// instead of being stored as ad-hoc attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum StateField {
    ScientistLoaded(bool),
    ContextFileLoaded(String),
    MemoryInitialized(bool),
    ArchetypeSelected(String),
}

impl StateField {
    pub const KEYS: [&'static str; 4] = [
        "ml_llm_scientist_loaded",
        "context_file_loaded",
        "memory_initialized",
        "archetype_selected",
    ];

    pub fn parse(key: &str, value: &str) -> Result<StateField, WardenError> {
        match key {
            "ml_llm_scientist_loaded" => Ok(StateField::ScientistLoaded(parse_bool(key, value)?)),
            "context_file_loaded" => Ok(StateField::ContextFileLoaded(value.to_string())),
            "memory_initialized" => Ok(StateField::MemoryInitialized(parse_bool(key, value)?)),
            "archetype_selected" => Ok(StateField::ArchetypeSelected(value.to_string())),
            _ => Err(WardenError::ValidationError(format!(
                "unknown state key '{}' (known keys: {})",
                key,
                StateField::KEYS.join(", ")
            ))),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, WardenError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(WardenError::ValidationError(format!(
            "'{}' expects 'true' or 'false', got '{}'",
            key, value
        ))),
    }
}

/// Apply a field mutation. Context-file inserts are idempotent.
pub fn apply(state: &mut ComplianceState, field: StateField) {
    match field {
        StateField::ScientistLoaded(v) => state.ml_llm_scientist_loaded = v,
        StateField::ContextFileLoaded(file) => {
            if !state.context_files_loaded.iter().any(|f| f == &file) {
                state.context_files_loaded.push(file);
            }
        }
        StateField::MemoryInitialized(v) => state.memory_initialized = v,
        StateField::ArchetypeSelected(name) => state.archetype_selected = Some(name),
    }
}

/// Load-apply-save cycle backing the `update` command.
pub fn update(store: &Store, field: StateField) -> Result<(), WardenError> {
    let mut state = load(store)?;
    apply(&mut state, field);
    save(store, &state)
}
