use std::fs;
use tempfile::tempdir;
use warden::core::config::{GateConfig, MemoryProbeConfig};
use warden::core::error::WardenError;
use warden::core::evidence::Evidence;
use warden::core::gate;
use warden::core::requirements::{self, REQUIRED_CONTEXT_FILES, SCIENTIST_LOADED_LINE};
use warden::core::state::{self, ComplianceState, StateField};
use warden::core::store::Store;

fn offline_probe() -> GateConfig {
    GateConfig {
        memory: MemoryProbeConfig {
            command: "false".to_string(),
            args: vec![],
            timeout_secs: 5,
        },
    }
}

#[test]
fn context_file_update_is_idempotent() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));

    for _ in 0..2 {
        let field = StateField::parse("context_file_loaded", "about-ben.md").unwrap();
        state::update(&store, field).unwrap();
    }

    let loaded = state::load(&store).unwrap();
    assert_eq!(loaded.context_files_loaded, vec!["about-ben.md"]);
}

#[test]
fn evaluator_is_deterministic_and_read_only() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));
    fs::create_dir_all(&store.root).unwrap();
    fs::write(store.log_path(), "about-ben.md loaded\n").unwrap();

    let loaded = state::load(&store).unwrap();
    let config = offline_probe();

    let first = requirements::evaluate(&loaded, &Evidence::gather(&store, &config, &loaded));
    let second = requirements::evaluate(&loaded, &Evidence::gather(&store, &config, &loaded));
    assert_eq!(first, second);

    // Evaluation never persists anything.
    assert!(!store.state_path().exists());
    assert!(!store.events_path().exists());
}

#[test]
fn log_line_is_sufficient_evidence_without_state_mutation() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));
    fs::create_dir_all(&store.root).unwrap();
    let config = offline_probe();
    let fresh = ComplianceState::default();

    let before = requirements::evaluate(&fresh, &Evidence::gather(&store, &config, &fresh));
    assert!(
        before
            .iter()
            .any(|v| v.requirement == "ML/LLM Scientist Persona")
    );

    fs::write(store.log_path(), format!("{}\n", SCIENTIST_LOADED_LINE)).unwrap();
    let after = requirements::evaluate(&fresh, &Evidence::gather(&store, &config, &fresh));
    assert!(
        !after
            .iter()
            .any(|v| v.requirement == "ML/LLM Scientist Persona")
    );
    assert_eq!(after.len(), before.len() - 1);
    assert!(!fresh.ml_llm_scientist_loaded);
}

#[test]
fn load_missing_state_returns_empty_record() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));

    let loaded = state::load(&store).unwrap();
    assert!(!loaded.ml_llm_scientist_loaded);
    assert!(!loaded.implementation_allowed);
    assert!(loaded.context_files_loaded.is_empty());
    assert!(loaded.archetype_selected.is_none());
    assert!(loaded.compliance_checks.is_empty());
    assert!(loaded.violations.is_empty());
}

#[test]
fn save_round_trips_and_leaves_no_temp_residue() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));

    let mut original = ComplianceState::default();
    original.memory_initialized = true;
    original.archetype_selected = Some("local-apps".to_string());
    original
        .context_files_loaded
        .push("process-overview.md".to_string());
    state::save(&store, &original).unwrap();

    let loaded = state::load(&store).unwrap();
    assert!(loaded.memory_initialized);
    assert_eq!(loaded.archetype_selected.as_deref(), Some("local-apps"));
    assert_eq!(loaded.context_files_loaded, vec!["process-overview.md"]);

    assert!(!store.root.join(".compliance-state.json.tmp").exists());
}

#[test]
fn corrupt_state_is_a_hard_error() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));
    fs::create_dir_all(&store.root).unwrap();
    fs::write(store.state_path(), "definitely not json").unwrap();

    let err = state::load(&store).unwrap_err();
    assert!(matches!(err, WardenError::StateFormatError(_)));
}

#[test]
fn partial_state_file_loads_with_defaults() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));
    fs::create_dir_all(&store.root).unwrap();
    fs::write(store.state_path(), r#"{"memory_initialized": true}"#).unwrap();

    let loaded = state::load(&store).unwrap();
    assert!(loaded.memory_initialized);
    assert!(loaded.compliance_checks.is_empty());
}

#[test]
fn reset_is_idempotent_and_never_touches_the_log() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));
    fs::create_dir_all(&store.root).unwrap();
    fs::write(store.log_path(), "error-recovery.md loaded\n").unwrap();
    state::save(&store, &ComplianceState::default()).unwrap();

    state::reset(&store).unwrap();
    state::reset(&store).unwrap();

    assert!(!store.state_path().exists());
    assert_eq!(
        fs::read_to_string(store.log_path()).unwrap(),
        "error-recovery.md loaded\n"
    );
}

#[test]
fn enforce_round_trip_records_history_and_verdict() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));
    let config = offline_probe();

    assert!(!gate::enforce(&store, &config, "pre_edit").unwrap());
    let blocked = state::load(&store).unwrap();
    assert_eq!(blocked.violations.len(), 1);
    assert_eq!(blocked.violations[0].count, 6);
    assert_eq!(blocked.violations[0].action, "pre_edit");
    assert!(!blocked.implementation_allowed);

    state::update(
        &store,
        StateField::parse("ml_llm_scientist_loaded", "true").unwrap(),
    )
    .unwrap();
    state::update(
        &store,
        StateField::parse("memory_initialized", "true").unwrap(),
    )
    .unwrap();
    state::update(
        &store,
        StateField::parse("archetype_selected", "cli-tools").unwrap(),
    )
    .unwrap();
    for file in REQUIRED_CONTEXT_FILES {
        state::update(&store, StateField::parse("context_file_loaded", file).unwrap()).unwrap();
    }

    assert!(gate::enforce(&store, &config, "pre_commit").unwrap());
    let allowed = state::load(&store).unwrap();
    assert!(allowed.implementation_allowed);
    assert_eq!(allowed.compliance_checks.len(), 1);
    assert_eq!(allowed.compliance_checks[0].status, "compliant");
    // The earlier violation record is untouched.
    assert_eq!(allowed.violations, blocked.violations);
}

#[test]
fn store_discovery_walks_up_and_falls_back() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("project");
    let nested = root.join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();
    fs::create_dir_all(root.join(".warden")).unwrap();

    let found = Store::discover(&nested);
    assert_eq!(found.root, root.join(".warden"));

    let orphan = tmp.path().join("elsewhere");
    fs::create_dir_all(&orphan).unwrap();
    let fallback = Store::discover(&orphan);
    assert_eq!(fallback.root, orphan.join(".warden"));
}

#[test]
fn config_load_defaults_and_overrides() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::at(tmp.path().join(".warden"));

    // Missing file: defaults.
    let config = GateConfig::load(&store);
    assert_eq!(config.memory.command, "p-cli");
    assert_eq!(config.memory.args, vec!["memory-stats"]);
    assert_eq!(config.memory.timeout_secs, 10);

    fs::create_dir_all(&store.root).unwrap();
    fs::write(
        store.config_path(),
        "[memory]\ncommand = \"memctl\"\nargs = [\"stats\", \"--quiet\"]\ntimeout-secs = 3\n",
    )
    .unwrap();
    let config = GateConfig::load(&store);
    assert_eq!(config.memory.command, "memctl");
    assert_eq!(config.memory.args, vec!["stats", "--quiet"]);
    assert_eq!(config.memory.timeout_secs, 3);

    // Malformed file degrades to defaults rather than failing the gate.
    fs::write(store.config_path(), "[memory\nnope").unwrap();
    let config = GateConfig::load(&store);
    assert_eq!(config.memory.command, "p-cli");
}
