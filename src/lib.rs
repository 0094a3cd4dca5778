//! Warden: a local compliance gate for agent workflows.
//!
//! **Warden refuses guarded actions (file edits, commits) until a fixed
//! checklist of session preconditions has been satisfied.**
//!
//! When it refuses, it prints the missing steps with exact remediation
//! commands. All state is local, human-readable, and auditable.
//!
//! # The checklist
//!
//! 1. The ML/LLM scientist persona document has been read
//! 2. Each required context file has been read (`about-ben.md`,
//!    `process-overview.md`, `error-recovery.md`)
//! 3. The memory subsystem reports healthy (`p-cli memory-stats` exits 0)
//! 4. A behavioral archetype has been selected
//!
//! A requirement is satisfied by either a recorded state flag or external
//! evidence: a literal line in the compliance log, the archetype marker
//! file, or a successful probe exit. Either proof suffices.
//!
//! # Examples
//!
//! ```bash
//! # Run the gate (default command)
//! warden
//!
//! # Gate a commit
//! warden pre-commit
//!
//! # Record checklist progress
//! warden update context_file_loaded about-ben.md
//!
//! # Inspect persisted state
//! warden status
//!
//! # Discard state (the compliance log survives)
//! warden reset
//! ```
//!
//! # Storage
//!
//! All artifacts live under `.warden/` in the nearest ancestor directory
//! that has one (the current directory otherwise). The directory is
//! created lazily on first save; there is no init step.

pub mod core;

use crate::core::config::GateConfig;
use crate::core::error::WardenError;
use crate::core::gate;
use crate::core::state::{self, StateField};
use crate::core::store::Store;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser, Debug)]
#[clap(
    name = "warden",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local compliance gate: verifies session preconditions before edits and commits"
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the compliance gate without a guarded action
    Check,

    /// Gate an upcoming file edit
    #[clap(name = "pre-edit")]
    PreEdit {
        /// File about to be edited (display only)
        filename: Option<String>,
    },

    /// Gate an upcoming commit
    #[clap(name = "pre-commit")]
    PreCommit,

    /// Record checklist progress against a state field
    Update {
        key: Option<String>,
        value: Option<String>,
    },

    /// Show persisted compliance state as JSON
    Status,

    /// Show the append-only gate audit log
    Audit,

    /// Discard persisted compliance state (the compliance log survives)
    Reset,

    #[clap(external_subcommand)]
    External(Vec<String>),
}

const VALID_COMMANDS: &str = "check, pre-edit, pre-commit, update, status, audit, reset";

/// Parse arguments and dispatch. Returns the process exit code; gate
/// refusals are `Ok(1)`, not errors.
pub fn run() -> Result<i32, WardenError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            return Ok(code);
        }
    };

    let current_dir = std::env::current_dir()?;
    let store = Store::discover(&current_dir);
    let config = GateConfig::load(&store);

    match cli.command.unwrap_or(Command::Check) {
        Command::Check => gate_exit(gate::enforce(&store, &config, "manual_check")?),
        Command::PreEdit { filename } => {
            println!(
                "Pre-edit check for: {}",
                filename.as_deref().unwrap_or("<unspecified>")
            );
            gate_exit(gate::enforce(&store, &config, "pre_edit")?)
        }
        Command::PreCommit => gate_exit(gate::enforce(&store, &config, "pre_commit")?),
        Command::Update { key, value } => {
            let (Some(key), Some(value)) = (key, value) else {
                eprintln!("Usage: warden update <key> <value>");
                eprintln!("Keys: {}", StateField::KEYS.join(", "));
                return Ok(1);
            };
            let field = StateField::parse(&key, &value)?;
            state::update(&store, field)?;
            println!("{} Updated {} = {}", "✓".bright_green(), key, value);
            Ok(0)
        }
        Command::Status => {
            let current = state::load(&store)?;
            println!("{}", serde_json::to_string_pretty(&current).unwrap());
            Ok(0)
        }
        Command::Audit => {
            let audit_log = store.events_path();
            if audit_log.exists() {
                let content = std::fs::read_to_string(audit_log)?;
                print!("{}", content);
            } else {
                println!("No audit log found.");
            }
            Ok(0)
        }
        Command::Reset => {
            state::reset(&store)?;
            println!(
                "{} Compliance state reset (compliance log retained)",
                "✓".bright_green()
            );
            Ok(0)
        }
        Command::External(args) => {
            let cmd = args.first().map(String::as_str).unwrap_or("");
            eprintln!("Unknown command: {}", cmd);
            eprintln!("Valid commands: {}", VALID_COMMANDS);
            Ok(1)
        }
    }
}

fn gate_exit(allowed: bool) -> Result<i32, WardenError> {
    Ok(if allowed { 0 } else { 1 })
}
