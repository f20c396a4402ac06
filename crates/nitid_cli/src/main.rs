//! CLI probe for the note engine.
//!
//! # Responsibility
//! - Verify `nitid_core` linkage against a real vault directory.
//! - Print a deterministic validation summary.
//!
//! Usage: `nitid_cli [VAULT_DIR] [LOG_DIR]`. `VAULT_DIR` defaults to `.`;
//! file logging starts only when an absolute `LOG_DIR` is given.

use log::info;
use nitid_core::{FsNoteRepository, NoteService};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let root = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    if let Some(log_dir) = args.next() {
        if let Err(err) =
            nitid_core::init_logging(nitid_core::default_log_level(), &PathBuf::from(log_dir))
        {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("nitid_core version={}", nitid_core::core_version());

    let service = NoteService::new(FsNoteRepository::new(&root));
    let report = match service.validate() {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validate {}: {err}", root.display());
            return ExitCode::FAILURE;
        }
    };

    info!(
        "event=cli_probe module=cli status=ok total={} errors={}",
        report.total,
        report.errors.len()
    );
    println!(
        "checked {} note files: {} errors, {} warnings",
        report.total,
        report.errors.len(),
        report.warnings.len()
    );
    for issue in &report.errors {
        println!("error: {issue}");
    }
    for issue in &report.warnings {
        println!("warning: {issue}");
    }

    if report.errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
