//! Command-line surface for the Quill front end.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::parser::check_source;

#[derive(Parser)]
#[command(name = "quill", version, about = "The Quill language front end")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse and type-check source files, printing diagnostics
    Check {
        /// Files to check
        paths: Vec<PathBuf>,

        /// Emit diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI; returns the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { paths, json } => run_check(&paths, json),
    }
}

fn run_check(paths: &[PathBuf], json: bool) -> i32 {
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for path in paths {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                eprintln!("error: could not read {}: {}", path.display(), error);
                total_errors += 1;
                continue;
            }
        };
        let program = check_source(&source);
        total_errors += program.diagnostics.error_count();
        total_warnings += program.diagnostics.warning_count();

        if json {
            println!("{}", program.diagnostics.to_json());
        } else if !program.diagnostics.is_empty() {
            println!("{}", program.diagnostics.render(&path.display().to_string()));
        }
    }

    if !json {
        if total_errors == 0 && total_warnings == 0 {
            println!("checked {} file(s), no issues found", paths.len());
        } else {
            println!(
                "checked {} file(s): {} error(s), {} warning(s)",
                paths.len(),
                total_errors,
                total_warnings
            );
        }
    }

    if total_errors > 0 {
        1
    } else {
        0
    }
}
