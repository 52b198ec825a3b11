//! `scan` and `clause` subcommands: task-pane document tools on text files.

use crate::cli::{ClauseArgs, ScanArgs};
use crate::error::{CliError, Result};
use crate::output;
use daword::{create_interview, insert_clause, ClauseLibrary, InterviewOutcome, MemoryDocument};
use std::path::Path;
use tracing::info;

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

pub fn run_scan(args: ScanArgs, silent: bool) -> Result<()> {
    let text = read_document(&args.file)?;
    let mut document = MemoryDocument::new(text);
    let outcome = create_interview(&mut document)?;

    if args.json {
        println!("{}", scan_json(&outcome)?);
        return Ok(());
    }

    match outcome {
        InterviewOutcome::NoPlaceholders(message) => eprintln!("{}", message),
        InterviewOutcome::Created(interview) => {
            print!("{}", interview.template);
            if !silent {
                eprintln!();
                eprintln!("{}", interview.summary());
            }
        }
    }
    Ok(())
}

/// Placeholders as a JSON array (empty when there are none).
fn scan_json(outcome: &InterviewOutcome) -> Result<String> {
    let placeholders = match outcome {
        InterviewOutcome::NoPlaceholders(_) => &[][..],
        InterviewOutcome::Created(interview) => interview.placeholders.as_slice(),
    };
    Ok(serde_json::to_string_pretty(placeholders)?)
}

pub fn run_clause(args: ClauseArgs) -> Result<()> {
    let library = ClauseLibrary::builtin();

    let Some(key) = args.key else {
        output::print_clause_list(&library);
        return Ok(());
    };

    match args.into {
        Some(path) => append_clause(&path, &library, &key),
        None => {
            println!("{}", library.get(&key)?);
            Ok(())
        }
    }
}

/// Insert a clause at the end of a text file, as if the caret sat there.
fn append_clause(path: &Path, library: &ClauseLibrary, key: &str) -> Result<()> {
    let mut document = MemoryDocument::new(read_document(path)?);
    insert_clause(&mut document, library, key)?;
    std::fs::write(path, document.text()).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote clause {} to {}", key, path.display());
    Ok(())
}
