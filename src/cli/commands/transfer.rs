//! Export and import commands.

use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::cli::commands::{block_on, open_library, print_json};
use crate::config::Overrides;
use crate::error::Result;
use crate::sync::{atomic_write, ImportReport};

#[derive(Serialize)]
struct ExportOutput {
    path: String,
    bytes: usize,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    source: &'a str,
    #[serde(flatten)]
    report: ImportReport,
}

/// Write the export document to `output`, or to stdout.
pub fn export(output: Option<&Path>, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let (_, library) = open_library(overrides)?;
    let bytes = block_on(library.export_bytes())??;

    let Some(path) = output else {
        std::io::stdout().write_all(&bytes)?;
        return Ok(());
    };

    atomic_write(path, &bytes)?;

    if json {
        return print_json(&ExportOutput {
            path: path.display().to_string(),
            bytes: bytes.len(),
        });
    }

    println!("{} Exported quotes to {}", "✓".green(), path.display());
    Ok(())
}

/// Append the valid records of `file` to the collection.
pub fn import(file: &Path, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let bytes = fs::read(file)?;
    let source = file.display().to_string();

    let (_, library) = open_library(overrides)?;
    let report = block_on(library.import_bytes(&source, &bytes))??;

    if json {
        return print_json(&ImportOutput {
            source: &source,
            report,
        });
    }

    println!("{} Imported {} quotes from {source}", "✓".green(), report.added);
    if report.skipped > 0 {
        println!("  {} {} invalid records skipped", "!".yellow(), report.skipped);
    }
    if report.hash_mismatch {
        println!(
            "  {} Content hash mismatch: the file was edited or truncated after export",
            "!".yellow()
        );
    }
    Ok(())
}
