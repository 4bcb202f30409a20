//! `qb version`: the binary version plus the on-disk formats it reads and
//! writes, so two installs can tell whether their exports and databases
//! are interchangeable.

use serde::Serialize;

use crate::cli::commands::print_json;
use crate::error::Result;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use crate::sync::{EXPORT_FORMAT, EXPORT_VERSION};

#[derive(Debug, Serialize)]
struct Formats {
    export: String,
    schema: i32,
}

#[derive(Debug, Serialize)]
struct VersionReport {
    name: &'static str,
    version: &'static str,
    profile: &'static str,
    formats: Formats,
}

impl VersionReport {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            profile: if cfg!(debug_assertions) { "debug" } else { "release" },
            formats: Formats {
                export: format!("{EXPORT_FORMAT}/v{EXPORT_VERSION}"),
                schema: CURRENT_SCHEMA_VERSION,
            },
        }
    }
}

/// Print version and format information.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let report = VersionReport::current();
    if json {
        return print_json(&report);
    }

    println!("{} {} ({})", report.name, report.version, report.profile);
    println!("  export format  {}", report.formats.export);
    println!("  store schema   v{}", report.formats.schema);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_names_formats() {
        let report = VersionReport::current();
        assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(report.formats.export, "quotebook/v1");

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["formats"]["schema"], CURRENT_SCHEMA_VERSION);
    }
}
