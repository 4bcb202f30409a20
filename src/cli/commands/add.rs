//! Add command implementation.

use colored::Colorize;

use crate::cli::commands::{block_on, open_library, print_json};
use crate::config::Overrides;
use crate::error::Result;
use crate::sync::AddOutcome;

/// Add a quote locally and, unless `no_post`, post it to the remote.
pub fn execute(
    text: &str,
    category: &str,
    no_post: bool,
    overrides: &Overrides<'_>,
    json: bool,
) -> Result<()> {
    let (_, library) = open_library(overrides)?;

    let outcome = block_on(async {
        if no_post {
            library.add_local(text, category).await.map(|quote| AddOutcome {
                quote,
                posted: false,
            })
        } else {
            library.on_add_quote(text, category).await
        }
    })??;

    if json {
        return print_json(&outcome);
    }

    println!(
        "{} Added \"{}\" [{}]",
        "✓".green(),
        outcome.quote.text(),
        outcome.quote.category().cyan()
    );
    if !no_post && !outcome.posted {
        println!(
            "  {} Could not reach the remote; the quote is kept locally.",
            "!".yellow()
        );
    }
    Ok(())
}
