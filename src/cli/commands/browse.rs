//! Read-side commands: show, last, list, categories, filter.

use colored::Colorize;
use rand::Rng;
use serde::Serialize;

use crate::cli::commands::{block_on, open_library, print_json};
use crate::config::{resolve, Overrides};
use crate::error::Result;
use crate::index::{apply_filter, FilterSelection};
use crate::model::Quote;
use crate::storage::SessionCache;

#[derive(Serialize)]
struct ShowOutput {
    quote: Option<Quote>,
    selection: FilterSelection,
}

#[derive(Serialize)]
struct ListOutput {
    selection: FilterSelection,
    quotes: Vec<Quote>,
    count: usize,
}

#[derive(Serialize)]
struct CategoriesOutput {
    categories: Vec<String>,
    selection: FilterSelection,
}

#[derive(Serialize)]
struct FilterOutput {
    requested: String,
    selection: FilterSelection,
    fell_back: bool,
}

/// Show a random quote from the current filter and remember it.
pub fn show(overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let (config, library) = open_library(overrides)?;
    let (quote, selection) = block_on(async {
        (library.random_quote(random_index).await, library.selection().await)
    })?;

    if let Some(quote) = &quote {
        if !SessionCache::new(&config.data_dir).write(quote) {
            tracing::debug!("No session key, last viewed quote not recorded");
        }
    }

    if json {
        return print_json(&ShowOutput { quote, selection });
    }

    match quote {
        Some(quote) => print_quote(&quote),
        None if selection == FilterSelection::All => println!("No quotes available."),
        None => println!("No quotes in category '{selection}'."),
    }
    Ok(())
}

/// Show (or forget) the last quote viewed in this terminal session.
pub fn last(clear: bool, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let config = resolve(overrides)?;
    let cache = SessionCache::new(&config.data_dir);

    if clear {
        let cleared = cache.clear();
        if json {
            return print_json(&serde_json::json!({ "cleared": cleared }));
        }
        println!("Last viewed quote forgotten.");
        return Ok(());
    }

    let last = cache.read();

    if json {
        return print_json(&last);
    }

    match last {
        Some(last) => {
            print_quote(&last.quote);
            if let Some(at) = chrono::DateTime::from_timestamp_millis(last.viewed_at) {
                let local = at.with_timezone(&chrono::Local);
                println!("  {}", format!("viewed at {}", local.format("%H:%M")).dimmed());
            }
        }
        None => println!("No quote viewed in this session yet. Try `qb show`."),
    }
    Ok(())
}

/// List quotes under the saved filter, or under `category` if given.
pub fn list(category: Option<&str>, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let (_, library) = open_library(overrides)?;

    let (selection, quotes) = block_on(async {
        match category {
            Some(raw) => {
                let selection: FilterSelection = raw.parse().unwrap_or_default();
                let quotes = apply_filter(&library.quotes().await, &selection);
                (selection, quotes)
            }
            None => (library.selection().await, library.filtered_quotes().await),
        }
    })?;

    if json {
        let count = quotes.len();
        return print_json(&ListOutput {
            selection,
            quotes,
            count,
        });
    }

    if quotes.is_empty() {
        println!("No quotes found.");
        return Ok(());
    }

    println!("{} ({}):", "Quotes".bold(), selection.to_string().cyan());
    for quote in &quotes {
        println!("  \"{}\" {}", quote.text(), format!("[{}]", quote.category()).dimmed());
    }
    println!();
    println!("Total: {}", quotes.len());
    Ok(())
}

/// List the category index, marking the active selection.
pub fn categories(overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let (_, library) = open_library(overrides)?;
    let (index, selection) =
        block_on(async { (library.categories().await, library.selection().await) })?;

    if json {
        return print_json(&CategoriesOutput {
            categories: index.iter().map(String::from).collect(),
            selection,
        });
    }

    if index.is_empty() {
        println!("No categories.");
        return Ok(());
    }

    let marker = |active: bool| if active { "*".green().to_string() } else { " ".to_string() };
    println!("{} {}", marker(selection == FilterSelection::All), "all".bold());
    for category in index.iter() {
        let active = matches!(&selection, FilterSelection::Category(c) if c == category);
        println!("{} {category}", marker(active));
    }
    Ok(())
}

/// Change and persist the category filter.
pub fn filter(requested: &str, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let (_, library) = open_library(overrides)?;
    let wanted: FilterSelection = requested.parse().unwrap_or_default();
    let selection = block_on(library.on_filter_changed(wanted.clone()))??;
    let fell_back = selection != wanted;

    if json {
        return print_json(&FilterOutput {
            requested: requested.to_string(),
            selection,
            fell_back,
        });
    }

    if fell_back {
        println!(
            "{} Unknown category '{}', showing all quotes.",
            "!".yellow(),
            requested.trim()
        );
    } else {
        println!("Filter set to {}", selection.to_string().cyan());
    }
    Ok(())
}

fn print_quote(quote: &Quote) {
    println!("\"{}\"", quote.text().bold());
    println!("  {} {}", "-".dimmed(), quote.category().cyan());
}

/// Uniform index in `0..len`; 0 for an empty range.
fn random_index(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..len)
}
