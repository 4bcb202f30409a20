//! Config command implementations.

use colored::Colorize;

use crate::cli::commands::print_json;
use crate::cli::ConfigCommands;
use crate::config::{config_path, resolve, resolve_data_dir, save_settings, Overrides, Settings};
use crate::error::{Error, Result};

/// Execute config commands.
pub fn execute(command: &ConfigCommands, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => show(overrides, json),
        ConfigCommands::Set {
            remote_url,
            sync_interval,
            request_timeout,
        } => set(
            Settings {
                remote_url: remote_url.clone(),
                sync_interval_secs: *sync_interval,
                request_timeout_secs: *request_timeout,
            },
            overrides,
            json,
        ),
    }
}

fn show(overrides: &Overrides<'_>, json: bool) -> Result<()> {
    let config = resolve(overrides)?;

    if json {
        return print_json(&config);
    }

    println!("{}", "Configuration".cyan().bold());
    println!("  Data dir:        {}", config.data_dir.display());
    println!("  Database:        {}", config.db_path.display());
    println!("  Remote:          {}", config.remote_url);
    println!("  Sync interval:   {}s", config.sync_interval_secs);
    println!("  Request timeout: {}s", config.request_timeout_secs);
    println!();
    println!("  Config file:     {}", config_path(&config.data_dir).display());
    Ok(())
}

fn set(update: Settings, overrides: &Overrides<'_>, json: bool) -> Result<()> {
    if update == Settings::default() {
        return Err(Error::InvalidArgument(
            "nothing to set; pass --remote-url, --sync-interval or --request-timeout".into(),
        ));
    }
    if update.sync_interval_secs == Some(0) || update.request_timeout_secs == Some(0) {
        return Err(Error::InvalidArgument("durations must be at least 1 second".into()));
    }

    let data_dir = resolve_data_dir(overrides.data_dir)?;
    let stored = save_settings(&data_dir, &update)?;

    if json {
        return print_json(&stored);
    }

    println!(
        "{} Saved {}",
        "✓".green(),
        config_path(&data_dir).display()
    );
    Ok(())
}
