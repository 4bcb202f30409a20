//! Quotebook CLI entry point.

use clap::Parser;
use qb::cli::commands;
use qb::cli::{Cli, Commands};
use qb::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let overrides = cli.overrides();

    match &cli.command {
        // Browsing
        Commands::Show => commands::browse::show(&overrides, json),
        Commands::Last { clear } => commands::browse::last(*clear, &overrides, json),
        Commands::List { category } => {
            commands::browse::list(category.as_deref(), &overrides, json)
        }
        Commands::Categories => commands::browse::categories(&overrides, json),
        Commands::Filter { selection } => commands::browse::filter(selection, &overrides, json),

        // Mutations
        Commands::Add {
            text,
            category,
            no_post,
        } => commands::add::execute(text, category, *no_post, &overrides, json),

        // Sync
        Commands::Sync => commands::sync::sync(&overrides, json),
        Commands::Watch { interval } => commands::sync::watch(*interval, &overrides, json),

        // Transfer
        Commands::Export { output } => {
            commands::transfer::export(output.as_deref(), &overrides, json)
        }
        Commands::Import { file } => commands::transfer::import(file, &overrides, json),

        Commands::Config { command } => commands::config::execute(command, &overrides, json),
        Commands::Completions { shell } => commands::completions::execute(*shell),
        Commands::Version => commands::version::execute(json),
    }
}
