//! linkbox CLI
//!
//! Command-line interface for linkbox - a local bookmark manager.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use linkbox_core::{Config, RecordStore, StoreError};

mod commands;
mod editor;
mod logging;
mod output;

use commands::link::{AddArgs, EditArgs};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "linkbox")]
#[command(about = "linkbox - Local bookmark manager")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a new link
    Add {
        /// URL to save (https:// is added when no scheme is given)
        url: String,
        /// Link title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,
        /// Tags to add (repeatable, or comma-separated)
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// List links, newest first
    #[command(alias = "ls")]
    List {
        /// Filter by tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Only links whose title, url, note or tags contain this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show link details
    Show {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Edit a link (prompts for each field when no flags are given)
    Edit {
        /// Link ID (full ID or prefix)
        id: String,
        /// New URL
        #[arg(long)]
        url: Option<String>,
        /// New title
        #[arg(short = 'T', long)]
        title: Option<String>,
        /// New note
        #[arg(short, long)]
        note: Option<String>,
        /// Replace all tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a link
    #[command(alias = "rm")]
    Delete {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// List all tags
    Tags,
    /// Export all links as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Import links from an export file
    Import {
        /// Export file to read
        file: PathBuf,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, log_level)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config);

    let store = RecordStore::open(&config);

    let result = match cli.command {
        Commands::Add {
            url,
            title,
            note,
            tag,
        } => {
            let args = AddArgs {
                url,
                title,
                note,
                tags: tag,
            };
            commands::link::add(&store, args, &output).await
        }
        Commands::List { tag, search } => commands::link::list(&store, tag, search, &output).await,
        Commands::Show { id } => commands::link::show(&store, &id, &output).await,
        Commands::Edit {
            id,
            url,
            title,
            note,
            tags,
        } => {
            let args = EditArgs {
                url,
                title,
                note,
                tags,
            };
            commands::link::edit(&store, &id, args, &output).await
        }
        Commands::Delete { id } => commands::link::delete(&store, &id, &output).await,
        Commands::Tags => commands::tag::list(&store, &output).await,
        Commands::Export { output: path } => {
            commands::transfer::export(&store, path.as_deref(), &output).await
        }
        Commands::Import { file } => commands::transfer::import(&store, &file, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    };

    if let Err(e) = &result {
        if let Some(hint) = e
            .downcast_ref::<StoreError>()
            .and_then(StoreError::recovery_suggestion)
        {
            eprintln!("Hint: {}", hint);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_tags() {
        let cli = Cli::try_parse_from([
            "linkbox", "add", "example.com", "-t", "rust", "--tag", "cli", "--title", "Ex",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { url, title, tag, .. } => {
                assert_eq!(url, "example.com");
                assert_eq!(title.as_deref(), Some("Ex"));
                assert_eq!(tag, vec!["rust", "cli"]);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_aliases_and_global_flags() {
        let cli = Cli::try_parse_from(["linkbox", "ls", "--json", "--tag", "rust"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::List { tag: Some(_), search: None }));

        let cli =
            Cli::try_parse_from(["linkbox", "--config", "/tmp/c.toml", "rm", "abc"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Commands::Delete { .. }));
    }
}
