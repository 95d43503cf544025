use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod file_discovery;
mod orchestrators;
mod output;
mod progress;
mod terminal;

use crate::config::{AppConfig, ConfigManager};
use crate::orchestrators::{CheckOptions, HashOptions, run_check, run_hash};
use crate::output::OutputFormat;
use simplehasher_core::HashAlgorithm;

#[derive(Parser)]
#[command(name = "simplehasher")]
#[command(author, version, about = "Compute and verify MD5, SHA-1, SHA-2 and Tiger digests of files", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate digests for files
    Hash {
        /// Files or directories to hash
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hash algorithm to use (can be specified multiple times)
        #[arg(short, long = "algorithm", value_name = "ALGO", value_parser = parse_algorithm)]
        algorithms: Vec<HashAlgorithm>,

        /// Use every supported algorithm
        #[arg(long, conflicts_with = "algorithms")]
        all: bool,

        /// Hash the contents of directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Maximum number of digests computed at once (0 = one per core)
        #[arg(short, long, value_name = "N")]
        workers: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write <ALGO>SUMS.txt checksum files into this directory
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,

        /// Disable progress bar display
        #[arg(long)]
        no_progress: bool,
    },

    /// Verify files listed in checksum files such as SHA256SUMS.txt
    Check {
        /// Checksum files to verify
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only print entries that failed
        #[arg(short, long)]
        quiet: bool,

        /// Maximum number of digests computed at once (0 = one per core)
        #[arg(short, long, value_name = "N")]
        workers: Option<usize>,

        /// Disable progress bar display
        #[arg(long)]
        no_progress: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g., hasher.workers)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., hasher.workers)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration values
    List,

    /// Print the configuration file location
    Path,
}

fn parse_algorithm(value: &str) -> std::result::Result<HashAlgorithm, String> {
    value.parse().map_err(|e: simplehasher_core::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on debug flag
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("simplehasher_core", log::LevelFilter::Debug)
            .filter_module("simplehasher_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let success = match cli.command {
        Commands::Hash {
            paths,
            algorithms,
            all,
            recursive,
            workers,
            format,
            save,
            no_progress,
        } => {
            let mut config = load_config()?;
            config.apply_cli_overrides(workers);
            let use_color = configure_color(&config);

            let algorithms = if all {
                HashAlgorithm::ALL.to_vec()
            } else if algorithms.is_empty() {
                config.default_algorithms()?
            } else {
                dedup(algorithms)
            };
            let format = match format {
                Some(format) => format,
                None => OutputFormat::from_string(&config.output.default_format)?,
            };

            let options = HashOptions {
                paths,
                algorithms,
                recursive,
                format,
                save_dir: save,
                show_progress: show_progress(&config, no_progress),
                use_color,
            };
            run_hash(&config, options).await?
        }
        Commands::Check {
            files,
            quiet,
            workers,
            no_progress,
        } => {
            let mut config = load_config()?;
            config.apply_cli_overrides(workers);
            configure_color(&config);

            let options = CheckOptions {
                sums_files: files,
                quiet,
                show_progress: show_progress(&config, no_progress),
            };
            run_check(&config, options).await?
        }
        Commands::Config { command } => {
            config_command(command)?;
            true
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn load_config() -> Result<AppConfig> {
    ConfigManager::new()
        .load()
        .context("Failed to load configuration")
}

/// Disable colors globally unless the config and the terminal allow them
fn configure_color(config: &AppConfig) -> bool {
    let use_color = config.output.color_enabled && terminal::supports_ansi();
    if !use_color {
        colored::control::set_override(false);
    }
    use_color
}

fn show_progress(config: &AppConfig, no_progress: bool) -> bool {
    !no_progress && config.output.progress_enabled && terminal::should_show_progress_by_default()
}

/// Keep the first occurrence of each algorithm
fn dedup(algorithms: Vec<HashAlgorithm>) -> Vec<HashAlgorithm> {
    let mut unique = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        if !unique.contains(&algorithm) {
            unique.push(algorithm);
        }
    }
    unique
}

fn config_command(command: ConfigCommand) -> Result<()> {
    let mut manager = ConfigManager::new();

    match command {
        ConfigCommand::Get { key } => {
            println!("{}", manager.get(&key)?);
        }
        ConfigCommand::Set { key, value } => {
            manager.set(&key, &value)?;
            eprintln!("{}", format!("Set {key} = {value}").green());
            eprintln!(
                "Configuration saved to: {}",
                manager.get_config_path().display()
            );
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {}", manager.get_config_path().display());
            eprintln!();

            // Group items by section
            let mut sections: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
            for (key, value) in items {
                let section = key.split('.').next().unwrap_or("general").to_string();
                sections.entry(section).or_default().push((key, value));
            }

            for (section, items) in sections {
                println!("[{}]", section.yellow());
                for (key, value) in items {
                    let display_key = key.split_once('.').map_or(key.as_str(), |(_, rest)| rest);
                    println!("  {} = {}", display_key.cyan(), value);
                }
                println!();
            }
        }
        ConfigCommand::Path => {
            println!("{}", manager.get_config_path().display());
        }
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
