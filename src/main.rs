use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use recap::{RecapRequest, Recapper};
use utils::format_number;

mod aggregate;
mod config;
mod cutoff;
mod debug_log;
mod filter;
mod history;
mod output;
mod rank;
mod recap;
mod types;
mod utils;

#[derive(Parser)]
#[command(name = "recapped")]
#[command(version, about = "Analyze your streaming history year by year")]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    recap: RecapArgs,
}

#[derive(Args)]
struct RecapArgs {
    /// Directory containing the extracted streaming-history export
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Year to summarize; repeat for several. Defaults to every year in the data
    #[arg(short, long = "years", value_parser = utils::parse_year)]
    years: Vec<String>,

    /// Number of top songs and artists to list
    #[arg(short, long)]
    num: Option<usize>,

    /// Compute one summary across all years instead of one per year
    #[arg(short, long, default_value_t = false)]
    all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    subcommand: ConfigSubcommands,
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Create default configuration file
    Init {
        #[arg(long, default_value_t = false)]
        overwrite: bool,
    },
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key (data-dir, top-k, listening-threshold, default-cutoff, cutoff-YYYY, number-comma, locale)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();
    debug_log::init();

    match cli.command {
        None => {
            if let Err(e) = run_recap(cli.recap) {
                eprintln!("Error computing recap: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config(config_args)) => handle_config_subcommand(config_args),
    }
}

fn run_recap(args: RecapArgs) -> Result<()> {
    let config = config::Config::load()
        .context("Failed to load configuration")?
        .unwrap_or_default();
    let format_options = config.format_options();

    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(&config.recap.data_dir));
    let events = history::load_history(&path)?;
    eprintln!(
        "Loaded {} listening events",
        format_number(events.len() as u64, &format_options)
    );

    let request = RecapRequest {
        years: (!args.years.is_empty()).then_some(args.years),
        top_k: args.num.unwrap_or(config.recap.top_k),
        cumulative: args.all,
    };

    if !request.cumulative {
        match &request.years {
            Some(years) => eprintln!("Analyzing data for {}", years.join(", ")),
            None => eprintln!("Analyzing data for every year in the history"),
        }
    }

    let recap = Recapper::new(config.record_filter()).run(&events, &request);

    if request.cumulative {
        match &recap.span {
            Some((first, last)) if first == last => {
                eprintln!("Computing cumulative recap for {first}")
            }
            Some((first, last)) => {
                eprintln!("Computing cumulative recap that spans the years {first}-{last}")
            }
            None => eprintln!("No listening data found, the cumulative recap is empty"),
        }
    }

    for tie in &recap.ties {
        eprintln!("{tie}");
    }

    println!("{}", output::render_report(&recap.report)?);
    Ok(())
}

fn handle_config_subcommand(config_args: ConfigArgs) {
    match config_args.subcommand {
        ConfigSubcommands::Init { overwrite } => {
            if let Err(e) = config::create_default_config(overwrite) {
                eprintln!("Error creating config: {e:#}");
                std::process::exit(1);
            }
        }
        ConfigSubcommands::Show => {
            if let Err(e) = config::show_config() {
                eprintln!("Error showing config: {e:#}");
                std::process::exit(1);
            }
        }
        ConfigSubcommands::Set { key, value } => {
            if let Err(e) = config::set_config_value(&key, &value) {
                eprintln!("Error setting config: {e:#}");
                std::process::exit(1);
            }
        }
    }
}
