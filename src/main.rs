use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use params::QueryParams;
use store::RecordStore;
use types::{RankMode, TimeWindow};

mod aggregate;
mod config;
mod error;
mod fetch;
mod params;
mod rank;
mod store;
mod tui;
mod types;
mod utils;
mod views;

#[derive(Parser)]
#[command(name = "loglens")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Fetch the access log from this URL instead of the configured one
    #[arg(long)]
    url: Option<String>,

    /// Read the access log from a local CSV file instead of fetching
    #[arg(long)]
    file: Option<PathBuf>,

    /// Use comma-separated number formatting
    #[arg(long)]
    number_comma: bool,

    /// Use human-readable number formatting (k, m, b, t)
    #[arg(short = 'H', long)]
    number_human: bool,

    /// Locale for number formatting (en, de, fr, es, it, ja, ko, zh)
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Output the assembled dashboard views as JSON
    Views(ViewsArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct ViewsArgs {
    /// Time window: all, 7d, or 30d
    #[arg(long, default_value = "all")]
    window: TimeWindow,

    /// Rank mode for the user/member views: none, top, or bottom
    #[arg(long, default_value = "top")]
    rank: RankMode,

    /// How many ranked rows to keep (5-50)
    #[arg(short, long)]
    n: Option<usize>,

    /// Substring filter on the user column of the raw table
    #[arg(long, default_value = "")]
    user: String,

    /// Substring filter on the member column of the raw table
    #[arg(long, default_value = "")]
    member: String,

    /// Status values to keep in the raw table (defaults to all observed)
    #[arg(long)]
    status: Vec<String>,

    /// Request log-scaled bars in the ranked chart hints
    #[arg(long)]
    log_scale: bool,

    /// Pretty-print JSON instead of a single line
    #[arg(long, default_value_t = false)]
    pretty: bool,
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
        /// Configuration key (url, user-agent, timeout-seconds, rank-n,
        /// log-scale, number-comma, number-human, locale, decimal-places)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Where this session's records come from: the one cached fetch per session,
/// re-run only on an explicit reload.
enum Source {
    Remote {
        url: String,
        user_agent: String,
        timeout: Duration,
    },
    Local(PathBuf),
}

impl Source {
    fn from_cli(cli: &Cli, config: &config::Config) -> Self {
        if let Some(path) = &cli.file {
            return Source::Local(path.clone());
        }
        Source::Remote {
            url: cli.url.clone().unwrap_or_else(|| config.source.url.clone()),
            user_agent: config.source.user_agent.clone(),
            timeout: Duration::from_secs(config.source.timeout_seconds),
        }
    }

    fn label(&self) -> String {
        match self {
            Source::Remote { url, .. } => url.clone(),
            Source::Local(path) => path.display().to_string(),
        }
    }

    async fn load(&self) -> error::Result<RecordStore> {
        let records = match self {
            Source::Remote {
                url,
                user_agent,
                timeout,
            } => fetch::fetch_records(url, user_agent, *timeout).await?,
            Source::Local(path) => fetch::read_records_from_path(path)?,
        };
        Ok(RecordStore::new(records))
    }
}

#[tokio::main]
async fn main() {
    let mut cli = Cli::parse();
    let command = cli.command.take();

    // Load config file to get defaults
    let config = config::Config::load().unwrap_or(None).unwrap_or_default();

    // Create format options merging config defaults with CLI overrides
    let format_options = utils::NumberFormatOptions {
        use_comma: cli.number_comma || config.formatting.number_comma,
        use_human: cli.number_human || config.formatting.number_human,
        locale: cli
            .locale
            .clone()
            .unwrap_or_else(|| config.formatting.locale.clone()),
        decimal_places: config.formatting.decimal_places,
    };

    match command {
        None => {
            if let Err(e) = run_dashboard(&cli, &config, format_options).await {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Views(args)) => {
            if let Err(e) = run_views(&cli, &config, &args).await {
                eprintln!("Error generating views: {e:#}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config(config_args)) => {
            handle_config_subcommand(config_args);
        }
    }
}

async fn run_dashboard(
    cli: &Cli,
    config: &config::Config,
    format_options: utils::NumberFormatOptions,
) -> Result<()> {
    let source = Source::from_cli(cli, config);
    params::validate_rank_n(config.display.rank_n).context("config display.rank-n")?;

    loop {
        eprintln!("Loading access log from {} ...", source.label());
        let store = source.load().await?;

        let params = QueryParams {
            log_scale: config.display.log_scale,
            n: config.display.rank_n,
            status_filter: store.distinct_statuses().into_iter().collect(),
            ..QueryParams::default()
        };

        match tui::run_tui(store, params, format_options.clone(), source.label())? {
            tui::TuiOutcome::Quit => return Ok(()),
            tui::TuiOutcome::Reload => continue,
        }
    }
}

async fn run_views(cli: &Cli, config: &config::Config, args: &ViewsArgs) -> Result<()> {
    let source = Source::from_cli(cli, config);
    let store = source.load().await?;

    let status_filter = if args.status.is_empty() {
        store.distinct_statuses().into_iter().collect()
    } else {
        args.status.iter().cloned().collect()
    };

    let params = QueryParams::new(
        args.window,
        args.log_scale,
        args.rank,
        args.n.unwrap_or(config.display.rank_n),
        args.user.clone(),
        args.member.clone(),
        status_filter,
    )?;

    let views = views::assemble(&store, &params)?;

    if args.pretty {
        let json = serde_json::to_string_pretty(&views)?;
        println!("{json}");
    } else {
        let json = serde_json::to_string(&views)?;
        println!("{json}");
    }

    Ok(())
}

fn handle_config_subcommand(config_args: ConfigArgs) {
    match config_args.subcommand {
        ConfigSubcommands::Init { overwrite } => {
            if let Err(e) = config::create_default_config(overwrite) {
                eprintln!("Error creating config: {e}");
                std::process::exit(1);
            }
        }
        ConfigSubcommands::Show => {
            if let Err(e) = config::show_config() {
                eprintln!("Error showing config: {e}");
                std::process::exit(1);
            }
        }
        ConfigSubcommands::Set { key, value } => {
            if let Err(e) = config::set_config_value(&key, &value) {
                eprintln!("Error setting config: {e}");
                std::process::exit(1);
            }
        }
    }
}
