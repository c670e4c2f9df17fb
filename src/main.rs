use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use tradepost::cli::routes::RouteOptions;
use tradepost::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short = 'C', long, global = true)]
    config_path: Option<String>,

    /// Keep the price table in memory only, ignoring the stored one
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RouteArgs {
    /// Cargo capacity in cargo spaces
    #[arg(short, long)]
    cargo: Option<f64>,

    /// Money available for buying
    #[arg(short, long)]
    budget: Option<f64>,

    /// Location to avoid, may be repeated
    #[arg(short, long = "avoid", value_name = "LOCATION")]
    avoid: Vec<String>,

    /// Only buy at locations whose name or region contains this text
    #[arg(short, long)]
    start: Option<String>,

    /// Only sell at locations whose name or region contains this text
    #[arg(short, long)]
    end: Option<String>,

    /// Avoid locations configured as illegal
    #[arg(short, long)]
    legal: bool,

    /// Number of routes to show
    #[arg(short = 'n', long, conflicts_with = "all")]
    top: Option<usize>,

    /// Show every route instead of the top ones
    #[arg(long)]
    all: bool,
}

impl From<RouteArgs> for RouteOptions {
    fn from(args: RouteArgs) -> Self {
        RouteOptions {
            cargo: args.cargo,
            budget: args.budget,
            avoid: args.avoid,
            start: args.start,
            end: args.end,
            legal: args.legal,
            top: args.top,
            all: args.all,
        }
    }
}

impl From<Commands> for tradepost::AppCommand {
    fn from(cmd: Commands) -> tradepost::AppCommand {
        match cmd {
            Commands::Routes(args) => tradepost::AppCommand::Routes(args.into()),
            Commands::Refresh => tradepost::AppCommand::Refresh,
            Commands::Locations => tradepost::AppCommand::Locations,
            Commands::Prices { commodity } => tradepost::AppCommand::Prices { commodity },
            Commands::Status => tradepost::AppCommand::Status,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the most profitable trade routes
    Routes(RouteArgs),
    /// Download prices and rebuild the price table
    Refresh,
    /// List trading locations by region
    Locations,
    /// Show buy and sell prices of a commodity
    Prices {
        /// Commodity name, case-insensitive
        commodity: String,
    },
    /// Show when the price table was built and what it holds
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => tradepost::cli::setup::setup_at_path(path),
            None => tradepost::cli::setup::setup(),
        },
        Some(cmd) => {
            tradepost::run_command(cmd.into(), cli.config_path.as_deref(), !cli.no_cache).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
