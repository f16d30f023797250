use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use peloton::config::Config;
use peloton::error::PtResult;
use peloton::race::RaceSimulator;
use peloton::roster;
use peloton::stages::StageCatalog;
use std::process;
use std::sync::Arc;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, short, long, default_value = "data/riders.csv")]
    riders: String,

    /// JSON file with race, point and tier parameters.
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Simulate(cmd::simulate::SimulateArgs),
    Analyze(cmd::analyze::AnalyzeArgs),
    Stages(cmd::stages::StagesArgs),
}

/// File values first, then anything typed on the command line.
fn resolve_config(
    path: Option<&str>,
    cli_config: &Config,
    sub_matches: Option<&ArgMatches>,
) -> PtResult<Config> {
    let Some(path) = path else {
        return Ok(cli_config.clone());
    };
    info!("Loading config from {}", path);
    let mut config = Config::load_from_file(path)?;
    if let Some(matches) = sub_matches {
        config.merge_from_cli(cli_config, matches);
    }
    Ok(config)
}

fn build_simulator(cli: &Cli, config: &Config) -> PtResult<Arc<RaceSimulator>> {
    let riders = Arc::new(roster::load_riders_from_file(&cli.riders)?);
    let catalog = Arc::new(StageCatalog::default());
    Ok(Arc::new(RaceSimulator::new(riders, catalog, config)?))
}

fn execute(cli: Cli, matches: &ArgMatches) -> PtResult<()> {
    let sub_matches = matches.subcommand().map(|(_, m)| m);

    match &cli.command {
        Commands::Simulate(args) => {
            let config = resolve_config(cli.config.as_deref(), &args.config, sub_matches)?;
            let simulator = build_simulator(&cli, &config)?;
            cmd::simulate::run(args, simulator)
        }
        Commands::Analyze(args) => {
            let config = resolve_config(cli.config.as_deref(), &args.config, sub_matches)?;
            let simulator = build_simulator(&cli, &config)?;
            cmd::analyze::run(args, simulator)
        }
        Commands::Stages(args) => cmd::stages::run(args, &StageCatalog::default()),
    }
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = execute(cli, &matches) {
        error!("{}", e);
        process::exit(1);
    }
}
