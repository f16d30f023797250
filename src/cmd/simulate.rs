use crate::reports;
use clap::Args;
use peloton::classification::Classification;
use peloton::config::Config;
use peloton::error::PtResult;
use peloton::race::RaceSimulator;
use peloton::roster;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub config: Config,

    /// Fantasy team file, one rider per line.
    #[arg(short, long)]
    pub team: Option<String>,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Rows shown per classification.
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}

pub fn run(args: &SimulateArgs, simulator: Arc<RaceSimulator>) -> PtResult<()> {
    let db = simulator.riders().clone();
    let seed = args.seed.unwrap_or_else(|| fastrand::u64(..));
    let team = match &args.team {
        Some(path) => Some(roster::load_team_from_file(path, &db)?),
        None => None,
    };

    info!("Simulating race with seed {}", seed);
    if let Some(team) = &team {
        debug!("Team: {}", team.names().join(", "));
    }

    let (outcome, score) = match &team {
        Some(team) => {
            let (outcome, score) = simulator.run_with_team(team, seed)?;
            (outcome, Some(score))
        }
        None => (simulator.run(seed), None),
    };

    println!("\n🚴 Race simulated (seed {})", seed);
    reports::print_stage_winners(&outcome, &db);
    for class in Classification::iter() {
        reports::print_classification(&outcome, &db, class, args.top);
    }
    reports::print_withdrawals(&outcome, &db);

    if let (Some(team), Some(score)) = (&team, &score) {
        reports::print_fantasy_score(team, score, &db);
    }
    Ok(())
}
