use crate::reports;
use clap::Args;
use peloton::analysis::{MonteCarlo, ProgressCallback};
use peloton::config::Config;
use peloton::error::PtResult;
use peloton::race::RaceSimulator;
use peloton::roster;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub team: Option<String>,

    #[arg(short = 'n', long, default_value_t = 1000)]
    pub runs: usize,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Riders listed in the projection table.
    #[arg(long, default_value_t = 25)]
    pub top: usize,
}

/// Logs every tenth of the batch.
struct ConsoleProgress {
    step: usize,
}

impl ProgressCallback for ConsoleProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        if completed % self.step == 0 || completed == total {
            info!("{}/{} races", completed, total);
        }
    }
}

pub fn run(args: &AnalyzeArgs, simulator: Arc<RaceSimulator>) -> PtResult<()> {
    let db = simulator.riders().clone();
    let seed = args.seed.unwrap_or_else(|| fastrand::u64(..));
    let team = match &args.team {
        Some(path) => Some(roster::load_team_from_file(path, &db)?),
        None => None,
    };

    let progress = ConsoleProgress {
        step: (args.runs / 10).max(1),
    };
    let start = Instant::now();
    let aggregate = MonteCarlo::new(simulator, args.runs).run(seed, team.as_ref(), &progress)?;
    let elapsed = start.elapsed().as_secs_f64();

    println!(
        "\n📊 {} races from seed {} in {:.1}s",
        args.runs, seed, elapsed
    );
    let projections = aggregate.projections(&db);
    reports::print_projections(&projections, team.as_ref(), args.top);

    if let Some(summary) = aggregate.team_summary() {
        reports::print_team_summary(&summary);
    }
    Ok(())
}
