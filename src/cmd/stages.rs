use crate::reports;
use clap::Args;
use peloton::discipline::Discipline;
use peloton::error::PtResult;
use peloton::stages::StageCatalog;

#[derive(Args, Debug, Clone)]
pub struct StagesArgs {
    /// Only stages whose heaviest terrain is this discipline.
    #[arg(short, long)]
    pub discipline: Option<Discipline>,
}

pub fn run(args: &StagesArgs, catalog: &StageCatalog) -> PtResult<()> {
    let stages = match args.discipline {
        Some(d) => catalog.stages_of(d),
        None => catalog.iter().map(|(n, _)| n).collect(),
    };
    reports::print_stage_catalog(catalog, &stages)
}
