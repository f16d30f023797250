mod common;

use common::RiderBuilder;
use peloton::analysis::{Aggregate, MonteCarlo, NoProgress, ProgressCallback};
use peloton::config::Config;
use peloton::fantasy::TeamSelection;
use peloton::race::RaceSimulator;
use peloton::riders::RiderDatabase;
use peloton::stages::StageCatalog;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn simulator() -> Arc<RaceSimulator> {
    let riders = (0..30)
        .map(|i| {
            RiderBuilder::new(&format!("Rider {:02}", i))
                .all((40 + i * 2) as u8)
                .abandon(0.2)
                .build()
        })
        .collect();
    let db = Arc::new(RiderDatabase::new(riders).unwrap());
    Arc::new(RaceSimulator::new(db, Arc::new(StageCatalog::default()), &Config::default()).unwrap())
}

fn per_race(sim: &RaceSimulator, seeds: std::ops::Range<u64>, team: Option<&TeamSelection>) -> Vec<Aggregate> {
    seeds
        .map(|seed| match team {
            Some(t) => {
                let (race, score) = sim.run_with_team(t, seed).unwrap();
                Aggregate::from_race(&race, Some(&score), sim.points(), sim.riders().len())
            }
            None => Aggregate::from_race(&sim.run(seed), None, sim.points(), sim.riders().len()),
        })
        .collect()
}

#[test]
fn test_merge_is_order_independent() {
    let sim = simulator();
    let team = TeamSelection::from_ids((0..20).collect(), sim.riders()).unwrap();
    let parts = per_race(&sim, 0..12, Some(&team));
    let n = sim.riders().len();

    let forward = parts
        .iter()
        .cloned()
        .fold(Aggregate::empty(n), Aggregate::merge);
    let backward = parts
        .iter()
        .rev()
        .cloned()
        .fold(Aggregate::empty(n), Aggregate::merge);
    let (left, right) = parts.split_at(5);
    let halves = left
        .iter()
        .cloned()
        .fold(Aggregate::empty(n), Aggregate::merge)
        .merge(right.iter().cloned().fold(Aggregate::empty(n), Aggregate::merge));

    assert_eq!(forward, backward);
    assert_eq!(forward, halves);
    assert_eq!(forward.team.races, 12);
    assert!(forward.riders.iter().all(|r| r.races == 12));
}

#[test]
fn test_parallel_run_matches_sequential_fold() {
    let sim = simulator();
    let n = sim.riders().len();
    let expected = per_race(&sim, 100..140, None)
        .into_iter()
        .fold(Aggregate::empty(n), Aggregate::merge);

    let mc = MonteCarlo::new(sim.clone(), 40);
    let a = mc.run(100, None, &NoProgress).unwrap();
    let b = mc.run(100, None, &NoProgress).unwrap();
    assert_eq!(a, expected);
    assert_eq!(a, b);
    assert!(a.team_summary().is_none());
}

struct Counter(AtomicUsize);

impl ProgressCallback for Counter {
    fn on_progress(&self, completed: usize, total: usize) {
        assert!(completed <= total);
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_progress_reported_for_every_race() {
    let sim = simulator();
    let counter = Counter(AtomicUsize::new(0));
    MonteCarlo::new(sim, 25).run(0, None, &counter).unwrap();
    assert_eq!(counter.0.load(Ordering::SeqCst), 25);
}

#[test]
fn test_projections_and_team_summary() {
    let sim = simulator();
    let team = TeamSelection::from_ids((10..30).collect(), sim.riders()).unwrap();
    let agg = MonteCarlo::new(sim.clone(), 60)
        .run(7, Some(&team), &NoProgress)
        .unwrap();

    let projections = agg.projections(sim.riders());
    assert_eq!(projections.len(), 30);
    assert!(projections.windows(2).all(|w| w[0].mean >= w[1].mean));
    for p in &projections {
        assert!(p.variance >= 0.0);
        assert!((0.0..=1.0).contains(&p.finish_rate));
    }
    // The strongest rider is projected ahead of the weakest.
    let pos = |name: &str| projections.iter().position(|p| p.name == name).unwrap();
    assert!(pos("Rider 29") < pos("Rider 00"));

    let summary = agg.team_summary().unwrap();
    assert_eq!(summary.races, 60);
    assert!(summary.min as f64 <= summary.mean && summary.mean <= summary.max as f64);
}
