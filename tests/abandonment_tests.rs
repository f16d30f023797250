mod common;

use common::RiderBuilder;
use fastrand::Rng;
use peloton::abandonment::AbandonmentModel;
use rstest::rstest;

const EPS: f64 = 1e-12;

fn per_stage(chance: f64, stages: usize) -> f64 {
    1.0 - (1.0 - chance).powf(1.0 / stages as f64)
}

#[rstest]
#[case(0.1, 21, 1.0, per_stage(0.1, 21))]
#[case(0.1, 21, 2.0, 2.0 * per_stage(0.1, 21))]
#[case(0.3, 1, 1.0, 0.3)]
#[case(0.1, 21, 0.0, 0.0)]
#[case(0.5, 21, 1000.0, 1.0)]
#[case(0.0, 21, 1.0, 0.0)]
#[case(0.0, 21, 50.0, 0.0)]
#[case(1.0, 21, 1.0, 1.0)]
fn test_stage_probability(
    #[case] chance: f64,
    #[case] stages: usize,
    #[case] scale: f64,
    #[case] expected: f64,
) {
    let model = AbandonmentModel::new(stages, scale);
    let rider = RiderBuilder::new("R").abandon(chance).build();
    let p = model.stage_probability(&rider);
    assert!((p - expected).abs() < EPS, "got {}, expected {}", p, expected);
}

#[test]
fn test_whole_race_survival_matches_chance() {
    let model = AbandonmentModel::new(21, 1.0);
    let rider = RiderBuilder::new("R").abandon(0.25).build();
    let survive = (1.0 - model.stage_probability(&rider)).powi(21);
    assert!((survive - 0.75).abs() < 1e-9);
}

#[rstest]
fn test_decide_consumes_one_draw(#[values(0.0, 0.3, 1.0)] chance: f64) {
    let model = AbandonmentModel::new(21, 1.0);
    let rider = RiderBuilder::new("R").abandon(chance).build();

    let mut rng = Rng::with_seed(11);
    let mut reference = Rng::with_seed(11);
    model.decide(&rider, 1, &mut rng);
    reference.f64();
    assert_eq!(rng.u64(..), reference.u64(..));
}

#[test]
fn test_zero_chance_never_abandons() {
    let model = AbandonmentModel::new(21, 100.0);
    let rider = RiderBuilder::new("R").abandon(0.0).build();
    let mut rng = Rng::with_seed(3);
    assert!((1..=1000).all(|stage| !model.decide(&rider, stage, &mut rng)));
}

#[test]
fn test_clamped_probability_always_abandons() {
    let model = AbandonmentModel::new(21, 1000.0);
    let rider = RiderBuilder::new("R").abandon(0.5).build();
    let mut rng = Rng::with_seed(3);
    assert!((1..=1000).all(|stage| model.decide(&rider, stage, &mut rng)));
}
