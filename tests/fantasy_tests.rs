mod common;

use common::{field, rider_name, stage_outcome, stage_with_abandons};
use peloton::error::PelotonError;
use peloton::fantasy::{
    field_points, FantasyScoringEngine, PointTables, SlotBoard, SlotState, TeamSelection,
    SCORING_SLOTS,
};
use peloton::riders::{RiderDatabase, RiderId};
use rstest::rstest;

fn default_team(db: &RiderDatabase) -> TeamSelection {
    TeamSelection::from_ids((0..20).collect(), db).unwrap()
}

/// Everyone in `order` finishes; `first` is moved to the front.
fn order_with_leader(n: usize, first: RiderId, skip: &[RiderId]) -> Vec<RiderId> {
    let mut order = vec![first];
    order.extend((0..n).filter(|&r| r != first && !skip.contains(&r)));
    order
}

#[rstest]
#[case(1, 1, 20)]
#[case(5, 1, 30)]
#[case(1, 10, 1)]
#[case(13, 2, 20)]
#[case(1, 11, 0)]
#[case(5, 11, 0)]
fn test_stage_points(#[case] stage: usize, #[case] rank: usize, #[case] expected: u32) {
    assert_eq!(PointTables::default().stage_points(stage, rank), expected);
}

#[test]
fn test_point_tables_must_not_increase() {
    let mut regular = [20, 15, 12, 9, 7, 5, 4, 3, 2, 1];
    regular[4] = 10;
    let err = PointTables::new(regular, [30, 20, 15, 12, 10, 8, 6, 4, 2, 1], vec![5], [5, 4, 3, 2, 1]);
    assert!(matches!(err, Err(PelotonError::Config(_))));
}

#[test]
fn test_team_validation() {
    let db = field(25);
    let names: Vec<String> = (0..20).map(rider_name).collect();
    assert!(TeamSelection::new(&names, &db).is_ok());

    assert!(matches!(
        TeamSelection::new(&names[..19], &db),
        Err(PelotonError::InvalidTeam(_))
    ));

    let mut unknown = names.clone();
    unknown[7] = "Nobody".to_string();
    assert!(matches!(
        TeamSelection::new(&unknown, &db),
        Err(PelotonError::UnknownRider(n)) if n == "Nobody"
    ));

    let mut dup = names.clone();
    dup[19] = dup[0].clone();
    assert!(matches!(
        TeamSelection::new(&dup, &db),
        Err(PelotonError::InvalidTeam(_))
    ));

    let team = TeamSelection::new(&names, &db).unwrap();
    assert_eq!(team.scoring().len(), 15);
    assert_eq!(team.reserves(), &[15, 16, 17, 18, 19]);
    assert_eq!(team.bonus(), &[0, 1, 2, 3, 4]);
}

#[test]
fn test_scoring_slot_cascade_after_stage_five() {
    let db = field(25);
    let team = default_team(&db);
    let mut engine = FantasyScoringEngine::new(&team, PointTables::default());

    // The reserve in slot 16 wins every stage.
    for stage in 1..=4 {
        engine.apply_stage(&stage_outcome(stage, &order_with_leader(25, 15, &[]), &[]));
    }
    engine.apply_stage(&stage_outcome(5, &order_with_leader(25, 15, &[2]), &[2]));

    let board = engine.board();
    assert_eq!(board.occupant(2), Some(3));
    assert_eq!(board.occupant(13), Some(14));
    assert_eq!(board.occupant(14), Some(15));
    assert_eq!(board.active_scoring_count(), SCORING_SLOTS);
    assert_eq!(board.state(2), Some(SlotState::Reassigned));
    assert_eq!(board.state(1), Some(SlotState::Active));

    let history = board.replacement_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].effective_stage, 6);
    assert_eq!(history[0].rider, 2);
    assert_eq!(history[0].vacated_slot, 2);
    assert_eq!(history[0].filled_by, Some(3));

    engine.apply_stage(&stage_outcome(6, &order_with_leader(25, 15, &[2]), &[]));
    let score = engine.finish();

    // Reserve scored only once promoted.
    assert_eq!(score.rider(15).unwrap().stage_points, 20);
    assert_eq!(score.rider(15).unwrap().stages_scored, 1);

    // Rider 2 was 4th on stages 1-4 (9 pts + bonus 3), nothing on stage 5.
    let r2 = score.rider(2).unwrap();
    assert_eq!(r2.stage_points, 36);
    assert_eq!(r2.bonus_points, 12);

    assert_eq!(score.slot_totals.iter().sum::<u32>(), score.team_total);
    assert_eq!(score.stage_totals.iter().sum::<u32>(), score.team_total);
    assert_eq!(score.stage_totals.len(), 6);
}

#[test]
fn test_bonus_cascade_never_refills_from_below() {
    let db = field(25);
    let team = default_team(&db);
    let mut engine = FantasyScoringEngine::new(&team, PointTables::default());

    let stage_one: Vec<RiderId> = (0..25).filter(|&r| r != 1).collect();
    engine.apply_stage(&stage_outcome(1, &stage_one, &[1]));
    let after_one = engine.clone().finish();

    let board = engine.board();
    assert_eq!(board.bonus_slot_of(0), Some(1));
    assert_eq!(board.bonus_slot_of(2), Some(2));
    assert_eq!(board.bonus_slot_of(4), Some(4));
    assert_eq!(board.bonus_slot_of(5), None);
    assert_eq!(board.bonus_slot_of(1), None);

    engine.apply_stage(&stage_outcome(2, &stage_one, &[]));
    let after_two = engine.finish();

    // Former bonus slot 3 rider now earns the slot-2 value.
    let gained = after_two.rider(2).unwrap().bonus_points - after_one.rider(2).unwrap().bonus_points;
    assert_eq!(gained, 4);
    // Former slot 6 rider finished top 10 twice but never became bonus-eligible.
    assert_eq!(after_two.rider(5).unwrap().bonus_points, 0);
}

#[test]
fn test_unfilled_slots_score_zero() {
    let db = field(25);
    let team = default_team(&db);
    let mut engine = FantasyScoringEngine::new(&team, PointTables::default());

    let out: Vec<RiderId> = (0..6).collect();
    let finishers: Vec<RiderId> = (6..25).collect();
    engine.apply_stage(&stage_outcome(1, &finishers, &out));

    let board = engine.board();
    assert_eq!(board.active_scoring_count(), 14);
    assert_eq!(board.state(14), Some(SlotState::Unfilled));
    assert_eq!(board.occupant(14), None);
    assert_eq!(board.occupant(0), Some(6));

    engine.apply_stage(&stage_outcome(2, &finishers, &[]));
    let score = engine.finish();
    // Rider 14 was 9th on stage 1 in slot 15; the slot is empty on stage 2.
    assert_eq!(score.slot_totals[14], 2);
}

#[test]
fn test_non_starter_vacated_before_first_stage() {
    let db = field(25);
    let team = default_team(&db);
    let mut engine = FantasyScoringEngine::new(&team, PointTables::default());

    let order: Vec<RiderId> = (1..25).collect();
    engine.apply_stage(&stage_outcome(1, &order, &[]));
    let score = engine.finish();

    assert_eq!(score.replacements.len(), 1);
    assert_eq!(score.replacements[0].effective_stage, 1);
    assert_eq!(score.replacements[0].filled_by, Some(1));
    // Rider 1 won stage 1 from bonus position 1.
    assert_eq!(score.rider(1).unwrap().stage_points, 20);
    assert_eq!(score.rider(1).unwrap().bonus_points, 5);
    assert_eq!(score.rider(0).unwrap().total(), 0);
}

#[test]
fn test_post_pass_matches_inline() {
    let db = field(25);
    let team = default_team(&db);
    let tables = PointTables::default();
    let stages = vec![
        stage_outcome(1, &order_with_leader(25, 20, &[]), &[]),
        stage_outcome(2, &order_with_leader(25, 3, &[0]), &[0]),
        stage_outcome(3, &order_with_leader(25, 16, &[0, 7]), &[7]),
    ];

    let mut engine = FantasyScoringEngine::new(&team, tables.clone());
    for s in &stages {
        engine.apply_stage(s);
    }
    assert_eq!(engine.finish(), FantasyScoringEngine::score(&team, &tables, &stages));
}

#[test]
fn test_field_points() {
    let tables = PointTables::default();
    let stages = vec![
        stage_outcome(1, &[2, 0, 1], &[]),
        stage_outcome(5, &[0, 1], &[2]),
    ];
    let pts = field_points(&stages, &tables, 4);
    assert_eq!(pts, vec![15 + 30, 12 + 20, 20, 0]);
}

#[test]
fn test_abandoner_in_first_place_scores_nothing() {
    let db = field(25);
    let team = default_team(&db);
    let mut engine = FantasyScoringEngine::new(&team, PointTables::default());

    // Rider 0 led the stage on the road but left before the finish.
    let order: Vec<RiderId> = (0..25).collect();
    engine.apply_stage(&stage_with_abandons(1, &order, &[0]));
    engine.apply_stage(&stage_outcome(2, &(1..25).collect::<Vec<_>>(), &[]));
    let score = engine.finish();

    assert_eq!(score.rider(0).unwrap().total(), 0);
    // Rider 1 kept second place: 15 points plus the bonus-slot-2 value on
    // stage 1, then a win from bonus slot 1 on stage 2.
    let r1 = score.rider(1).unwrap();
    assert_eq!(r1.stage_points, 15 + 20);
    assert_eq!(r1.bonus_points, 4 + 5);
    assert_eq!(score.replacements[0].effective_stage, 2);
}

#[test]
fn test_field_points_skip_abandoning_stage() {
    let tables = PointTables::default();
    let stages = vec![stage_with_abandons(1, &[2, 0, 1], &[2])];
    assert_eq!(field_points(&stages, &tables, 3), vec![15, 12, 0]);
}

#[test]
fn test_slot_board_marks_and_promotes() {
    let db = field(25);
    let team = default_team(&db);
    assert!(team.contains(19));
    assert!(!team.contains(20));

    let mut board = SlotBoard::new(&team);
    assert!(!board.has_vacancies());
    assert!(!board.mark_abandoned(20));
    assert!(board.mark_abandoned(7));
    assert!(!board.mark_abandoned(7));
    assert!(board.has_vacancies());
    assert_eq!(board.state(7), Some(SlotState::Vacated));

    board.promote(4);
    assert!(!board.has_vacancies());
    assert_eq!(board.occupant(7), Some(8));
    assert!(!board.is_active(7));
    assert_eq!(board.active_riders().count(), 19);
}
