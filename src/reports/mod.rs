use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use peloton::analysis::{RiderProjection, TeamSummary};
use peloton::classification::Classification;
use peloton::error::PtResult;
use peloton::fantasy::{FantasyScore, TeamSelection, BONUS_SLOTS, SCORING_SLOTS};
use peloton::race::{RaceOutcome, WithdrawalKind};
use peloton::riders::RiderDatabase;
use peloton::stages::StageCatalog;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn fmt_time(seconds: f64) -> String {
    let total = seconds.round() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

pub fn print_stage_winners(outcome: &RaceOutcome, db: &RiderDatabase) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Stage").add_attribute(Attribute::Bold),
        Cell::new("Terrain"),
        Cell::new("Winner").fg(Color::Cyan),
        Cell::new("Team"),
        Cell::new("Out"),
    ]);
    align_right(&mut table, 4..=4);

    for stage in &outcome.stages {
        let terrain = stage
            .profile
            .parts()
            .map(|(d, w)| format!("{} {:.0}%", d, w * 100.0))
            .collect::<Vec<_>>()
            .join(", ");
        let (winner, team) = match stage.winner() {
            Some(id) => {
                let r = db.rider(id);
                (r.name.as_str(), r.team.as_str())
            }
            None => ("-", "-"),
        };
        table.add_row(vec![
            Cell::new(stage.stage),
            Cell::new(terrain),
            Cell::new(winner).fg(Color::Cyan),
            Cell::new(team),
            Cell::new(stage.abandoned().count()),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_classification(
    outcome: &RaceOutcome,
    db: &RiderDatabase,
    class: Classification,
    top: usize,
) {
    let ranking = outcome.final_ranking(class);
    if ranking.is_empty() {
        return;
    }

    let mut table = new_table();
    let value_header = if class.lower_is_better() { "Gap" } else { "Points" };
    table.add_row(vec![
        Cell::new(format!("{} classification", class)).add_attribute(Attribute::Bold),
        Cell::new("Rider"),
        Cell::new("Team"),
        Cell::new(value_header),
    ]);
    align_right(&mut table, 3..=3);

    let leader_total = ranking[0].1;
    for (pos, (id, total)) in ranking.iter().take(top).enumerate() {
        let rider = db.rider(*id);
        let value = if !class.lower_is_better() {
            format!("{:.0}", total)
        } else if pos == 0 {
            fmt_time(*total)
        } else {
            format!("+{}", fmt_time(total - leader_total))
        };
        let name = Cell::new(&rider.name);
        let name = if pos == 0 {
            name.fg(Color::Yellow).add_attribute(Attribute::Bold)
        } else {
            name
        };
        table.add_row(vec![
            Cell::new(pos + 1),
            name,
            Cell::new(&rider.team),
            Cell::new(value),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_withdrawals(outcome: &RaceOutcome, db: &RiderDatabase) {
    if outcome.withdrawals.is_empty() {
        return;
    }
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Withdrawn").add_attribute(Attribute::Bold),
        Cell::new("Team"),
        Cell::new("Stage"),
    ]);
    for w in &outcome.withdrawals {
        let rider = db.rider(w.rider);
        let when = match w.kind {
            WithdrawalKind::NonStarter => "DNS".to_string(),
            WithdrawalKind::Stage(n) => n.to_string(),
        };
        table.add_row(vec![
            Cell::new(&rider.name).fg(Color::Red),
            Cell::new(&rider.team),
            Cell::new(when),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_fantasy_score(team: &TeamSelection, score: &FantasyScore, db: &RiderDatabase) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Rider"),
        Cell::new("Role"),
        Cell::new("Stages"),
        Cell::new("Bonus"),
        Cell::new("Total").fg(Color::Cyan),
    ]);
    align_right(&mut table, 3..=5);

    for (slot, (&id, name)) in team.riders().iter().zip(team.names()).enumerate() {
        let role = if slot < BONUS_SLOTS {
            format!("bonus {}", slot + 1)
        } else if slot < SCORING_SLOTS {
            "scoring".to_string()
        } else {
            "reserve".to_string()
        };
        let Some(rs) = score.rider(id) else {
            continue;
        };
        let abandoned = score.replacements.iter().any(|r| r.rider == id);
        let name = Cell::new(name);
        let name = if abandoned { name.fg(Color::Red) } else { name };
        table.add_row(vec![
            Cell::new(slot + 1),
            name,
            Cell::new(role),
            Cell::new(rs.stage_points),
            Cell::new(rs.bonus_points),
            Cell::new(rs.total()).fg(Color::Cyan),
        ]);
    }
    println!("\n{}", table);

    if !score.replacements.is_empty() {
        let mut moves = new_table();
        moves.add_row(vec![
            Cell::new("From stage").add_attribute(Attribute::Bold),
            Cell::new("Out"),
            Cell::new("Slot"),
            Cell::new("Filled by"),
        ]);
        for r in &score.replacements {
            let filled = r
                .filled_by
                .map(|id| db.rider(id).name.clone())
                .unwrap_or_else(|| "(unfilled)".to_string());
            moves.add_row(vec![
                Cell::new(r.effective_stage),
                Cell::new(&db.rider(r.rider).name).fg(Color::Red),
                Cell::new(r.vacated_slot + 1),
                Cell::new(filled),
            ]);
        }
        println!("{}", moves);
    }

    println!("Team total: {} points", score.team_total);
}

/// Riders on `team` are highlighted.
pub fn print_projections(
    projections: &[RiderProjection],
    team: Option<&TeamSelection>,
    top: usize,
) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Rider").add_attribute(Attribute::Bold),
        Cell::new("Team"),
        Cell::new("Exp. pts").fg(Color::Cyan),
        Cell::new("Std dev"),
        Cell::new("Finish %"),
        Cell::new("If finished"),
        Cell::new("Wins/race"),
        Cell::new("Avg GC"),
    ]);
    align_right(&mut table, 2..=7);

    for p in projections.iter().take(top) {
        let gc = p
            .mean_gc_rank
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "-".to_string());
        let name = Cell::new(&p.name).add_attribute(Attribute::Bold);
        let name = if team.is_some_and(|t| t.contains(p.rider)) {
            name.fg(Color::Green)
        } else {
            name
        };
        table.add_row(vec![
            name,
            Cell::new(&p.team),
            Cell::new(format!("{:.1}", p.mean)).fg(Color::Cyan),
            Cell::new(format!("{:.1}", p.variance.sqrt())),
            Cell::new(format!("{:.1}", p.finish_rate * 100.0)),
            Cell::new(format!("{:.1}", p.mean_if_finished)),
            Cell::new(format!("{:.2}", p.stage_wins)),
            Cell::new(gc),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_team_summary(summary: &TeamSummary) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Team").add_attribute(Attribute::Bold),
        Cell::new("Mean").fg(Color::Cyan),
        Cell::new("Std dev"),
        Cell::new("Min"),
        Cell::new("Max"),
        Cell::new("Abandons/race"),
    ]);
    align_right(&mut table, 1..=5);
    table.add_row(vec![
        Cell::new(format!("{} races", summary.races)),
        Cell::new(format!("{:.1}", summary.mean)).fg(Color::Cyan),
        Cell::new(format!("{:.1}", summary.std_dev)),
        Cell::new(summary.min),
        Cell::new(summary.max),
        Cell::new(format!("{:.2}", summary.mean_abandonments)),
    ]);
    println!("\n{}", table);
}

pub fn print_stage_catalog(catalog: &StageCatalog, stages: &[usize]) -> PtResult<()> {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Stage").add_attribute(Attribute::Bold),
        Cell::new("Primary"),
        Cell::new("Mix"),
        Cell::new("s/place"),
    ]);
    align_right(&mut table, 3..=3);

    for &n in stages {
        let profile = catalog.get(n)?;
        let mix = profile
            .parts()
            .map(|(d, w)| format!("{}={:.2}", d, w))
            .collect::<Vec<_>>()
            .join(" ");
        let primary = Cell::new(profile.primary_discipline());
        let primary = if profile.is_pure() {
            primary.add_attribute(Attribute::Bold)
        } else {
            primary
        };
        table.add_row(vec![
            Cell::new(n),
            primary,
            Cell::new(mix),
            Cell::new(format!("{:.2}", profile.seconds_per_place())),
        ]);
    }
    println!("\n{}", table);
    Ok(())
}
