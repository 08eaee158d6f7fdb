use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::analysis::MatchAnalysis;
use crate::roster::TeamSide;
use crate::rows::OutcomeKind;
use crate::stats::SequenceCount;

pub struct ExportReport {
    pub sheets: usize,
    pub rally_rows: usize,
    pub finisher_rows: usize,
}

/// Write the analysis to an `.xlsx` workbook, one sheet per report plus the
/// rally log, for consumers that want the numbers outside the JSON payload.
pub fn export_analysis(path: &Path, analysis: &MatchAnalysis) -> Result<ExportReport> {
    let overview = overview_rows(analysis);
    let sequences = sequence_rows(analysis);
    let rally_length = rally_length_rows(analysis);
    let finishers = finisher_rows(analysis);
    let breakdowns = shot_breakdown_rows(analysis);
    let momentum = momentum_rows(analysis);
    let rallies = rally_rows(analysis);

    let sheets: &[(&str, &Vec<Vec<String>>)] = &[
        ("Overview", &overview),
        ("Sequences", &sequences),
        ("RallyLength", &rally_length),
        ("Finishers", &finishers),
        ("ShotBreakdown", &breakdowns),
        ("Momentum", &momentum),
        ("Rallies", &rallies),
    ];

    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_rows(sheet, rows.as_slice())?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        sheets: sheets.len(),
        rally_rows: rallies.len().saturating_sub(1),
        finisher_rows: finishers.len().saturating_sub(1),
    })
}

fn team_name(analysis: &MatchAnalysis, side: TeamSide) -> &str {
    match side {
        TeamSide::A => &analysis.teams[0],
        TeamSide::B => &analysis.teams[1],
    }
}

fn overview_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let stats = &analysis.statistics;
    let mut rows = vec![
        vec!["Generated".to_string(), Utc::now().to_rfc3339()],
        vec!["Team A".to_string(), analysis.teams[0].clone()],
        vec!["Team B".to_string(), analysis.teams[1].clone()],
        vec![
            "Players A".to_string(),
            analysis.players.a.join(", "),
        ],
        vec![
            "Players B".to_string(),
            analysis.players.b.join(", "),
        ],
        vec!["Total rallies".to_string(), stats.total_rallies.to_string()],
        vec!["Set 1 rallies".to_string(), stats.set1_count.to_string()],
        vec!["Set 2 rallies".to_string(), stats.set2_count.to_string()],
        vec![
            "Points A".to_string(),
            stats.points.a.to_string(),
        ],
        vec![
            "Points B".to_string(),
            stats.points.b.to_string(),
        ],
    ];

    for (label, per_team) in [
        ("Set 1", &stats.set_winner_errors.set1),
        ("Set 2", &stats.set_winner_errors.set2),
    ] {
        for side in [TeamSide::A, TeamSide::B] {
            let counts = per_team.side(side);
            rows.push(vec![
                format!("{label} W/E {}", team_name(analysis, side)),
                format!("{}/{}", counts.winners, counts.errors),
            ]);
        }
    }

    rows
}

fn sequence_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Team".to_string(),
        "Ended by".to_string(),
        "Sequence".to_string(),
        "Count".to_string(),
    ]];

    let mut push = |side: TeamSide, label: &str, entries: &[SequenceCount]| {
        for entry in entries {
            rows.push(vec![
                team_name(analysis, side).to_string(),
                label.to_string(),
                entry.sequence.clone(),
                entry.count.to_string(),
            ]);
        }
    };

    for side in [TeamSide::A, TeamSide::B] {
        let report = analysis.statistics.sequences.side(side);
        push(side, "WINNER", &report.most_winning);
        push(side, "ERROR", &report.most_losing);
    }

    rows
}

fn rally_length_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let length = &analysis.statistics.rally_length;
    let mut rows = vec![vec![
        "Bucket".to_string(),
        format!("{} wins", analysis.teams[0]),
        format!("{} wins", analysis.teams[1]),
        "Total".to_string(),
        format!("{} %", analysis.teams[0]),
        format!("{} %", analysis.teams[1]),
    ]];

    for (label, bucket) in [
        ("short", &length.short),
        ("medium", &length.medium),
        ("long", &length.long),
    ] {
        rows.push(vec![
            label.to_string(),
            bucket.wins.a.to_string(),
            bucket.wins.b.to_string(),
            bucket.total.to_string(),
            format!("{:.2}", bucket.percentage.a),
            format!("{:.2}", bucket.percentage.b),
        ]);
    }

    rows
}

fn finisher_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Player".to_string(),
        "Team".to_string(),
        "Finishes".to_string(),
        "Winners".to_string(),
        "Errors".to_string(),
        "W/E Ratio".to_string(),
    ]];

    for player in &analysis.statistics.finishing_players {
        rows.push(vec![
            player.name.clone(),
            team_name(analysis, player.team).to_string(),
            player.total_finishes.to_string(),
            player.winners.to_string(),
            player.errors.to_string(),
            format!("{:.2}", player.we_ratio),
        ]);
    }

    rows
}

fn shot_breakdown_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Player".to_string(),
        "Shot".to_string(),
        "Total".to_string(),
        "Winners".to_string(),
        "Errors".to_string(),
        "Success %".to_string(),
    ]];

    for player in &analysis.statistics.finishing_players {
        for breakdown in &player.shot_breakdown {
            rows.push(vec![
                player.name.clone(),
                breakdown.shot.clone(),
                breakdown.total.to_string(),
                breakdown.winners.to_string(),
                breakdown.errors.to_string(),
                format!("{:.2}", breakdown.success_rate),
            ]);
        }
    }

    rows
}

fn momentum_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Set".to_string(),
        "Rally".to_string(),
        format!("{} score", analysis.teams[0]),
        format!("{} score", analysis.teams[1]),
        "Diff".to_string(),
        "Point winner".to_string(),
    ]];

    for (set, points) in [
        ("1", &analysis.statistics.momentum.set1),
        ("2", &analysis.statistics.momentum.set2),
    ] {
        for point in points {
            rows.push(vec![
                set.to_string(),
                point.rally.to_string(),
                point.score.a.to_string(),
                point.score.b.to_string(),
                point.score_diff.to_string(),
                team_name(analysis, point.point_winner).to_string(),
            ]);
        }
    }

    rows
}

fn rally_rows(analysis: &MatchAnalysis) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Rally".to_string(),
        "Set".to_string(),
        "Score".to_string(),
        "Start".to_string(),
        "Duration".to_string(),
        "Shots".to_string(),
        "Outcome team".to_string(),
        "Outcome".to_string(),
        "Point winner".to_string(),
    ]];

    for rally in &analysis.rallies {
        let (outcome_team, kind, point_winner) = match rally.outcome.as_ref() {
            Some(outcome) => (
                team_name(analysis, outcome.outcome_team).to_string(),
                match outcome.kind {
                    OutcomeKind::Winner => "WINNER".to_string(),
                    OutcomeKind::Error => "ERROR".to_string(),
                },
                team_name(analysis, outcome.point_winner).to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        rows.push(vec![
            rally.number.to_string(),
            rally.set.map(|s| s.to_string()).unwrap_or_default(),
            rally.score.clone().unwrap_or_default(),
            format!("{:.2}", rally.start_time),
            format!("{:.2}", rally.duration),
            rally.shots.len().to_string(),
            outcome_team,
            kind,
            point_winner,
        ]);
    }

    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
