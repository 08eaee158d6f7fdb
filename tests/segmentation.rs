use rallyscope::error::MalformedInput;
use rallyscope::roster::{PerTeam, Roster, TeamSide, build_roster, discover_teams};
use rallyscope::rows::{EventRow, OutcomeKind};
use rallyscope::segment::segment_rallies;

fn boundary(line: usize, number: u32, start: f64, duration: f64) -> EventRow {
    EventRow {
        line,
        role: "RALLY".to_string(),
        outcome: None,
        player: None,
        stroke: None,
        direction: None,
        start_time: start,
        duration: Some(duration),
        instance_number: Some(number),
    }
}

fn shot(line: usize, role: &str, player: &str, time: f64) -> EventRow {
    EventRow {
        line,
        role: role.to_string(),
        outcome: None,
        player: Some(player.to_string()),
        stroke: Some("FOREHAND".to_string()),
        direction: None,
        start_time: time,
        duration: None,
        instance_number: None,
    }
}

fn team_row(line: usize, team: &str, kind: OutcomeKind, player: &str, time: f64) -> EventRow {
    EventRow {
        line,
        role: team.to_string(),
        outcome: Some(kind),
        player: Some(player.to_string()),
        stroke: None,
        direction: None,
        start_time: time,
        duration: None,
        instance_number: None,
    }
}

fn sample_roster() -> Roster {
    Roster {
        teams: ["MALAYSIA".to_string(), "JAPAN".to_string()],
        players: PerTeam {
            a: vec!["AARON".to_string(), "WOOI YIK".to_string()],
            b: vec!["HOKI".to_string(), "KOBAYASHI".to_string()],
        },
    }
}

#[test]
fn teams_are_discovered_in_first_seen_order() {
    let rows = vec![
        team_row(2, "JAPAN", OutcomeKind::Error, "HOKI", 5.0),
        team_row(3, "MALAYSIA", OutcomeKind::Winner, "AARON", 9.0),
        team_row(4, "JAPAN", OutcomeKind::Winner, "HOKI", 14.0),
    ];
    let teams = discover_teams(&rows).expect("two teams");
    assert_eq!(teams, ["JAPAN".to_string(), "MALAYSIA".to_string()]);
}

#[test]
fn team_discovery_requires_exactly_two() {
    let rows = vec![team_row(2, "MALAYSIA", OutcomeKind::Winner, "AARON", 5.0)];
    let err = discover_teams(&rows).expect_err("one team should fail");
    assert_eq!(
        err,
        MalformedInput::TeamCount {
            found: vec!["MALAYSIA".to_string()]
        }
    );

    let rows = vec![
        team_row(2, "MALAYSIA", OutcomeKind::Winner, "AARON", 5.0),
        team_row(3, "JAPAN", OutcomeKind::Error, "HOKI", 9.0),
        team_row(4, "KOREA", OutcomeKind::Winner, "SEO", 14.0),
    ];
    assert!(matches!(
        discover_teams(&rows),
        Err(MalformedInput::TeamCount { found }) if found.len() == 3
    ));
}

#[test]
fn shot_only_role_tags_are_not_teams() {
    // A smash row has no outcome kind, so its role tag never counts as a team.
    let rows = vec![
        shot(2, "SMASH", "AARON", 1.0),
        team_row(3, "MALAYSIA", OutcomeKind::Winner, "AARON", 2.0),
        team_row(4, "JAPAN", OutcomeKind::Error, "HOKI", 3.0),
    ];
    let teams = discover_teams(&rows).expect("two teams");
    assert_eq!(teams, ["MALAYSIA".to_string(), "JAPAN".to_string()]);
}

#[test]
fn roster_collects_players_in_first_seen_order() {
    let rows = vec![
        team_row(2, "MALAYSIA", OutcomeKind::Winner, "AARON", 5.0),
        team_row(3, "JAPAN", OutcomeKind::Error, "HOKI", 9.0),
        team_row(4, "MALAYSIA", OutcomeKind::Error, "WOOI YIK", 14.0),
        team_row(5, "MALAYSIA", OutcomeKind::Winner, "AARON", 20.0),
        team_row(6, "JAPAN", OutcomeKind::Winner, "KOBAYASHI", 26.0),
    ];
    let roster = build_roster(&rows).expect("roster");
    assert_eq!(roster.players.a, vec!["AARON", "WOOI YIK"]);
    assert_eq!(roster.players.b, vec!["HOKI", "KOBAYASHI"]);
    assert_eq!(roster.side_of_player("WOOI YIK"), Some(TeamSide::A));
    assert_eq!(roster.side_of_player("UNKNOWN"), None);
}

#[test]
fn player_keeps_first_team_association() {
    let rows = vec![
        team_row(2, "MALAYSIA", OutcomeKind::Winner, "AARON", 5.0),
        team_row(3, "JAPAN", OutcomeKind::Error, "AARON", 9.0),
        team_row(4, "JAPAN", OutcomeKind::Winner, "HOKI", 14.0),
    ];
    let roster = build_roster(&rows).expect("roster");
    assert_eq!(roster.players.a, vec!["AARON"]);
    assert_eq!(roster.players.b, vec!["HOKI"]);
}

#[test]
fn rows_are_sorted_before_segmentation() {
    let rows = vec![
        shot(4, "SMASH", "AARON", 3.5),
        boundary(2, 1, 1.0, 6.0),
        team_row(5, "MALAYSIA", OutcomeKind::Winner, "AARON", 4.0),
        shot(3, "SERVE", "AARON", 1.2),
    ];
    let rallies = segment_rallies(&rows, &sample_roster()).expect("segment");
    assert_eq!(rallies.len(), 1);
    let shots: Vec<&str> = rallies[0]
        .shots
        .iter()
        .map(|s| s.shot_type.as_str())
        .collect();
    assert_eq!(shots, vec!["SERVE", "SMASH"]);
    assert!(rallies[0].shots.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn outcome_attaches_to_open_rally_and_flips_on_error() {
    let rows = vec![
        boundary(2, 1, 1.0, 5.0),
        team_row(3, "JAPAN", OutcomeKind::Error, "HOKI", 4.0),
    ];
    let rallies = segment_rallies(&rows, &sample_roster()).expect("segment");
    let outcome = rallies[0].outcome.expect("outcome");
    assert_eq!(outcome.outcome_team, TeamSide::B);
    assert_eq!(outcome.point_winner, TeamSide::A);
    assert_eq!(outcome.kind, OutcomeKind::Error);
    assert_eq!(outcome.time, 4.0);
}

#[test]
fn last_outcome_row_wins() {
    let rows = vec![
        boundary(2, 1, 1.0, 5.0),
        team_row(3, "MALAYSIA", OutcomeKind::Winner, "AARON", 3.0),
        team_row(4, "JAPAN", OutcomeKind::Winner, "HOKI", 4.5),
    ];
    let rallies = segment_rallies(&rows, &sample_roster()).expect("segment");
    let outcome = rallies[0].outcome.expect("outcome");
    assert_eq!(outcome.outcome_team, TeamSide::B);
    assert_eq!(outcome.point_winner, TeamSide::B);
}

#[test]
fn rows_outside_any_rally_are_ignored() {
    let rows = vec![
        shot(2, "SMASH", "AARON", 0.5),
        team_row(3, "MALAYSIA", OutcomeKind::Winner, "AARON", 0.8),
        boundary(4, 1, 1.0, 5.0),
        shot(5, "SERVE", "AARON", 1.2),
    ];
    let rallies = segment_rallies(&rows, &sample_roster()).expect("segment");
    assert_eq!(rallies.len(), 1);
    assert_eq!(rallies[0].shots.len(), 1);
    assert!(rallies[0].outcome.is_none());
}

#[test]
fn trailing_rally_and_empty_rally_are_emitted() {
    let rows = vec![
        boundary(2, 1, 1.0, 3.0),
        team_row(3, "MALAYSIA", OutcomeKind::Winner, "AARON", 2.0),
        boundary(4, 2, 10.0, 4.0),
    ];
    let rallies = segment_rallies(&rows, &sample_roster()).expect("segment");
    assert_eq!(rallies.len(), 2);
    assert_eq!(rallies[1].number, 2);
    assert!(rallies[1].shots.is_empty());
    assert!(rallies[1].outcome.is_none());
}

#[test]
fn team_row_without_outcome_kind_fails() {
    let mut bad = team_row(3, "MALAYSIA", OutcomeKind::Winner, "AARON", 2.0);
    bad.outcome = None;
    let rows = vec![boundary(2, 1, 1.0, 3.0), bad];
    let err = segment_rallies(&rows, &sample_roster()).expect_err("should fail");
    assert_eq!(
        err,
        MalformedInput::MissingField {
            line: 3,
            field: "OUTCOME"
        }
    );
}
