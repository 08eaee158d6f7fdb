use serde::Serialize;

use crate::error::MalformedInput;
use crate::roster::{Roster, TeamSide};
use crate::rows::{COL_DURATION, COL_INSTANCE, COL_OUTCOME, EventRow, OutcomeKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shot {
    #[serde(rename = "type")]
    pub shot_type: String,
    pub player: String,
    pub stroke: Option<String>,
    pub direction: Option<String>,
    pub time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub point_winner: TeamSide,
    pub outcome_team: TeamSide,
    pub kind: OutcomeKind,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rally {
    pub number: u32,
    pub start_time: f64,
    pub duration: f64,
    pub shots: Vec<Shot>,
    /// `None` only when the export never recorded a terminating team row.
    /// Such rallies stay in the output but are excluded from set/score
    /// assignment and every outcome-keyed aggregate.
    pub outcome: Option<Outcome>,
    pub set: Option<u8>,
    pub score: Option<String>,
}

/// Group the rows into rallies. Rows are sorted by start time first (stable,
/// so equal timestamps keep their supplied order), then replayed through a
/// two-state machine: a boundary row finalizes any open rally and opens the
/// next one; a team row attaches the outcome (last one wins); any other row
/// carrying a player name appends a shot. Rows outside a rally are ignored.
pub fn segment_rallies(
    rows: &[EventRow],
    roster: &Roster,
) -> Result<Vec<Rally>, MalformedInput> {
    let mut ordered: Vec<&EventRow> = rows.iter().collect();
    ordered.sort_by(|x, y| x.start_time.total_cmp(&y.start_time));

    let mut rallies = Vec::new();
    let mut current: Option<Rally> = None;

    for row in ordered {
        if row.is_rally_boundary() {
            if let Some(done) = current.take() {
                rallies.push(done);
            }
            current = Some(open_rally(row)?);
            continue;
        }

        let Some(rally) = current.as_mut() else {
            // Cannot occur in a well-formed export, but must not raise.
            continue;
        };

        if let Some(team) = roster.side_of_role(&row.role) {
            rally.outcome = Some(build_outcome(row, team)?);
        } else if let Some(player) = row.player.as_deref() {
            rally.shots.push(Shot {
                shot_type: row.role.clone(),
                player: player.to_string(),
                stroke: row.stroke.clone(),
                direction: row.direction.clone(),
                time: row.start_time,
            });
        }
    }

    if let Some(done) = current.take() {
        rallies.push(done);
    }

    let missing_outcome = rallies.iter().filter(|r| r.outcome.is_none()).count();
    if missing_outcome > 0 {
        log::warn!(
            "{missing_outcome} of {} rallies have no recorded outcome; they are kept but excluded from scoring",
            rallies.len()
        );
    } else {
        log::debug!("segmented {} rallies", rallies.len());
    }

    Ok(rallies)
}

fn open_rally(row: &EventRow) -> Result<Rally, MalformedInput> {
    let number = row.instance_number.ok_or(MalformedInput::MissingField {
        line: row.line,
        field: COL_INSTANCE,
    })?;
    let duration = row.duration.ok_or(MalformedInput::MissingField {
        line: row.line,
        field: COL_DURATION,
    })?;
    Ok(Rally {
        number,
        start_time: row.start_time,
        duration,
        shots: Vec::new(),
        outcome: None,
        set: None,
        score: None,
    })
}

fn build_outcome(row: &EventRow, team: TeamSide) -> Result<Outcome, MalformedInput> {
    let kind = row.outcome.ok_or(MalformedInput::MissingField {
        line: row.line,
        field: COL_OUTCOME,
    })?;
    let point_winner = match kind {
        OutcomeKind::Winner => team,
        OutcomeKind::Error => team.opponent(),
    };
    Ok(Outcome {
        point_winner,
        outcome_team: team,
        kind,
        time: row.start_time,
    })
}
