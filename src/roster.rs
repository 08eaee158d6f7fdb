use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::MalformedInput;
use crate::rows::EventRow;

/// Stable side identifier. Statistics are keyed by side; the display names
/// live once in `Roster::teams`, never as dynamic struct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    A,
    B,
}

impl TeamSide {
    pub fn opponent(self) -> TeamSide {
        match self {
            TeamSide::A => TeamSide::B,
            TeamSide::B => TeamSide::A,
        }
    }
}

/// One value per side, indexable by `TeamSide`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerTeam<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerTeam<T> {
    pub fn side(&self, side: TeamSide) -> &T {
        match side {
            TeamSide::A => &self.a,
            TeamSide::B => &self.b,
        }
    }

    pub fn side_mut(&mut self, side: TeamSide) -> &mut T {
        match side {
            TeamSide::A => &mut self.a,
            TeamSide::B => &mut self.b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    /// Display names, first-seen order: `teams[0]` is side A.
    pub teams: [String; 2],
    pub players: PerTeam<Vec<String>>,
}

impl Roster {
    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::A => &self.teams[0],
            TeamSide::B => &self.teams[1],
        }
    }

    /// Side whose team identifier equals the given role tag, if any.
    pub fn side_of_role(&self, role: &str) -> Option<TeamSide> {
        if role == self.teams[0] {
            Some(TeamSide::A)
        } else if role == self.teams[1] {
            Some(TeamSide::B)
        } else {
            None
        }
    }

    /// Side a player is rostered on, if the raw data ever linked them to one.
    pub fn side_of_player(&self, name: &str) -> Option<TeamSide> {
        if self.players.a.iter().any(|p| p == name) {
            Some(TeamSide::A)
        } else if self.players.b.iter().any(|p| p == name) {
            Some(TeamSide::B)
        } else {
            None
        }
    }
}

/// The two team identifiers are the distinct role tags of rows carrying an
/// outcome kind, first-seen order. Anything other than exactly two is a fatal
/// input error naming the discovered set.
pub fn discover_teams(rows: &[EventRow]) -> Result<[String; 2], MalformedInput> {
    let mut seen = HashSet::new();
    let mut teams = Vec::new();
    for row in rows {
        if row.outcome.is_some() && seen.insert(row.role.clone()) {
            teams.push(row.role.clone());
        }
    }

    match <[String; 2]>::try_from(teams) {
        Ok(pair) => Ok(pair),
        Err(found) => Err(MalformedInput::TeamCount { found }),
    }
}

/// Discover the teams and collect each side's players: distinct names on rows
/// whose role equals the team identifier, first-seen order. A name joins at
/// most one side; the first association encountered wins.
pub fn build_roster(rows: &[EventRow]) -> Result<Roster, MalformedInput> {
    let teams = discover_teams(rows)?;
    let mut players: PerTeam<Vec<String>> = PerTeam::default();

    for row in rows {
        let Some(name) = row.player.as_deref() else {
            continue;
        };
        let side = if row.role == teams[0] {
            TeamSide::A
        } else if row.role == teams[1] {
            TeamSide::B
        } else {
            continue;
        };
        let already_assigned =
            players.a.iter().any(|p| p == name) || players.b.iter().any(|p| p == name);
        if !already_assigned {
            players.side_mut(side).push(name.to_string());
        }
    }

    log::info!(
        "discovered teams [{}] vs [{}] ({} + {} players)",
        teams[0],
        teams[1],
        players.a.len(),
        players.b.len()
    );

    Ok(Roster { teams, players })
}
