use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MalformedInput;
use crate::roster::{self, PerTeam};
use crate::rows::EventRow;
use crate::score::assign_sets_and_scores;
use crate::segment::{Rally, segment_rallies};
use crate::stats::{StatisticsReport, compute_statistics};

/// Caller-supplied final set scores, keyed by team display name. Carried as
/// pass-through metadata for consumers; the engine detects set transitions
/// from the replayed outcomes, never from this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetScoreConfig {
    #[serde(default)]
    pub set1: HashMap<String, u32>,
    #[serde(default)]
    pub set2: HashMap<String, u32>,
}

impl SetScoreConfig {
    /// Build the config from `"a-b"`-style pairs ordered as the discovered
    /// teams are.
    pub fn from_pairs(teams: &[String; 2], set1: (u32, u32), set2: (u32, u32)) -> SetScoreConfig {
        SetScoreConfig {
            set1: HashMap::from([
                (teams[0].clone(), set1.0),
                (teams[1].clone(), set1.1),
            ]),
            set2: HashMap::from([
                (teams[0].clone(), set2.0),
                (teams[1].clone(), set2.1),
            ]),
        }
    }
}

/// The full analysis payload, serialized to camelCase JSON for consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchAnalysis {
    /// Display names; `teams[0]` is side A everywhere sides are reported.
    pub teams: [String; 2],
    pub players: PerTeam<Vec<String>>,
    pub set_scores: SetScoreConfig,
    pub statistics: StatisticsReport,
    pub rallies: Vec<Rally>,
}

/// Roster-only mode: team discovery for callers that need the two names
/// before final scores exist (the upload flow).
pub fn extract_teams(rows: &[EventRow]) -> Result<[String; 2], MalformedInput> {
    roster::discover_teams(rows)
}

/// Run the whole pipeline: roster discovery, rally segmentation, set/score
/// assignment, statistics aggregation. Fails fast on malformed input; never
/// produces a partial report. Each call rebuilds all state from its inputs,
/// so concurrent callers are safe as long as they do not share a mutable row
/// collection.
pub fn analyze_match(
    rows: &[EventRow],
    set_scores: SetScoreConfig,
) -> Result<MatchAnalysis, MalformedInput> {
    let roster = roster::build_roster(rows)?;
    let mut rallies = segment_rallies(rows, &roster)?;
    assign_sets_and_scores(&mut rallies);
    let statistics = compute_statistics(&rallies, &roster);

    Ok(MatchAnalysis {
        teams: roster.teams,
        players: roster.players,
        set_scores,
        statistics,
        rallies,
    })
}

/// Lenient `"21-18"`-style pair parsing; any non-digit run separates the two
/// numbers.
pub fn parse_score_pair(raw: &str) -> Option<(u32, u32)> {
    let mut nums = raw
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<u32>().ok());
    let first = nums.next()?;
    let second = nums.next()?;
    Some((first, second))
}
