use std::collections::HashMap;

use serde::Serialize;

use crate::roster::{PerTeam, Roster, TeamSide};
use crate::rows::OutcomeKind;
use crate::segment::Rally;

/// Shot types excluded from sequence analysis: the opening exchange carries no
/// tactical signal.
const SEQUENCE_EXCLUDED_SHOTS: [&str; 2] = ["SERVE", "RECEIVE SERVES"];
const SEQUENCE_SEPARATOR: &str = " → ";
const TOP_SEQUENCES: usize = 5;

const SHORT_RALLY_MAX: f64 = 5.0;
const MEDIUM_RALLY_MAX: f64 = 10.0;

/// One value per set, mirroring `PerTeam` for the two-set scope of this
/// version.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerSet<T> {
    pub set1: T,
    pub set2: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceCount {
    pub sequence: String,
    pub count: u32,
}

/// Top shot-type sequences for one side, split by how its rallies ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceReport {
    pub most_winning: Vec<SequenceCount>,
    pub most_losing: Vec<SequenceCount>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthBucket {
    pub wins: PerTeam<u32>,
    pub total: u32,
    pub percentage: PerTeam<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RallyLengthReport {
    pub short: LengthBucket,
    pub medium: LengthBucket,
    pub long: LengthBucket,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WinnerErrorCount {
    pub winners: u32,
    pub errors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotBreakdown {
    pub shot: String,
    pub total: u32,
    pub winners: u32,
    pub errors: u32,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinisherStats {
    pub name: String,
    pub team: TeamSide,
    pub total_finishes: u32,
    pub winners: u32,
    pub errors: u32,
    pub we_ratio: f64,
    pub shot_breakdown: Vec<ShotBreakdown>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumPoint {
    pub rally: u32,
    pub score: PerTeam<u32>,
    pub score_diff: i64,
    pub point_winner: TeamSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub time: f64,
    pub point: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub total_rallies: usize,
    pub set1_count: usize,
    pub set2_count: usize,
    pub points: PerTeam<u32>,
    pub sequences: PerTeam<SequenceReport>,
    pub rally_length: RallyLengthReport,
    pub set_winner_errors: PerSet<PerTeam<WinnerErrorCount>>,
    pub finishing_players: Vec<FinisherStats>,
    pub momentum: PerSet<Vec<MomentumPoint>>,
    pub points_timeline: PerTeam<Vec<TimelinePoint>>,
}

/// Pure fold over the stamped rally sequence. Rebuilt in full on every call;
/// nothing is cached or mutated outside the report being built.
pub fn compute_statistics(rallies: &[Rally], roster: &Roster) -> StatisticsReport {
    let mut points: PerTeam<u32> = PerTeam::default();
    let mut sequences: PerTeam<SequenceTallies> = PerTeam::default();
    let mut length = RallyLengthReport::default();
    let mut set_winner_errors: PerSet<PerTeam<WinnerErrorCount>> = PerSet::default();
    let mut finishers = FinisherTable::default();
    let mut timeline: PerTeam<Vec<TimelinePoint>> = PerTeam::default();

    for rally in rallies {
        if let Some(outcome) = rally.outcome.as_ref() {
            *points.side_mut(outcome.point_winner) += 1;

            if let Some(sequence) = rally_sequence(rally) {
                sequences
                    .side_mut(outcome.outcome_team)
                    .tally_mut(outcome.kind)
                    .bump(sequence);
            }

            let bucket = length_bucket(&mut length, rally.duration);
            bucket.total += 1;
            *bucket.wins.side_mut(outcome.point_winner) += 1;

            if let Some(per_team) = set_slot(&mut set_winner_errors, rally.set) {
                let counts = per_team.side_mut(outcome.outcome_team);
                match outcome.kind {
                    OutcomeKind::Winner => counts.winners += 1,
                    OutcomeKind::Error => counts.errors += 1,
                }
            }

            let winner_timeline = timeline.side_mut(outcome.point_winner);
            let point = winner_timeline.len() as u32 + 1;
            winner_timeline.push(TimelinePoint {
                time: rally.start_time,
                point,
            });
        }

        finishers.record(rally, roster);
    }

    finalize_percentages(&mut length);

    let report = StatisticsReport {
        total_rallies: rallies.len(),
        set1_count: rallies.iter().filter(|r| r.set == Some(1)).count(),
        set2_count: rallies.iter().filter(|r| r.set == Some(2)).count(),
        points,
        sequences: PerTeam {
            a: sequences.a.into_report(),
            b: sequences.b.into_report(),
        },
        rally_length: length,
        set_winner_errors,
        finishing_players: finishers.finalize(),
        momentum: PerSet {
            set1: momentum_for_set(rallies, 1),
            set2: momentum_for_set(rallies, 2),
        },
        points_timeline: timeline,
    };

    log::debug!(
        "aggregated {} rallies: {}-{} points, {} finishers",
        report.total_rallies,
        report.points.a,
        report.points.b,
        report.finishing_players.len()
    );

    report
}

/// The arrow-joined shot-type sequence of a rally, with the opening exchange
/// stripped. `None` when nothing remains.
fn rally_sequence(rally: &Rally) -> Option<String> {
    let types: Vec<&str> = rally
        .shots
        .iter()
        .map(|shot| shot.shot_type.as_str())
        .filter(|t| !SEQUENCE_EXCLUDED_SHOTS.contains(t))
        .collect();
    if types.is_empty() {
        None
    } else {
        Some(types.join(SEQUENCE_SEPARATOR))
    }
}

fn length_bucket(report: &mut RallyLengthReport, duration: f64) -> &mut LengthBucket {
    if duration < SHORT_RALLY_MAX {
        &mut report.short
    } else if duration < MEDIUM_RALLY_MAX {
        &mut report.medium
    } else {
        &mut report.long
    }
}

fn set_slot<T>(per_set: &mut PerSet<T>, set: Option<u8>) -> Option<&mut T> {
    match set {
        Some(1) => Some(&mut per_set.set1),
        Some(2) => Some(&mut per_set.set2),
        _ => None,
    }
}

fn finalize_percentages(report: &mut RallyLengthReport) {
    for bucket in [
        &mut report.short,
        &mut report.medium,
        &mut report.long,
    ] {
        if bucket.total > 0 {
            let total = bucket.total as f64;
            bucket.percentage.a = bucket.wins.a as f64 / total * 100.0;
            bucket.percentage.b = bucket.wins.b as f64 / total * 100.0;
        }
    }
}

/// Occurrence counts in first-encountered order, so the stable sort in
/// `into_report` breaks frequency ties by first appearance.
#[derive(Default)]
struct SequenceCounter {
    order: Vec<String>,
    counts: HashMap<String, u32>,
}

impl SequenceCounter {
    fn bump(&mut self, sequence: String) {
        if let Some(count) = self.counts.get_mut(&sequence) {
            *count += 1;
        } else {
            self.order.push(sequence.clone());
            self.counts.insert(sequence, 1);
        }
    }

    fn top(self, limit: usize) -> Vec<SequenceCount> {
        let SequenceCounter { order, counts } = self;
        let mut out: Vec<SequenceCount> = order
            .into_iter()
            .map(|sequence| {
                let count = counts.get(&sequence).copied().unwrap_or_default();
                SequenceCount { sequence, count }
            })
            .collect();
        out.sort_by(|x, y| y.count.cmp(&x.count));
        out.truncate(limit);
        out
    }
}

#[derive(Default)]
struct SequenceTallies {
    winning: SequenceCounter,
    losing: SequenceCounter,
}

impl SequenceTallies {
    fn tally_mut(&mut self, kind: OutcomeKind) -> &mut SequenceCounter {
        match kind {
            OutcomeKind::Winner => &mut self.winning,
            OutcomeKind::Error => &mut self.losing,
        }
    }

    fn into_report(self) -> SequenceReport {
        SequenceReport {
            most_winning: self.winning.top(TOP_SEQUENCES),
            most_losing: self.losing.top(TOP_SEQUENCES),
        }
    }
}

/// Finisher accumulation in first-finish order. A finisher with no rostered
/// side is skipped entirely; finish counts accrue on every finished-by shot,
/// win/error counts only when the rally's outcome is present.
#[derive(Default)]
struct FinisherTable {
    order: Vec<FinisherStats>,
    index: HashMap<String, usize>,
}

impl FinisherTable {
    fn record(&mut self, rally: &Rally, roster: &Roster) {
        let Some(last_shot) = rally.shots.last() else {
            return;
        };
        let Some(team) = roster.side_of_player(&last_shot.player) else {
            return;
        };

        let idx = match self.index.get(&last_shot.player) {
            Some(idx) => *idx,
            None => {
                self.order.push(FinisherStats {
                    name: last_shot.player.clone(),
                    team,
                    total_finishes: 0,
                    winners: 0,
                    errors: 0,
                    we_ratio: 0.0,
                    shot_breakdown: Vec::new(),
                });
                self.index
                    .insert(last_shot.player.clone(), self.order.len() - 1);
                self.order.len() - 1
            }
        };

        let entry = &mut self.order[idx];
        entry.total_finishes += 1;

        let shot_idx = match entry
            .shot_breakdown
            .iter()
            .position(|b| b.shot == last_shot.shot_type)
        {
            Some(shot_idx) => shot_idx,
            None => {
                entry.shot_breakdown.push(ShotBreakdown {
                    shot: last_shot.shot_type.clone(),
                    total: 0,
                    winners: 0,
                    errors: 0,
                    success_rate: 0.0,
                });
                entry.shot_breakdown.len() - 1
            }
        };
        let breakdown = &mut entry.shot_breakdown[shot_idx];
        breakdown.total += 1;

        if let Some(outcome) = rally.outcome.as_ref() {
            match outcome.kind {
                OutcomeKind::Winner => {
                    entry.winners += 1;
                    breakdown.winners += 1;
                }
                OutcomeKind::Error => {
                    entry.errors += 1;
                    breakdown.errors += 1;
                }
            }
        }
    }

    fn finalize(self) -> Vec<FinisherStats> {
        let mut finishers = self.order;
        for entry in &mut finishers {
            entry.we_ratio = if entry.errors > 0 {
                entry.winners as f64 / entry.errors as f64
            } else {
                entry.winners as f64
            };
            for breakdown in &mut entry.shot_breakdown {
                breakdown.success_rate = if breakdown.total > 0 {
                    breakdown.winners as f64 / breakdown.total as f64 * 100.0
                } else {
                    0.0
                };
            }
            entry
                .shot_breakdown
                .sort_by(|x, y| y.total.cmp(&x.total));
        }
        finishers
    }
}

/// Momentum is rebuilt from its own per-set counters rather than read off the
/// stamped score strings; the two must agree in final value.
fn momentum_for_set(rallies: &[Rally], set: u8) -> Vec<MomentumPoint> {
    let mut score: PerTeam<u32> = PerTeam::default();
    let mut out = Vec::new();

    let in_set = rallies.iter().filter(|r| r.set == Some(set));
    for (idx, rally) in in_set.enumerate() {
        let Some(outcome) = rally.outcome.as_ref() else {
            continue;
        };
        *score.side_mut(outcome.point_winner) += 1;
        out.push(MomentumPoint {
            rally: idx as u32 + 1,
            score,
            score_diff: i64::from(score.a) - i64::from(score.b),
            point_winner: outcome.point_winner,
        });
    }

    out
}
