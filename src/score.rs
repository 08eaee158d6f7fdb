use crate::roster::PerTeam;
use crate::segment::Rally;

/// Badminton set scoring, fixed constants of this version: first to 21 with a
/// two-point margin ends set 1. Only the 1 -> 2 transition is ever detected.
pub const SET_TARGET_POINTS: u32 = 21;
pub const SET_WIN_MARGIN: u32 = 2;

/// Replay the outcomes in order, stamping each outcome-bearing rally with its
/// set number and the running score after its point. The transition check runs
/// before the rally's point is applied, so the set-ending point is scored as
/// the last point of the ending set. Outcome-less rallies pass through
/// unstamped and do not move the score.
pub fn assign_sets_and_scores(rallies: &mut [Rally]) {
    let mut current_set: u8 = 1;
    let mut score: PerTeam<u32> = PerTeam::default();

    for rally in rallies.iter_mut() {
        let Some(outcome) = rally.outcome.as_ref() else {
            continue;
        };

        if current_set == 1 && set_is_decided(score.a, score.b) {
            current_set = 2;
            score = PerTeam::default();
        }

        *score.side_mut(outcome.point_winner) += 1;
        rally.set = Some(current_set);
        rally.score = Some(format!("{}-{}", score.a, score.b));
    }
}

fn set_is_decided(a: u32, b: u32) -> bool {
    (a >= SET_TARGET_POINTS || b >= SET_TARGET_POINTS) && a.abs_diff(b) >= SET_WIN_MARGIN
}
