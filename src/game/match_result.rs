//! Match end and result summary
//!
//! Decides when a timed match may stop and builds the summary handed to the
//! stats collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::roster::TeamSpan;
use crate::game::state::{MatchState, PlayMode, Team};

/// Reason why match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEndReason {
    /// Clock ran out with a dead ball and a leader
    TimeLimit,
    /// Stopped by an administrator or the host
    Stopped,
}

/// Outcome of the per-tick end-of-match check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCheck {
    Continue,
    /// Stop now, `winner` leads
    Stop { winner: Team },
    /// Time is up but the current play must finish
    LastPlay,
    /// Time is up with a tied score
    Overtime,
}

/// Check if match should end.
///
/// A match never stops mid-play: once the clock (plus any running stoppage
/// window) has run out, it waits for a dead ball with the offense waiting to
/// hike and a leader on the scoreboard. Until then a single notice is sent.
pub fn check_match_end(state: &MatchState, elapsed: f32, tick_rate: u32) -> EndCheck {
    if state.end_game_time == 0.0 || elapsed <= state.end_game_time {
        return EndCheck::Continue;
    }

    let stoppage = &state.stoppage;
    if stoppage.has_stoppage() && !stoppage.has_ended(elapsed, state.end_game_time, tick_rate) {
        return EndCheck::Continue;
    }

    let ball_dead = state.mode == Some(PlayMode::WaitingHike)
        && !state.conversion
        && state.carrier.is_none();

    if ball_dead && state.score_red != state.score_blue {
        let winner = if state.score_red > state.score_blue {
            Team::Red
        } else {
            Team::Blue
        };
        return EndCheck::Stop { winner };
    }

    if state.last_play_notice_sent {
        return EndCheck::Continue;
    }

    if state.score_red == state.score_blue {
        EndCheck::Overtime
    } else {
        EndCheck::LastPlay
    }
}

/// Leader on the scoreboard, if any
pub fn leader(state: &MatchState) -> Option<Team> {
    use std::cmp::Ordering;
    match state.score_red.cmp(&state.score_blue) {
        Ordering::Greater => Some(Team::Red),
        Ordering::Less => Some(Team::Blue),
        Ordering::Equal => None,
    }
}

/// Team stint with the player's MVP points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySpan {
    #[serde(flatten)]
    pub span: TeamSpan,
    pub points: i64,
}

/// Match summary reported when a match ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: Uuid,
    pub reason: MatchEndReason,
    pub winner: Option<Team>,
    pub score_red: u32,
    pub score_blue: u32,
    pub duration_seconds: f32,
    pub history: Vec<SummarySpan>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Carrier, CarrierRole};
    use crate::util::vec2::Vec2;

    fn timed_state() -> MatchState {
        let mut state = MatchState::new();
        state.end_game_time = 600.0;
        state.mode = Some(PlayMode::WaitingHike);
        state.score_red = 7;
        state
    }

    #[test]
    fn test_untimed_never_ends() {
        let mut state = timed_state();
        state.end_game_time = 0.0;
        assert_eq!(check_match_end(&state, 10_000.0, 60), EndCheck::Continue);
    }

    #[test]
    fn test_stops_on_dead_ball_with_leader() {
        let state = timed_state();
        assert_eq!(check_match_end(&state, 599.0, 60), EndCheck::Continue);
        assert_eq!(
            check_match_end(&state, 601.0, 60),
            EndCheck::Stop { winner: Team::Red }
        );
    }

    #[test]
    fn test_waits_for_play_to_finish() {
        let mut state = timed_state();
        state.mode = Some(PlayMode::Down);
        assert_eq!(check_match_end(&state, 601.0, 60), EndCheck::LastPlay);

        state.last_play_notice_sent = true;
        assert_eq!(check_match_end(&state, 602.0, 60), EndCheck::Continue);

        state.mode = Some(PlayMode::WaitingHike);
        state.carrier = Some(Carrier {
            id: 1,
            team: Team::Red,
            role: CarrierRole::Runner,
            initial_position: Vec2::ZERO,
        });
        assert_eq!(check_match_end(&state, 603.0, 60), EndCheck::Continue);
    }

    #[test]
    fn test_tied_score_goes_to_overtime() {
        let mut state = timed_state();
        state.score_red = 0;
        assert_eq!(check_match_end(&state, 601.0, 60), EndCheck::Overtime);
    }

    #[test]
    fn test_conversion_blocks_stop() {
        let mut state = timed_state();
        state.conversion = true;
        assert_eq!(check_match_end(&state, 601.0, 60), EndCheck::LastPlay);
    }

    #[test]
    fn test_stoppage_window_defers_stop() {
        let mut state = timed_state();
        state.stoppage.add_ticks(600);
        state.stoppage.activate();
        assert_eq!(check_match_end(&state, 605.0, 60), EndCheck::Continue);
        assert_eq!(
            check_match_end(&state, 611.0, 60),
            EndCheck::Stop { winner: Team::Red }
        );
    }

    #[test]
    fn test_leader() {
        let mut state = MatchState::new();
        assert_eq!(leader(&state), None);
        state.score_blue = 3;
        assert_eq!(leader(&state), Some(Team::Blue));
    }
}
