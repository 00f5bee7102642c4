//! Match state definitions
//!
//! Teams, play modes, the ball carrier and the per-match aggregate shared by
//! every mode controller.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::game::constants::{field, scrimmage};
use crate::game::geometry::FieldPosition;
use crate::game::host::PlayerId;
use crate::game::stoppage::StoppageTime;
use crate::util::vec2::Vec2;

/// Team membership. Possession only ever alternates between Red and Blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    #[default]
    Spectators,
    Red,
    Blue,
}

impl Team {
    /// The other playing team (spectators stay spectators)
    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
            Team::Spectators => Team::Spectators,
        }
    }

    /// +1 when the team attacks toward +x, -1 toward -x
    #[inline]
    pub fn attack_sign(self) -> f32 {
        match self {
            Team::Red => 1.0,
            Team::Blue => -1.0,
            Team::Spectators => 0.0,
        }
    }

    #[inline]
    pub fn is_playing(self) -> bool {
        self != Team::Spectators
    }

    /// Is `x` further toward this team's target than `reference`
    #[inline]
    pub fn is_ahead(self, x: f32, reference: f32) -> bool {
        match self {
            Team::Red => x > reference,
            Team::Blue => x < reference,
            Team::Spectators => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Red => "Red",
            Team::Blue => "Blue",
            Team::Spectators => "Spectators",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The play currently being run. `None` on [`MatchState::mode`] means between plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Down is set, offense may hike
    WaitingHike,
    /// Ball is live after a hike
    Down,
    Kickoff,
    Punt,
    OnsideKick,
    /// Free kick after a safety
    Safety,
    FieldGoal,
    /// Kicker turned a field goal attempt into a run
    FakeFieldGoal,
    /// Touchdown scored, try pending
    ExtraPoint,
}

impl PlayMode {
    /// Kick family modes share return and invasion handling
    pub fn is_kick(self) -> bool {
        matches!(
            self,
            PlayMode::Kickoff | PlayMode::Punt | PlayMode::OnsideKick | PlayMode::Safety
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayMode::WaitingHike => "waiting hike",
            PlayMode::Down => "down",
            PlayMode::Kickoff => "kickoff",
            PlayMode::Punt => "punt",
            PlayMode::OnsideKick => "onside kick",
            PlayMode::Safety => "safety kick",
            PlayMode::FieldGoal => "field goal",
            PlayMode::FakeFieldGoal => "fake field goal",
            PlayMode::ExtraPoint => "extra point",
        }
    }
}

/// How the current carrier got the ball. Drives yardage attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarrierRole {
    Receiver,
    Runner,
    QbRunner,
    /// Quarterback holding the ball while a defender rushes him
    QbRunnerSacking,
    PuntReturner,
    KickoffReturner,
    Intercepter,
    Sack,
}

/// Player currently holding the ball
#[derive(Debug, Clone, PartialEq)]
pub struct Carrier {
    pub id: PlayerId,
    /// Team the carrier plays for (not always the team with the ball during kicks)
    pub team: Team,
    pub role: CarrierRole,
    /// Where the carrier was when he got the ball
    pub initial_position: Vec2,
}

/// Shared match aggregate: score, clock, possession and per-play flags
#[derive(Debug, Clone)]
pub struct MatchState {
    // === Play ===
    pub mode: Option<PlayMode>,
    pub team_with_ball: Team,
    /// Line of scrimmage / spot of the current play
    pub ball_position: FieldPosition,
    pub carrier: Option<Carrier>,
    pub quarterback: Option<PlayerId>,
    /// The play's first kick has happened (pass, punt, kickoff, field goal)
    pub qb_kicked_ball: bool,
    pub running: bool,
    pub blocked_pass: bool,
    /// Current play is a try after a touchdown
    pub conversion: bool,
    pub intercept: bool,
    pub intercept_attempt: Option<PlayerId>,
    pub intercept_left_end_zone: bool,
    pub in_red_zone: bool,
    pub red_zone_penalties: u32,
    /// Defense y positions captured when the ball left the quarterback
    pub defense_y: HashMap<PlayerId, f32>,

    // === Down series ===
    pub down_count: u8,
    pub distance: i32,
    pub goal_mode: bool,

    // === Score ===
    pub score_red: u32,
    pub score_blue: u32,

    // === Clock ===
    pub tick_count: u64,
    pub hike_tick: u64,
    pub qb_carried_ball_tick: Option<u64>,
    pub hike_timer_enabled: bool,
    /// Seconds at which the match ends (0 = untimed)
    pub end_game_time: f32,
    /// Last host-reported elapsed seconds
    pub game_time: f32,
    pub overtime: bool,
    pub last_play_notice_sent: bool,
    pub first_kickoff: bool,
    pub stoppage: StoppageTime,

    /// A player may change the field layout once
    pub can_change_layout: bool,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            mode: None,
            team_with_ball: Team::Red,
            ball_position: FieldPosition::new(Team::Red, field::MIDFIELD_YARDS),
            carrier: None,
            quarterback: None,
            qb_kicked_ball: false,
            running: false,
            blocked_pass: false,
            conversion: false,
            intercept: false,
            intercept_attempt: None,
            intercept_left_end_zone: false,
            in_red_zone: false,
            red_zone_penalties: 0,
            defense_y: HashMap::new(),
            down_count: 0,
            distance: scrimmage::FIRST_DOWN_DISTANCE,
            goal_mode: false,
            score_red: 0,
            score_blue: 0,
            tick_count: 0,
            hike_tick: 0,
            qb_carried_ball_tick: None,
            hike_timer_enabled: true,
            end_game_time: 0.0,
            game_time: 0.0,
            overtime: false,
            last_play_notice_sent: false,
            first_kickoff: true,
            stoppage: StoppageTime::default(),
            can_change_layout: false,
        }
    }
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score_of(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.score_red,
            Team::Blue => self.score_blue,
            Team::Spectators => 0,
        }
    }

    pub fn is_carrier(&self, id: PlayerId) -> bool {
        self.carrier.as_ref().is_some_and(|c| c.id == id)
    }

    pub fn carrier_role(&self) -> Option<CarrierRole> {
        self.carrier.as_ref().map(|c| c.role)
    }

    /// "1 & 20 @ Red 35" style summary of the down
    pub fn state_of_match(&self) -> String {
        let to_go = if self.goal_mode {
            "Goal".to_string()
        } else {
            self.distance.to_string()
        };
        format!(
            "{} & {} @ {} {}",
            self.down_count, to_go, self.ball_position.team, self.ball_position.yards
        )
    }

    /// "Red 7 • 3 Blue"
    pub fn score_line(&self) -> String {
        format!("Red {} • {} Blue", self.score_red, self.score_blue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_opponent() {
        assert_eq!(Team::Red.opponent(), Team::Blue);
        assert_eq!(Team::Blue.opponent(), Team::Red);
        assert_eq!(Team::Spectators.opponent(), Team::Spectators);
    }

    #[test]
    fn test_team_is_ahead() {
        assert!(Team::Red.is_ahead(10.0, 0.0));
        assert!(!Team::Red.is_ahead(-10.0, 0.0));
        assert!(Team::Blue.is_ahead(-10.0, 0.0));
        assert!(!Team::Spectators.is_ahead(10.0, 0.0));
    }

    #[test]
    fn test_kick_modes() {
        assert!(PlayMode::Punt.is_kick());
        assert!(PlayMode::Safety.is_kick());
        assert!(!PlayMode::FieldGoal.is_kick());
        assert!(!PlayMode::WaitingHike.is_kick());
    }

    #[test]
    fn test_state_of_match() {
        let mut state = MatchState::new();
        state.down_count = 2;
        state.distance = 7;
        state.ball_position = FieldPosition::new(Team::Blue, 30);
        assert_eq!(state.state_of_match(), "2 & 7 @ Blue 30");

        state.goal_mode = true;
        assert_eq!(state.state_of_match(), "2 & Goal @ Blue 30");
    }

    #[test]
    fn test_default_state() {
        let state = MatchState::default();
        assert!(state.mode.is_none());
        assert_eq!(state.down_count, 0);
        assert_eq!(state.distance, 20);
        assert!(state.first_kickoff);
        assert_eq!(state.score_line(), "Red 0 • 0 Blue");
    }
}
