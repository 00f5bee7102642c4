//! Chat commands
//!
//! Player commands arrive as chat text. Each one is validated against the
//! match state and either acts or comes back as a [`CommandError`], which is
//! whispered to the caller.

use thiserror::Error;
use tracing::{info, warn};

use crate::game::constants::{field_goal, kick, scrimmage};
use crate::game::engine::{announce, Game};
use crate::game::host::{Announcement, Color, Host, PlayerId, PlayerInfo};
use crate::game::state::{PlayMode, Team};
use crate::game::timer::TimerSlot;

/// What `!cht` applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HikeTimerScope {
    /// Clear the clock of the current down only
    ThisDown,
    /// Clear it and stop arming it for the rest of the match
    Disable,
    Enable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hike,
    FieldGoal,
    Punt,
    Onside,
    ClearHikeTimer(HikeTimerScope),
}

impl Command {
    /// Recognise a command in a chat line. Anything else is plain chat.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("hike") {
            return Some(Command::Hike);
        }
        let rest = text.strip_prefix('!')?;
        let mut words = rest.split_whitespace();
        let name = words.next()?.to_ascii_lowercase();
        let command = match name.as_str() {
            "fg" => Command::FieldGoal,
            "punt" => Command::Punt,
            "onside" => Command::Onside,
            "cht" | "clearhiketime" => {
                let scope = match words.next() {
                    Some("disable") => HikeTimerScope::Disable,
                    Some("enable") => HikeTimerScope::Enable,
                    _ => HikeTimerScope::ThisDown,
                };
                Command::ClearHikeTimer(scope)
            }
            _ => return None,
        };
        Some(command)
    }
}

/// Why a command was refused. The message is shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("There is no match in progress")]
    NotInProgress,
    #[error("The match is paused")]
    Paused,
    #[error("You are not on a team")]
    NotOnTeam,
    #[error("Your team does not have the ball")]
    NotInPossession,
    #[error("You are too far from the ball")]
    TooFarFromBall,
    #[error("You cannot do that now: {0}")]
    NotNow(&'static str),
    #[error("Only admins can use this command")]
    NotAdmin,
    #[error("Field goals can only be attempted within {max} yards")]
    FieldGoalTooFar { max: i32 },
    #[error("You cannot punt in the red zone")]
    PuntInRedZone,
    #[error("You are past the line of scrimmage")]
    HikerOffside,
    #[error("{0} past the line of scrimmage")]
    TeammatesOffside(String),
    #[error("Unknown player")]
    UnknownPlayer,
}

impl Game {
    /// Handle one chat line from `id`. Plain chat is ignored.
    pub fn on_chat(&mut self, host: &mut dyn Host, id: PlayerId, text: &str) -> Result<(), CommandError> {
        let Some(command) = Command::parse(text) else {
            return Ok(());
        };
        // "hike" is also ordinary chat outside a set down
        if command == Command::Hike && self.state.mode != Some(PlayMode::WaitingHike) {
            return Ok(());
        }
        let player = host.player(id).ok_or(CommandError::UnknownPlayer)?;

        let result = match command {
            Command::Hike => self.hike(host, &player),
            Command::FieldGoal => self.field_goal_command(host, &player),
            Command::Punt => self.punt_command(host, &player),
            Command::Onside => self.onside_command(host, &player),
            Command::ClearHikeTimer(scope) => self.clear_hike_timer_command(host, &player, scope),
        };

        if let Err(e) = &result {
            warn!("{:?} from {} rejected: {}", command, player.name, e);
            host.whisper(id, &Announcement::warning(format!("⚠️ {}", e), Color::Tomato));
            self.metric(|m| m.record_command_rejected());
        }
        result
    }

    /// Shared checks: match running, caller on the team with the ball
    fn check_possession(&self, host: &dyn Host, player: &PlayerInfo) -> Result<Team, CommandError> {
        if !host.is_match_in_progress() || !self.is_match_active() {
            return Err(CommandError::NotInProgress);
        }
        if !player.team.is_playing() {
            return Err(CommandError::NotOnTeam);
        }
        if player.team != self.state.team_with_ball {
            return Err(CommandError::NotInPossession);
        }
        Ok(player.team)
    }

    fn check_near_ball(&self, host: &dyn Host, player: &PlayerInfo) -> Result<(), CommandError> {
        let ball = host.ball().ok_or(CommandError::NotNow("there is no ball"))?;
        if player.distance_to(&ball) > scrimmage::HIKE_DISTANCE {
            return Err(CommandError::TooFarFromBall);
        }
        Ok(())
    }

    fn field_goal_command(&mut self, host: &mut dyn Host, player: &PlayerInfo) -> Result<(), CommandError> {
        let team = self.check_possession(host, player)?;
        if self.state.mode != Some(PlayMode::WaitingHike) || self.state.conversion {
            return Err(CommandError::NotNow("field goals are called before the hike"));
        }
        if self.state.ball_position.yards_to_end_zone(team) > field_goal::MAX_DISTANCE_YARDS {
            return Err(CommandError::FieldGoalTooFar {
                max: field_goal::MAX_DISTANCE_YARDS,
            });
        }
        self.check_near_ball(host, player)?;

        announce(host, format!("🥅 {} calls a field goal", player.name), Color::Yellow);
        info!("{} called a field goal for {}", player.name, team);
        self.set_field_goal(host, player);
        Ok(())
    }

    fn punt_command(&mut self, host: &mut dyn Host, player: &PlayerInfo) -> Result<(), CommandError> {
        let team = self.check_possession(host, player)?;
        if self.state.mode != Some(PlayMode::WaitingHike) || self.state.conversion {
            return Err(CommandError::NotNow("punts are called before the hike"));
        }
        self.check_near_ball(host, player)?;
        if self.state.ball_position.is_in_red_zone(team.opponent()) {
            return Err(CommandError::PuntInRedZone);
        }

        announce(host, format!("🦵 {} calls a punt", player.name), Color::Yellow);
        info!("{} called a punt for {}", player.name, team);
        self.set_punt(host, team, true, kick::PUNT_MAX_KICK_TICKS);
        Ok(())
    }

    fn onside_command(&mut self, host: &mut dyn Host, player: &PlayerInfo) -> Result<(), CommandError> {
        let team = self.check_possession(host, player)?;
        if self.state.mode != Some(PlayMode::Kickoff) || self.state.qb_kicked_ball {
            return Err(CommandError::NotNow("onside kicks replace a kickoff"));
        }
        self.check_near_ball(host, player)?;

        announce(host, format!("🦵 {} calls an onside kick", player.name), Color::Yellow);
        self.add_kickoff_stoppage(host);
        self.set_onside(host, team, player);
        Ok(())
    }

    fn clear_hike_timer_command(
        &mut self,
        host: &mut dyn Host,
        player: &PlayerInfo,
        scope: HikeTimerScope,
    ) -> Result<(), CommandError> {
        if !player.admin {
            return Err(CommandError::NotAdmin);
        }
        if !host.is_match_in_progress() {
            return Err(CommandError::NotInProgress);
        }
        if self.state.mode != Some(PlayMode::WaitingHike) {
            return Err(CommandError::NotNow("the ball is in play"));
        }

        let message = match scope {
            HikeTimerScope::ThisDown => {
                self.timers.stop(TimerSlot::Hike);
                format!("⏱️ {} cleared the hike clock for this down", player.name)
            }
            HikeTimerScope::Disable => {
                self.timers.stop(TimerSlot::Hike);
                self.state.hike_timer_enabled = false;
                format!("⏱️ {} disabled the hike clock", player.name)
            }
            HikeTimerScope::Enable => {
                self.state.hike_timer_enabled = true;
                format!("⏱️ {} enabled the hike clock", player.name)
            }
        };
        announce(host, message, Color::Pink);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::FieldPosition;
    use crate::game::host::BodyRef;
    use crate::game::test_support::{down_at, fixture, move_player, Fixture};
    use crate::util::vec2::Vec2;

    /// Red to hike at `pos` with red1 standing next to the ball
    fn waiting(f: &mut Fixture, pos: FieldPosition) {
        down_at(&mut f.game, &mut f.host, Team::Red, pos, 1, 20);
        let ball = f.host.ball().expect("ball").position;
        move_player(&mut f.host, f.red[0], Vec2::new(ball.x - 30.0, 0.0));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("hike"), Some(Command::Hike));
        assert_eq!(Command::parse("  HIKE "), Some(Command::Hike));
        assert_eq!(Command::parse("!fg"), Some(Command::FieldGoal));
        assert_eq!(Command::parse("!punt"), Some(Command::Punt));
        assert_eq!(Command::parse("!onside"), Some(Command::Onside));
        assert_eq!(
            Command::parse("!cht disable"),
            Some(Command::ClearHikeTimer(HikeTimerScope::Disable))
        );
        assert_eq!(
            Command::parse("!cht"),
            Some(Command::ClearHikeTimer(HikeTimerScope::ThisDown))
        );
        assert_eq!(Command::parse("hike please"), None);
        assert_eq!(Command::parse("!help"), None);
        assert_eq!(Command::parse("gg"), None);
    }

    #[test]
    fn test_plain_chat_is_ignored() {
        let mut f = fixture();
        let before = f.host.announcements.len();
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "nice kick"), Ok(()));
        assert_eq!(f.host.announcements.len(), before);
        assert!(f.host.whispers.is_empty());
    }

    #[test]
    fn test_hike_chat_outside_a_set_down_is_chat() {
        let mut f = fixture();
        assert_eq!(f.game.mode(), Some(PlayMode::Kickoff));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "hike"), Ok(()));
        assert!(f.host.whispers.is_empty());
    }

    #[test]
    fn test_hike_by_chat() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 40));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "hike"), Ok(()));
        assert_eq!(f.game.mode(), Some(PlayMode::Down));
    }

    #[test]
    fn test_rejection_is_whispered() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 40));
        let result = f.game.on_chat(&mut f.host, f.blue[0], "!punt");

        assert_eq!(result, Err(CommandError::NotInPossession));
        assert_eq!(f.host.whispers.len(), 1);
        assert_eq!(f.host.whispers[0].0, f.blue[0]);
        assert!(f.host.whispers[0].1.text.contains("does not have the ball"));
    }

    #[test]
    fn test_spectator_is_not_on_a_team() {
        let mut f = fixture();
        let spectator = f.host.add_player("watcher", Team::Spectators, Vec2::new(0.0, 400.0));
        assert_eq!(f.game.on_chat(&mut f.host, spectator, "!fg"), Err(CommandError::NotOnTeam));
    }

    #[test]
    fn test_field_goal_out_of_range() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 45));
        let result = f.game.on_chat(&mut f.host, f.red[0], "!fg");
        assert_eq!(result, Err(CommandError::FieldGoalTooFar { max: 48 }));
        assert_eq!(f.game.mode(), Some(PlayMode::WaitingHike));
    }

    #[test]
    fn test_field_goal_called() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Blue, 30));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "!fg"), Ok(()));
        assert_eq!(f.game.mode(), Some(PlayMode::FieldGoal));
        assert_eq!(f.game.field_goal.kicker, Some(f.red[0]));
    }

    #[test]
    fn test_no_field_goal_on_a_try() {
        let mut f = fixture();
        f.game.set_extra_point(&mut f.host, Team::Red, true);
        let ball = f.host.ball().expect("ball").position;
        move_player(&mut f.host, f.red[0], Vec2::new(ball.x - 30.0, 0.0));
        let result = f.game.on_chat(&mut f.host, f.red[0], "!fg");
        assert!(matches!(result, Err(CommandError::NotNow(_))));
    }

    #[test]
    fn test_punt_called() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 40));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "!punt"), Ok(()));
        assert_eq!(f.game.mode(), Some(PlayMode::Punt));
        assert!(f.host.announced("calls a punt"));
    }

    #[test]
    fn test_no_punt_in_red_zone() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Blue, 15));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "!punt"), Err(CommandError::PuntInRedZone));
    }

    #[test]
    fn test_punt_too_far_from_ball() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 40));
        move_player(&mut f.host, f.red[0], Vec2::new(-400.0, 0.0));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "!punt"), Err(CommandError::TooFarFromBall));
    }

    #[test]
    fn test_onside_replaces_kickoff() {
        let mut f = fixture();
        move_player(&mut f.host, f.red[0], Vec2::new(-30.0, 0.0));
        assert_eq!(f.game.on_chat(&mut f.host, f.red[0], "!onside"), Ok(()));
        assert_eq!(f.game.mode(), Some(PlayMode::OnsideKick));
        assert_eq!(f.game.kick.kicker, Some(f.red[0]));
    }

    #[test]
    fn test_onside_after_kick_rejected() {
        let mut f = fixture();
        move_player(&mut f.host, f.red[0], Vec2::new(-30.0, 0.0));
        f.host.set_velocity(BodyRef::Ball, Vec2::new(5.0, 0.0));
        f.game.on_ball_kicked(&mut f.host, f.red[0]);
        let result = f.game.on_chat(&mut f.host, f.red[0], "!onside");
        assert!(matches!(result, Err(CommandError::NotNow(_))));
    }

    #[test]
    fn test_clear_hike_timer_needs_admin() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 40));
        assert_eq!(f.game.on_chat(&mut f.host, f.blue[1], "!cht"), Err(CommandError::NotAdmin));

        f.host.set_admin(f.blue[1], true);
        assert!(f.game.timers.is_armed(TimerSlot::Hike));
        assert_eq!(f.game.on_chat(&mut f.host, f.blue[1], "!cht"), Ok(()));
        assert!(!f.game.timers.is_armed(TimerSlot::Hike));
        assert!(f.game.state.hike_timer_enabled);
    }

    #[test]
    fn test_disable_hike_timer_for_the_match() {
        let mut f = fixture();
        waiting(&mut f, FieldPosition::new(Team::Red, 40));
        f.host.set_admin(f.red[2], true);
        assert_eq!(f.game.on_chat(&mut f.host, f.red[2], "!cht disable"), Ok(()));
        assert!(!f.game.state.hike_timer_enabled);

        down_at(&mut f.game, &mut f.host, Team::Red, FieldPosition::new(Team::Red, 40), 2, 20);
        assert!(!f.game.timers.is_armed(TimerSlot::Hike));

        assert_eq!(f.game.on_chat(&mut f.host, f.red[2], "!cht enable"), Ok(()));
        assert!(f.game.state.hike_timer_enabled);
    }
}
