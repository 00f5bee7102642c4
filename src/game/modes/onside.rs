//! Onside kick
//!
//! Called from a kickoff set-up. Only the kicker may recover the ball, and
//! only once it has travelled far enough forward.

use tracing::info;

use crate::game::constants::{field, kick, onside};
use crate::game::engine::{announce, players_of, Game};
use crate::game::geometry::FieldPosition;
use crate::game::host::{Body, BodyRef, Color, Host, Marker, PlayerInfo};
use crate::game::state::{CarrierRole, PlayMode, Team};
use crate::util::vec2::Vec2;

impl Game {
    pub(crate) fn set_onside(&mut self, host: &mut dyn Host, team: Team, kicker: &PlayerInfo) {
        let spot = FieldPosition::new(team, onside::BALL_YARDS);
        let ball_x = spot.to_x();
        let sign = team.attack_sign();
        self.prepare_kick(host, team, spot, Vec2::new(ball_x, 0.0));
        self.kick.kicker = Some(kicker.id);
        self.kick.max_kick_ticks = onside::MAX_KICK_TICKS;
        announce(host, format!("🎲 Onside kick {} by {}", team, kicker.name), Color::Yellow);

        let kicker_x = ball_x - onside::KICKER_BACK_YARDS * field::YARD * sign;
        host.set_position(BodyRef::Player(kicker.id), Vec2::new(kicker_x, 0.0));
        host.set_velocity(BodyRef::Player(kicker.id), Vec2::ZERO);

        let kicking: Vec<PlayerInfo> = players_of(host, team)
            .into_iter()
            .filter(|p| p.id != kicker.id)
            .collect();
        let (kicking, _) = Self::split_outside_field(kicking);
        let (receiving, _) = Self::split_outside_field(players_of(host, team.opponent()));
        self.spread_line(
            host,
            &kicking,
            ball_x - onside::KICKING_TEAM_BACK_YARDS * field::YARD * sign,
            kick::KICKOFF_LINE_LENGTH,
        );
        self.spread_line(
            host,
            &receiving,
            ball_x + onside::RECEIVING_TEAM_YARDS * field::YARD * sign,
            kick::KICKOFF_LINE_LENGTH,
        );

        host.set_marker(Marker::BallLine, Some(ball_x));
        self.block_team(host, team.opponent());
        self.state.mode = Some(PlayMode::OnsideKick);
        info!("Onside kick set for {} by {}", team, kicker.name);
    }

    /// Ball heading back toward the kicking team right after the kick
    pub(crate) fn onside_went_backward(&self, ball: &Body) -> bool {
        let Some(kicked_at) = self.kick.kick_tick else {
            return false;
        };
        if self.state.tick_count.saturating_sub(kicked_at) >= onside::DIRECTION_CHECK_TICKS {
            return false;
        }
        let sign = self.state.team_with_ball.attack_sign();
        ball.velocity.x != 0.0 && ball.velocity.x.signum() == -sign
    }

    pub(crate) fn onside_touched(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        let kicking = self.state.team_with_ball;
        self.kick.returning = true;

        if player.team != kicking {
            announce(
                host,
                format!("🛡️ {} recovers the onside kick for {}", player.name, player.team),
                Color::MediumSeaGreen,
            );
            self.onside_failed(host);
            return;
        }
        if self.kick.kicker != Some(player.id) {
            announce(
                host,
                format!("🚩 Illegal touch by {}, only the kicker may recover", player.name),
                Color::Orange,
            );
            self.onside_failed(host);
            return;
        }

        let spot_x = self.state.ball_position.to_x();
        let ball_x = host.ball().map_or(spot_x, |b| b.position.x);
        let travelled = (ball_x - spot_x) * kicking.attack_sign() / field::YARD;
        if travelled < onside::MIN_FORWARD_YARDS {
            announce(
                host,
                format!("⚠️ {} touched the onside kick before it went {} yards", player.name, onside::MIN_FORWARD_YARDS),
                Color::Tomato,
            );
            self.onside_failed(host);
            return;
        }

        self.set_carrier(host, player, CarrierRole::PuntReturner, true);
        announce(
            host,
            format!("🎉 {} recovered the onside kick!", player.name),
            Color::MediumSeaGreen,
        );
    }

    /// Receivers take over at the kicking team's 40
    pub(crate) fn onside_failed(&mut self, host: &mut dyn Host) {
        let kicking = self.state.team_with_ball;
        info!("Onside kick by {} failed", kicking);
        self.start_series(
            host,
            kicking.opponent(),
            FieldPosition::new(kicking, onside::FAILED_SPOT_YARDS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sim_host::SimHost;
    use crate::game::test_support::{fixture, move_player, tick_n, Fixture};

    fn onside(game: &mut Game, host: &mut SimHost, kicker: u32) {
        let info = host.player(kicker).expect("kicker");
        game.set_onside(host, Team::Red, &info);
    }

    #[test]
    fn test_onside_layout() {
        let Fixture { mut game, mut host, red, blue, .. } = fixture();
        onside(&mut game, &mut host, red[0]);

        assert_eq!(game.mode(), Some(PlayMode::OnsideKick));
        assert_eq!(host.ball().expect("ball").position, Vec2::new(-100.0, 0.0));
        assert_eq!(host.player(red[0]).expect("kicker").position, Vec2::new(-150.0, 0.0));
        assert_eq!(host.player(red[1]).expect("red").position.x, -130.0);
        assert_eq!(host.player(blue[0]).expect("blue").position.x, 20.0);
    }

    #[test]
    fn test_backward_onside_fails() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        onside(&mut game, &mut host, red[0]);
        host.set_velocity(BodyRef::Ball, Vec2::new(-3.0, 0.0));
        game.on_ball_kicked(&mut host, red[0]);

        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.mode(), Some(PlayMode::WaitingHike));
        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Red, onside::FAILED_SPOT_YARDS));
        assert!(host.announced("went backward"));
    }

    #[test]
    fn test_kicker_recovers_after_ten_yards() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        onside(&mut game, &mut host, red[0]);
        game.on_ball_kicked(&mut host, red[0]);
        tick_n(&mut game, &mut host, onside::DIRECTION_CHECK_TICKS);

        host.set_position(BodyRef::Ball, Vec2::new(20.0, 0.0));
        move_player(&mut host, red[0], Vec2::new(-1.0, 0.0));
        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.mode(), Some(PlayMode::OnsideKick));
        assert!(game.state.is_carrier(red[0]));
        assert!(host.announced("recovered the onside kick"));
    }

    #[test]
    fn test_kicker_touch_too_early_fails() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        onside(&mut game, &mut host, red[0]);
        game.on_ball_kicked(&mut host, red[0]);
        tick_n(&mut game, &mut host, onside::DIRECTION_CHECK_TICKS);

        host.set_position(BodyRef::Ball, Vec2::new(-50.0, 0.0));
        move_player(&mut host, red[0], Vec2::new(-71.0, 0.0));
        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.mode(), Some(PlayMode::WaitingHike));
    }

    #[test]
    fn test_receivers_recover() {
        let Fixture { mut game, mut host, red, blue, .. } = fixture();
        onside(&mut game, &mut host, red[0]);
        game.on_ball_kicked(&mut host, red[0]);
        tick_n(&mut game, &mut host, onside::DIRECTION_CHECK_TICKS);

        host.set_position(BodyRef::Ball, Vec2::new(100.0, 130.0));
        move_player(&mut host, blue[0], Vec2::new(121.0, 130.0));
        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Red, onside::FAILED_SPOT_YARDS));
        assert!(host.announced("recovers the onside kick"));
    }
}
