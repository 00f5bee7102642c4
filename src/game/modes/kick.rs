//! Kick family
//!
//! Kickoff, punt, onside kick and safety kick share the same shape: a set-up
//! with the receiving team held behind a barrier, a single kick, then a race
//! for the loose ball. The per-kind set-ups live in sibling modules.

use tracing::{debug, info};

use crate::game::constants::{kick, physics, scoring, scrimmage};
use crate::game::engine::{announce, players_of, Game};
use crate::game::geometry::{clamp_to_field_of_play, is_in_own_end_zone, is_out_of_bounds, FieldPosition};
use crate::game::host::{Announcement, Body, BodyRef, Color, Host, Marker, PlayerId, PlayerInfo};
use crate::game::state::{CarrierRole, PlayMode, Team};
use crate::util::vec2::Vec2;

/// Per-kick scratch state, cleared by every reset
#[derive(Debug, Clone, Default)]
pub struct KickState {
    /// A receiver (or the onside kicker) has the ball
    pub returning: bool,
    pub set_tick: u64,
    /// Ticks the kicking team has to kick (0 = no limit)
    pub max_kick_ticks: u64,
    pub kicker: Option<PlayerId>,
    pub kick_tick: Option<u64>,
    /// Kickoff is set and not kicked yet
    pub kickoff_pending: bool,
    /// Tick the current kickoff was set, for stall accounting
    pub kickoff_stall_start: Option<u64>,
}

impl Game {
    pub(crate) fn tick_kick(&mut self, host: &mut dyn Host) {
        let Some(mode) = self.state.mode else {
            return;
        };
        if self.state.carrier.is_some() {
            self.tick_carrier(host);
            return;
        }

        if !self.state.qb_kicked_ball {
            let limit = self.kick.max_kick_ticks;
            if limit > 0 && self.state.tick_count.saturating_sub(self.kick.set_tick) > limit {
                self.kick_clock_expired(host, mode);
            }
            return;
        }
        if self.kick.returning {
            return;
        }
        let Some(ball) = host.ball() else {
            return;
        };

        if mode == PlayMode::OnsideKick && self.onside_went_backward(&ball) {
            announce(host, "⚠️ The onside kick went backward", Color::Tomato);
            self.onside_failed(host);
            return;
        }

        if is_out_of_bounds(ball.position, -ball.radius) {
            self.kick_out_of_bounds(host, mode, &ball);
            return;
        }

        let toucher = host
            .players()
            .into_iter()
            .filter(|p| p.team.is_playing() && !self.kicker_in_grace(p.id))
            .find(|p| p.distance_to(&ball) < physics::CONTACT_DISTANCE);
        if let Some(player) = toucher {
            self.kick_touched(host, mode, &player);
        }
    }

    /// Kick event in any kick mode
    pub(crate) fn kick_family_kick(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        let Some(mode) = self.state.mode else {
            return;
        };
        if self.kick.returning || !player.team.is_playing() {
            return;
        }
        if self.state.qb_kicked_ball {
            if !self.kicker_in_grace(player.id) {
                self.kick_touched(host, mode, player);
            }
            return;
        }

        if mode == PlayMode::Kickoff {
            self.add_kickoff_stoppage(host);
        }
        self.state.qb_kicked_ball = true;
        self.kick.kick_tick = Some(self.state.tick_count);
        if self.kick.kicker.is_none() {
            self.kick.kicker = Some(player.id);
        }
        self.unblock_teams(host);
        if matches!(mode, PlayMode::Punt | PlayMode::Safety) {
            self.push_back_invaders(host, player.id, mode);
        }
        debug!("{} kicked the {}", player.name, mode.label());
    }

    fn kicker_in_grace(&self, id: PlayerId) -> bool {
        match (self.kick.kicker, self.kick.kick_tick) {
            (Some(kicker), Some(at)) => {
                kicker == id && self.state.tick_count <= at + kick::KICKER_GRACE_TICKS
            }
            _ => false,
        }
    }

    /// First touch of the loose ball after the kick
    fn kick_touched(&mut self, host: &mut dyn Host, mode: PlayMode, player: &PlayerInfo) {
        if mode == PlayMode::OnsideKick {
            self.onside_touched(host, player);
            return;
        }
        let kicking = self.state.team_with_ball;

        if player.team == kicking {
            announce(
                host,
                format!("🚩 Illegal touch by {} of the kicking team, ball goes to {}", player.name, kicking.opponent()),
                Color::Orange,
            );
            let spot = FieldPosition::from_x(clamp_to_field_of_play(player.position.x));
            self.start_series(host, kicking.opponent(), spot);
            return;
        }

        let role = match mode {
            PlayMode::Kickoff => CarrierRole::KickoffReturner,
            _ => CarrierRole::PuntReturner,
        };
        self.kick.returning = true;
        self.set_carrier(host, player, role, true);
        announce(
            host,
            format!("🏈 {} returns the {}", player.name, mode.label()),
            Color::MediumSeaGreen,
        );
    }

    /// Nobody touched the ball before it left the field
    fn kick_out_of_bounds(&mut self, host: &mut dyn Host, mode: PlayMode, ball: &Body) {
        if mode == PlayMode::OnsideKick {
            announce(host, "⚠️ The onside kick went out of bounds", Color::Tomato);
            self.onside_failed(host);
            return;
        }
        let receiving = self.state.team_with_ball.opponent();
        let spot = if is_in_own_end_zone(ball.position, receiving) {
            FieldPosition::new(receiving, scoring::TOUCHBACK_YARDS)
        } else {
            FieldPosition::from_x(clamp_to_field_of_play(ball.position.x))
        };
        announce(
            host,
            format!("🚧 The {} went out of bounds, ball to {}", mode.label(), receiving),
            Color::Orange,
        );
        self.start_series(host, receiving, spot);
    }

    fn kick_clock_expired(&mut self, host: &mut dyn Host, mode: PlayMode) {
        info!("{} clock expired", mode.label());
        match mode {
            PlayMode::OnsideKick => {
                announce(host, "⏰ Took too long to kick the onside kick", Color::Tomato);
                self.onside_failed(host);
            }
            _ => {
                let receiving = self.state.team_with_ball.opponent();
                announce(
                    host,
                    format!("⏰ Took too long to kick the {}, ball to {}", mode.label(), receiving),
                    Color::Tomato,
                );
                let spot = self.state.ball_position;
                self.start_series(host, receiving, spot);
            }
        }
    }

    /// Kicking team players past the ball at the kick are pushed back
    fn push_back_invaders(&self, host: &mut dyn Host, kicker: PlayerId, mode: PlayMode) {
        let Some(ball) = host.ball() else {
            return;
        };
        let team = self.state.team_with_ball;
        let sign = team.attack_sign();
        for p in players_of(host, team) {
            if p.id == kicker || !team.is_ahead(p.position.x, ball.position.x) {
                continue;
            }
            let y = if p.position.y.abs() > kick::INVADER_MAX_Y {
                kick::INVADER_MAX_Y * p.position.y.signum()
            } else {
                p.position.y
            };
            host.set_position(
                BodyRef::Player(p.id),
                Vec2::new(ball.position.x - kick::INVADER_PUSH_BACK * sign, y),
            );
            host.set_velocity(
                BodyRef::Player(p.id),
                Vec2::new(-kick::INVADER_PUSH_SPEED * sign, p.velocity.y),
            );
            host.whisper(
                p.id,
                &Announcement::warning(
                    format!("🚨 You cannot stand past the ball during the {}", mode.label()),
                    Color::Red,
                ),
            );
        }
    }

    /// Common part of every kick set-up: clear the previous play, spot the
    /// ball and hold the receiving team back
    pub(crate) fn prepare_kick(&mut self, host: &mut dyn Host, team: Team, spot: FieldPosition, ball: Vec2) {
        self.state.mode = None;
        self.reset(host);
        self.reset_play();
        self.state.team_with_ball = team;
        self.state.ball_position = spot;
        self.state.down_count = 0;
        self.state.distance = scrimmage::FIRST_DOWN_DISTANCE;
        self.kick.set_tick = self.state.tick_count;

        self.place_ball(host, ball);
        self.set_ball_inv_mass(host, physics::KICKOFF_BALL_INV_MASS);
        host.set_marker(Marker::FirstDownLine, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sim_host::SimHost;
    use crate::game::stats::StatCategory;
    use crate::game::test_support::{fixture, move_player, tick_n, Fixture};

    fn kick_ball(game: &mut Game, host: &mut SimHost, kicker: PlayerId, velocity: Vec2) {
        host.set_velocity(BodyRef::Ball, velocity);
        game.on_ball_kicked(host, kicker);
    }

    #[test]
    fn test_punt_returned_and_tackled_starts_series() {
        let Fixture { mut game, mut host, red, blue, stats } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, true, kick::PUNT_MAX_KICK_TICKS);
        assert_eq!(game.mode(), Some(PlayMode::Punt));

        kick_ball(&mut game, &mut host, red[0], Vec2::new(10.0, 0.0));
        host.set_position(BodyRef::Ball, Vec2::new(300.0, 0.0));
        host.set_velocity(BodyRef::Ball, Vec2::ZERO);
        move_player(&mut host, blue[0], Vec2::new(321.0, 0.0));
        tick_n(&mut game, &mut host, 1);
        assert_eq!(game.state.carrier_role(), Some(CarrierRole::PuntReturner));

        move_player(&mut host, blue[0], Vec2::new(250.0, 0.0));
        move_player(&mut host, red[1], Vec2::new(220.0, 0.0));
        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.mode(), Some(PlayMode::WaitingHike));
        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Blue, 25));
        assert_eq!(game.state.down_count, 1);
        assert_eq!(game.state.distance, scrimmage::FIRST_DOWN_DISTANCE);
        assert_eq!(stats.stat(blue[0], StatCategory::Returns), 1);
        assert_eq!(stats.stat(red[1], StatCategory::Tackles), 1);
    }

    #[test]
    fn test_kicking_team_touch_turns_ball_over() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, false, kick::PUNT_MAX_KICK_TICKS);
        kick_ball(&mut game, &mut host, red[0], Vec2::new(10.0, 0.0));

        host.set_position(BodyRef::Ball, Vec2::new(100.0, 0.0));
        host.set_velocity(BodyRef::Ball, Vec2::ZERO);
        move_player(&mut host, red[1], Vec2::new(121.0, 0.0));
        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Blue, 38));
        assert!(host.announced("Illegal touch"));
    }

    #[test]
    fn test_kicker_grace_after_kick() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, false, kick::PUNT_MAX_KICK_TICKS);
        let ball = host.ball().expect("ball").position;
        move_player(&mut host, red[0], Vec2::new(ball.x - 21.0, 0.0));
        kick_ball(&mut game, &mut host, red[0], Vec2::ZERO);

        tick_n(&mut game, &mut host, 1);
        assert_eq!(game.mode(), Some(PlayMode::Punt));
    }

    #[test]
    fn test_punt_clock_expiry_gives_ball_away() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, false, kick::PUNT_MAX_KICK_TICKS);

        tick_n(&mut game, &mut host, kick::PUNT_MAX_KICK_TICKS + 1);

        assert_eq!(game.mode(), Some(PlayMode::WaitingHike));
        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Red, 30));
        assert!(host.announced("Took too long"));
    }

    #[test]
    fn test_invaders_pushed_back_at_punt() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, false, kick::PUNT_MAX_KICK_TICKS);
        let ball_x = host.ball().expect("ball").position.x;
        move_player(&mut host, red[2], Vec2::new(ball_x + 40.0, 150.0));

        game.on_ball_kicked(&mut host, red[0]);

        let pushed = host.player(red[2]).expect("player");
        assert_eq!(pushed.position, Vec2::new(ball_x - kick::INVADER_PUSH_BACK, kick::INVADER_MAX_Y));
        assert!(pushed.velocity.x < 0.0);
        assert_eq!(host.whispers.len(), 1);
    }

    #[test]
    fn test_ball_out_of_bounds_goes_to_receivers() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, false, kick::PUNT_MAX_KICK_TICKS);
        kick_ball(&mut game, &mut host, red[0], Vec2::ZERO);
        host.set_position(BodyRef::Ball, Vec2::new(150.0, 300.0));

        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Blue, 35));
    }

    #[test]
    fn test_kick_through_end_zone_is_touchback() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.set_punt(&mut host, Team::Red, false, kick::PUNT_MAX_KICK_TICKS);
        kick_ball(&mut game, &mut host, red[0], Vec2::ZERO);
        host.set_position(BodyRef::Ball, Vec2::new(610.0, 0.0));

        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.state.team_with_ball, Team::Blue);
        assert_eq!(game.state.ball_position, FieldPosition::new(Team::Blue, scoring::TOUCHBACK_YARDS));
    }
}
