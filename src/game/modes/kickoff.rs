use tracing::info;

use crate::game::constants::{field, kick};
use crate::game::engine::{announce, players_of, Game};
use crate::game::geometry::FieldPosition;
use crate::game::host::{Color, Host};
use crate::game::state::{PlayMode, Team};
use crate::game::stoppage::format_ticks;
use crate::util::vec2::Vec2;

impl Game {
    /// Kickoff by `team` from midfield
    pub(crate) fn set_kickoff(&mut self, host: &mut dyn Host, team: Team) {
        let first_kickoff = self.state.first_kickoff;
        self.prepare_kick(host, team, FieldPosition::new(team, field::MIDFIELD_YARDS), Vec2::ZERO);
        self.state.first_kickoff = first_kickoff;
        self.kick.kickoff_pending = true;
        self.kick.kickoff_stall_start = Some(self.state.tick_count);
        self.hide_markers(host);

        announce(host, format!("🤾 Kickoff {}", team), Color::Yellow);

        // Each team lines up on its own half
        let own_side = -team.attack_sign();
        let kicking_x = if first_kickoff {
            kick::KICKOFF_OPENING_X
        } else {
            kick::KICKOFF_KICKING_X
        };
        let (kicking, _) = Self::split_outside_field(players_of(host, team));
        let (receiving, _) = Self::split_outside_field(players_of(host, team.opponent()));
        self.spread_line(host, &kicking, kicking_x * own_side, kick::KICKOFF_LINE_LENGTH);
        self.spread_line(
            host,
            &receiving,
            -kick::KICKOFF_RECEIVING_X * own_side,
            kick::KICKOFF_LINE_LENGTH,
        );

        self.block_team(host, team.opponent());
        self.block_middle_kickoff(host, team);
        self.state.mode = Some(PlayMode::Kickoff);
        info!("Kickoff set for {}", team);
    }

    /// Charge a stalled kickoff to stoppage time. Called once, at the kick.
    pub(crate) fn add_kickoff_stoppage(&mut self, host: &mut dyn Host) {
        let started = self.kick.kickoff_stall_start.take();
        self.kick.kickoff_pending = false;

        let Some(started) = started else {
            return;
        };
        if self.state.first_kickoff || self.state.end_game_time == 0.0 {
            return;
        }
        let stalled = self.state.tick_count.saturating_sub(started);
        if stalled < kick::KICKOFF_STALL_TICKS {
            return;
        }

        self.state.stoppage.add_ticks(stalled);
        announce(
            host,
            format!(
                "⏰ {} of stoppage time added for the slow kickoff",
                format_ticks(stalled, self.config.tick_rate)
            ),
            Color::Yellow,
        );
        info!("Kickoff stalled for {} ticks", stalled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::physics;
    use crate::game::host::BodyRef;
    use crate::game::state::CarrierRole;
    use crate::game::test_support::{fixture, move_player, tick_n, Fixture};

    #[test]
    fn test_opening_kickoff_layout() {
        let Fixture { game, host, .. } = fixture();
        assert_eq!(game.mode(), Some(PlayMode::Kickoff));
        for p in host.players() {
            match p.team {
                Team::Red => assert_eq!(p.position.x, -kick::KICKOFF_OPENING_X),
                Team::Blue => assert_eq!(p.position.x, kick::KICKOFF_RECEIVING_X),
                Team::Spectators => {}
            }
        }
        let ball = host.body(BodyRef::Ball).expect("ball");
        assert_eq!(ball.position, Vec2::ZERO);
        assert_eq!(ball.inv_mass, physics::KICKOFF_BALL_INV_MASS);
    }

    #[test]
    fn test_later_kickoff_uses_short_line() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.set_kickoff(&mut host, Team::Blue);
        assert!(!game.state.first_kickoff);
        for p in host.players() {
            match p.team {
                Team::Blue => assert_eq!(p.position.x, kick::KICKOFF_KICKING_X),
                Team::Red => assert_eq!(p.position.x, -kick::KICKOFF_RECEIVING_X),
                Team::Spectators => {}
            }
        }
    }

    #[test]
    fn test_stalled_kickoff_adds_stoppage() {
        let Fixture { mut game, mut host, blue, .. } = fixture();
        game.set_kickoff(&mut host, Team::Blue);
        tick_n(&mut game, &mut host, kick::KICKOFF_STALL_TICKS + 20);

        game.on_ball_kicked(&mut host, blue[0]);

        assert_eq!(game.state.stoppage.ticks(), kick::KICKOFF_STALL_TICKS + 20);
        assert!(!game.kick.kickoff_pending);
        assert!(host.announced("stoppage time"));
    }

    #[test]
    fn test_opening_kickoff_never_adds_stoppage() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        tick_n(&mut game, &mut host, kick::KICKOFF_STALL_TICKS + 20);
        game.on_ball_kicked(&mut host, red[0]);
        assert_eq!(game.state.stoppage.ticks(), 0);
    }

    #[test]
    fn test_kickoff_returned() {
        let Fixture { mut game, mut host, red, blue, .. } = fixture();
        host.set_velocity(BodyRef::Ball, Vec2::new(8.0, 0.0));
        game.on_ball_kicked(&mut host, red[0]);

        host.set_position(BodyRef::Ball, Vec2::new(200.0, 0.0));
        host.set_velocity(BodyRef::Ball, Vec2::ZERO);
        move_player(&mut host, blue[1], Vec2::new(221.0, 0.0));
        tick_n(&mut game, &mut host, 1);

        assert_eq!(game.state.carrier_role(), Some(CarrierRole::KickoffReturner));
        assert_eq!(host.avatar(blue[1]), Some("🏈"));
    }
}
