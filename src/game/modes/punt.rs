use tracing::info;

use crate::game::constants::kick;
use crate::game::engine::{announce, players_of, Game};
use crate::game::host::{Color, Host, Marker};
use crate::game::state::{PlayMode, Team};
use crate::util::vec2::Vec2;

impl Game {
    /// Punt by `team` from the current line of scrimmage
    pub(crate) fn set_punt(&mut self, host: &mut dyn Host, team: Team, announced: bool, max_kick_ticks: u64) {
        let spot = self.state.ball_position;
        let ball_x = spot.to_x();
        self.prepare_kick(host, team, spot, Vec2::new(ball_x, 0.0));
        self.kick.max_kick_ticks = max_kick_ticks;
        if announced {
            announce(host, format!("🦵 Punt {}", team), Color::Yellow);
        }
        self.line_up_for_kick(host, team, ball_x);
        self.state.mode = Some(PlayMode::Punt);
        info!("Punt set for {} at {:?}", team, spot);
    }

    /// Kicking team behind the ball, receivers deep in their own half
    pub(crate) fn line_up_for_kick(&self, host: &mut dyn Host, team: Team, ball_x: f32) {
        let sign = team.attack_sign();
        let (kicking, _) = Self::split_outside_field(players_of(host, team));
        let (receiving, _) = Self::split_outside_field(players_of(host, team.opponent()));
        self.spread_line(
            host,
            &kicking,
            ball_x - kick::PUNT_KICKING_BACK * sign,
            kick::PUNT_KICKING_LINE_LENGTH,
        );
        self.spread_line(
            host,
            &receiving,
            kick::PUNT_RECEIVING_X * sign,
            kick::PUNT_RECEIVING_LINE_LENGTH,
        );
        host.set_marker(Marker::BallLine, Some(ball_x));
        self.block_team(host, team.opponent());
    }
}
