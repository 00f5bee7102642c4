use tracing::info;

use crate::game::constants::kick;
use crate::game::engine::{announce, Game};
use crate::game::geometry::FieldPosition;
use crate::game::host::{Color, Host};
use crate::game::state::{PlayMode, Team};
use crate::util::vec2::Vec2;

impl Game {
    /// Free kick by the team that conceded the safety, from its own 20
    pub(crate) fn set_safety(&mut self, host: &mut dyn Host, team: Team) {
        let spot = FieldPosition::new(team, kick::SAFETY_KICK_YARDS);
        let ball_x = spot.to_x();
        self.prepare_kick(host, team, spot, Vec2::new(ball_x, 0.0));
        self.kick.max_kick_ticks = kick::SAFETY_MAX_KICK_TICKS;
        announce(host, format!("🦵 Safety kick {}", team), Color::Yellow);
        self.line_up_for_kick(host, team, ball_x);
        self.state.mode = Some(PlayMode::Safety);
        info!("Safety kick set for {}", team);
    }
}
