//! Neutral zone invasion
//!
//! Defenders may not loiter just past the line of scrimmage while the hike
//! clock runs. The detector only tracks who is there; the penalty fires from
//! a timer when they stay too long.

use tracing::debug;

use crate::game::constants::{field, scrimmage};
use crate::game::engine::{players_of, Game};
use crate::game::host::{Host, PlayerId, PlayerInfo};
use crate::game::state::PlayMode;
use crate::game::timer::{TimedAction, TimerSlot};

#[derive(Debug, Clone, Default)]
pub struct InvasionDetector {
    /// Defenders currently in the neutral zone
    pub players: Vec<PlayerId>,
}

impl InvasionDetector {
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

impl Game {
    /// Track defenders in the neutral zone. Returns true while someone is inside.
    pub(crate) fn check_invasion(&mut self, host: &dyn Host) -> bool {
        let team = self.state.team_with_ball;
        let sign = team.attack_sign();
        let line_x = self.state.ball_position.to_x();
        let depth = scrimmage::INVASION_ZONE_YARDS * field::YARD;

        let invaders: Vec<PlayerId> = players_of(host, team.opponent())
            .into_iter()
            .filter(|p| {
                let into_zone = (p.position.x - line_x) * sign;
                (0.0..=depth).contains(&into_zone)
            })
            .map(|p| p.id)
            .collect();

        if invaders.is_empty() {
            self.timers.stop(TimerSlot::Invasion);
            self.invasion.clear();
            return false;
        }

        if !self.timers.is_armed(TimerSlot::Invasion) {
            debug!("{} defenders in the neutral zone", invaders.len());
            self.timers.start(
                TimerSlot::Invasion,
                scrimmage::INVASION_TIMEOUT_MS,
                TimedAction::InvasionPenalty,
            );
        }
        self.invasion.players = invaders;
        true
    }

    pub(crate) fn invasion_penalty(&mut self, host: &mut dyn Host) {
        let live = self.state.mode == Some(PlayMode::Down)
            && !self.state.qb_kicked_ball
            && self.state.carrier.is_none()
            && !self.is_hike_time_over();
        if !live {
            self.invasion.clear();
            return;
        }
        let offenders: Vec<PlayerInfo> = self
            .invasion
            .players
            .iter()
            .filter_map(|id| host.player(*id))
            .collect();
        self.invasion.clear();
        if offenders.is_empty() {
            return;
        }
        self.defensive_foul(host, &offenders, scrimmage::INVASION_PENALTY, "Invasion", true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::FieldPosition;
    use crate::game::state::Team;
    use crate::game::stats::StatCategory;
    use crate::game::test_support::{down_at, fixture, ms_ticks, move_player, tick_n, Fixture};
    use crate::util::vec2::Vec2;

    fn snap(f: &mut Fixture) {
        down_at(&mut f.game, &mut f.host, Team::Red, FieldPosition::new(Team::Red, 50), 1, 20);
        move_player(&mut f.host, f.red[0], Vec2::new(-40.0, 0.0));
        let qb = f.host.player(f.red[0]).expect("qb");
        f.game.hike(&mut f.host, &qb).expect("hike");
    }

    #[test]
    fn test_lingering_defender_is_penalized() {
        let mut f = fixture();
        snap(&mut f);
        move_player(&mut f.host, f.blue[0], Vec2::new(15.0, 200.0));

        tick_n(&mut f.game, &mut f.host, 1);
        assert_eq!(f.game.invasion.players, vec![f.blue[0]]);
        assert!(f.game.timers.is_armed(TimerSlot::Invasion));

        tick_n(&mut f.game, &mut f.host, ms_ticks(scrimmage::INVASION_TIMEOUT_MS));
        assert_eq!(f.game.mode(), Some(PlayMode::WaitingHike));
        assert_eq!(f.game.state.ball_position, FieldPosition::new(Team::Blue, 40));
        assert_eq!(f.stats.stat(f.blue[0], StatCategory::Penalties), 1);
        assert!(f.host.announced("Invasion"));
    }

    #[test]
    fn test_leaving_zone_cancels_penalty() {
        let mut f = fixture();
        snap(&mut f);
        move_player(&mut f.host, f.blue[0], Vec2::new(15.0, 200.0));
        tick_n(&mut f.game, &mut f.host, 10);

        move_player(&mut f.host, f.blue[0], Vec2::new(100.0, 200.0));
        tick_n(&mut f.game, &mut f.host, 1);
        assert!(!f.game.timers.is_armed(TimerSlot::Invasion));
        assert!(f.game.invasion.players.is_empty());
    }
}
