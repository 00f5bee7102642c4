//! Carrier play
//!
//! Whoever holds the ball (runner, receiver, returner, intercepter) is
//! followed every tick until he scores, steps out or is tackled. The end of
//! the play then hands over to the down series, a new series or a kick.

use tracing::info;

use crate::game::constants::{clock, field, physics, scoring, scrimmage};
use crate::game::down_info::DownMoment;
use crate::game::engine::{announce, names, players_of, Game, PlayerList};
use crate::game::geometry::{
    clamp_to_field_of_play, is_in_own_end_zone, is_in_scoring_end_zone, is_out_of_bounds,
    is_outside_sidelines, FieldPosition,
};
use crate::game::host::{Color, Host, PlayerInfo};
use crate::game::state::{Carrier, CarrierRole, PlayMode, Team};
use crate::game::stats::StatCategory;
use crate::game::timer::{DownSetup, TimedAction, TimerSlot};

impl Game {
    pub(crate) fn tick_carrier(&mut self, host: &mut dyn Host) {
        let Some(carrier) = self.state.carrier.clone() else {
            return;
        };
        let Some(player) = host.player(carrier.id) else {
            return;
        };
        let team = carrier.team;

        if carrier.role == CarrierRole::Intercepter
            && !self.state.intercept_left_end_zone
            && !is_in_own_end_zone(player.position, team)
        {
            self.state.intercept_left_end_zone = true;
        }

        if is_in_scoring_end_zone(player.position, team) && !is_outside_sidelines(player.position) {
            self.carrier_touchdown(host, &carrier, &player);
            return;
        }

        if is_out_of_bounds(player.position, 0.0) {
            announce(host, format!("🚧 {} ran out of bounds", player.name), Color::Orange);
            self.end_play(host, &player, &[]);
            return;
        }

        let tacklers: PlayerList = players_of(host, team.opponent())
            .into_iter()
            .filter(|p| p.distance_to_player(&player) < physics::CONTACT_DISTANCE)
            .collect();
        if !tacklers.is_empty() {
            self.end_play(host, &player, &tacklers);
        }
    }

    fn carrier_touchdown(&mut self, host: &mut dyn Host, carrier: &Carrier, player: &PlayerInfo) {
        self.record_moment(host, DownMoment::EndPlay);
        self.attribute_carry(host, carrier, player, clamp_to_field_of_play(player.position.x));
        self.score_touchdown(host, carrier.team, Some(player));
    }

    /// Carrier stopped: tackled (`tacklers` not empty) or out of bounds
    fn end_play(&mut self, host: &mut dyn Host, player: &PlayerInfo, tacklers: &[PlayerInfo]) {
        let Some(mut carrier) = self.state.carrier.clone() else {
            return;
        };
        let team = carrier.team;
        let end_x = clamp_to_field_of_play(player.position.x);
        let spot = FieldPosition::from_x(end_x);
        self.record_moment(host, DownMoment::EndPlay);

        let line_x = self.state.ball_position.to_x();
        let sacked = carrier.role == CarrierRole::QbRunnerSacking && !team.is_ahead(end_x, line_x);
        if sacked {
            carrier.role = CarrierRole::Sack;
        }
        self.attribute_carry(host, &carrier, player, end_x);

        if !tacklers.is_empty() {
            let category = if sacked {
                StatCategory::Sacks
            } else {
                StatCategory::Tackles
            };
            for t in tacklers {
                self.credit(t, category, 1);
            }
            let verb = if sacked { "Sacked" } else { "Tackled" };
            announce(
                host,
                format!("🛑 {} by {} at {} {}", verb, names(tacklers), spot.team, spot.yards),
                Color::DeepSkyBlue,
            );
        }

        if self.state.conversion {
            self.reset_to_kickoff(host, Some(self.state.team_with_ball));
            return;
        }

        if is_in_own_end_zone(player.position, team) {
            if carrier.role == CarrierRole::Intercepter && !self.state.intercept_left_end_zone {
                announce(host, format!("Touchback {}", team), Color::LightGreen);
                self.start_series(host, team, FieldPosition::new(team, scoring::TOUCHBACK_YARDS));
            } else {
                self.score_safety(host, team, tacklers);
            }
            return;
        }

        let scrimmage_play = matches!(self.state.mode, Some(PlayMode::Down) | Some(PlayMode::FakeFieldGoal));
        if scrimmage_play && carrier.role != CarrierRole::Intercepter {
            self.set_down(host, DownSetup::new().at(spot));
        } else {
            self.start_series(host, team, spot);
        }
    }

    /// Yardage of a finished carry, by how the carrier got the ball
    fn attribute_carry(&mut self, host: &dyn Host, carrier: &Carrier, player: &PlayerInfo, end_x: f32) {
        let sign = carrier.team.attack_sign();
        let gained = FieldPosition::gain(self.state.ball_position, FieldPosition::from_x(end_x), carrier.team);
        let carried = ((end_x - carrier.initial_position.x) * sign / field::YARD).round() as i32;

        match carrier.role {
            CarrierRole::Receiver => {
                self.credit(player, StatCategory::ReceivingYards, gained);
                self.credit(player, StatCategory::YardsAfterCatch, carried);
                if let Some(qb) = self.state.quarterback {
                    self.credit_id(host, qb, StatCategory::PassingYards, gained);
                }
            }
            CarrierRole::Runner => self.credit(player, StatCategory::RushingYards, gained),
            CarrierRole::QbRunner | CarrierRole::QbRunnerSacking | CarrierRole::Sack => {
                self.credit(player, StatCategory::QbRushingYards, gained)
            }
            CarrierRole::PuntReturner | CarrierRole::KickoffReturner => {
                self.credit(player, StatCategory::ReturnYards, carried);
                self.credit(player, StatCategory::Returns, 1);
            }
            CarrierRole::Intercepter => self.credit(player, StatCategory::ReturnYards, carried),
        }
    }

    /// Touchdown for `team`. Outside a try this sets up the try; during one it
    /// scores the conversion and the scoring team kicks off.
    pub(crate) fn score_touchdown(&mut self, host: &mut dyn Host, team: Team, scorer: Option<&PlayerInfo>) {
        if self.state.conversion {
            self.add_points(team, scoring::CONVERSION);
            announce(
                host,
                format!("✅ Conversion good for {} • {}", team, self.state.score_line()),
                Color::Gold,
            );
            self.state.mode = None;
            self.reset(host);
            self.timers.start(
                TimerSlot::KickoffReset,
                clock::SCORE_RESET_MS,
                TimedAction::Kickoff { team },
            );
            return;
        }

        self.add_points(team, scoring::TOUCHDOWN);
        if let Some(player) = scorer {
            self.credit(player, StatCategory::Touchdowns, 1);
            announce(
                host,
                format!("🎉 TOUCHDOWN {} by {}! {}", team, player.name, self.state.score_line()),
                Color::Gold,
            );
        } else {
            announce(
                host,
                format!("🎉 TOUCHDOWN {}! {}", team, self.state.score_line()),
                Color::Gold,
            );
        }
        info!("Touchdown {}", team);

        self.state.mode = None;
        self.reset(host);
        self.reset_play();
        self.hide_markers(host);
        self.state.mode = Some(PlayMode::ExtraPoint);
        self.state.team_with_ball = team;
        self.timers.start(
            TimerSlot::TouchdownTry,
            clock::SCORE_RESET_MS,
            TimedAction::ExtraPoint { team },
        );
    }

    /// `conceding` was downed in its own end zone
    pub(crate) fn score_safety(&mut self, host: &mut dyn Host, conceding: Team, tacklers: &[PlayerInfo]) {
        let scoring_team = conceding.opponent();
        self.add_points(scoring_team, scoring::SAFETY);
        for t in tacklers {
            self.credit(t, StatCategory::Safeties, 1);
        }
        announce(
            host,
            format!("🚨 SAFETY! {} scores {} • {}", scoring_team, scoring::SAFETY, self.state.score_line()),
            Color::Gold,
        );
        info!("Safety conceded by {}", conceding);

        self.state.mode = None;
        self.reset(host);
        self.reset_play();
        self.hide_markers(host);
        self.timers.start(
            TimerSlot::KickoffReset,
            clock::SCORE_RESET_MS,
            TimedAction::SafetyKick { team: conceding },
        );
    }

    /// First and 20 for `team` at `spot`
    pub(crate) fn start_series(&mut self, host: &mut dyn Host, team: Team, spot: FieldPosition) {
        let spot = FieldPosition::from_absolute(spot.absolute().clamp(1, 2 * field::MIDFIELD_YARDS - 1));
        let s = &mut self.state;
        s.down_count = 0;
        s.distance = scrimmage::FIRST_DOWN_DISTANCE;
        s.goal_mode = false;
        s.red_zone_penalties = 0;
        s.conversion = false;
        s.team_with_ball = team;
        self.set_down(host, DownSetup::new().at(spot).for_team(team).keep_distance());
    }
}
