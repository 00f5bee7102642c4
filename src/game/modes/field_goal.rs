//! Field goal attempts
//!
//! The kicker gets one timer for the whole attempt. Before the kick the
//! attempt can fail on contact, on a displaced ball or a kicker wandering
//! off, or turn into a fake when the kicker runs past the ball. After the
//! kick the projected path decides whether it can still be good.

use tracing::info;

use crate::game::constants::{field, field_goal, scrimmage};
use crate::game::engine::{announce, names, players_of, Game, PlayerList};
use crate::game::geometry::{ball_passed_posts, edge_distance, projection_hits, target_posts};
use crate::game::host::{BodyRef, Color, Host, PlayerId, PlayerInfo};
use crate::game::state::{CarrierRole, PlayMode};
use crate::game::stats::StatCategory;
use crate::game::timer::{DownSetup, TimedAction, TimerSlot};
use crate::util::vec2::Vec2;

/// Per-attempt scratch state, cleared by every reset
#[derive(Debug, Clone, Default)]
pub struct FieldGoalState {
    pub kicker: Option<PlayerId>,
    pub set_tick: u64,
    /// The attempt is already lost; waiting for possession to flip
    pub failed: bool,
    /// First tick the ball left its placement
    pub ball_moved_tick: Option<u64>,
    /// Down and distance before the attempt, restored by a fake
    pub saved_down: Option<(u8, i32)>,
}

impl Game {
    /// Line up a field goal from the current line of scrimmage
    pub(crate) fn set_field_goal(&mut self, host: &mut dyn Host, kicker: &PlayerInfo) {
        let team = self.state.team_with_ball;
        let spot = self.state.ball_position;
        let saved = (self.state.down_count, self.state.distance);

        self.state.mode = None;
        self.reset(host);
        self.reset_play();
        self.state.team_with_ball = team;
        self.state.ball_position = spot;
        self.state.down_count = 0;
        self.state.distance = scrimmage::FIRST_DOWN_DISTANCE;
        self.field_goal.kicker = Some(kicker.id);
        self.field_goal.saved_down = Some(saved);

        announce(
            host,
            format!(
                "🥅 Field goal {} • {:.0}s to kick",
                team, self.config.field_goal_time_limit_seconds
            ),
            Color::LightGreen,
        );

        let ball = spot.to_point(0.0);
        self.place_ball(host, ball);
        self.unlock_ball(host);
        self.hide_markers(host);

        let sign = team.attack_sign();
        let offense_x = (ball.x + field_goal::OFFENSE_YARDS * field::YARD * sign)
            .clamp(-field_goal::OFFENSE_MAX_X, field_goal::OFFENSE_MAX_X);
        let defense_x = (ball.x + field_goal::DEFENSE_YARDS * field::YARD * sign)
            .clamp(-field_goal::DEFENSE_MAX_X, field_goal::DEFENSE_MAX_X);
        let kicking: Vec<PlayerInfo> = players_of(host, team)
            .into_iter()
            .filter(|p| p.id != kicker.id)
            .collect();
        let (kicking, _) = Self::split_outside_field(kicking);
        let (defense, _) = Self::split_outside_field(players_of(host, team.opponent()));
        self.spread_line(host, &kicking, offense_x, field_goal::LINE_LENGTH);
        self.spread_line(host, &defense, defense_x, field_goal::LINE_LENGTH);

        let kicker_body = BodyRef::Player(kicker.id);
        host.set_position(kicker_body, Vec2::new(kicker.position.x, field_goal::KICKER_Y));
        host.set_velocity(kicker_body, Vec2::ZERO);

        self.state.mode = Some(PlayMode::FieldGoal);
        self.field_goal.set_tick = self.state.tick_count;
        let limit_ms = (self.config.field_goal_time_limit_seconds * 1000.0) as u64;
        self.timers.start(TimerSlot::FieldGoalClock, limit_ms, TimedAction::FieldGoalExpired);
        info!("Field goal set for {} at {} {} by {}", team, spot.team, spot.yards, kicker.name);
    }

    pub(crate) fn tick_field_goal(&mut self, host: &mut dyn Host) {
        if self.field_goal.failed {
            return;
        }
        let Some(ball) = host.ball() else {
            return;
        };

        if self.state.qb_kicked_ball {
            if ball_passed_posts(ball.position, self.state.team_with_ball) {
                self.field_goal_good(host);
            } else if ball.speed() < field_goal::MISS_SPEED {
                announce(host, "❌ Field goal no good, the ball stopped", Color::Yellow);
                self.field_goal_missed(host, field_goal::FOUL_RESET_MS);
            }
            return;
        }

        let Some(kicker) = self.field_goal.kicker.and_then(|id| host.player(id)) else {
            return;
        };
        let team = self.state.team_with_ball;

        let toucher = host
            .players()
            .into_iter()
            .filter(|p| p.team.is_playing() && p.id != kicker.id)
            .find(|p| p.distance_to(&ball) < field_goal::TOUCH_DISTANCE);
        if let Some(player) = toucher {
            if player.team == team {
                self.field_goal_illegal_touch(host, &player);
            } else {
                self.field_goal_tackle(host, &kicker, &[player]);
            }
            return;
        }

        let spot = self.state.ball_position.to_point(0.0);
        if self.field_goal.ball_moved_tick.is_none() && ball.position != spot {
            self.field_goal.ball_moved_tick = Some(self.state.tick_count);
        }

        let tacklers: PlayerList = players_of(host, team.opponent())
            .into_iter()
            .filter(|p| p.distance_to_player(&kicker) < field_goal::TACKLE_DISTANCE)
            .collect();
        if !tacklers.is_empty() {
            self.field_goal_tackle(host, &kicker, &tacklers);
            return;
        }

        if self.ball_drifted(ball.position, ball.radius) {
            self.credit(&kicker, StatCategory::FieldGoalsMissed, 1);
            announce(host, "🚩 The ball was moved before the field goal kick", Color::Orange);
            self.field_goal_turnover(host);
            return;
        }

        let sign = team.attack_sign();
        let behind = (ball.position.x - kicker.position.x) * sign;
        if behind > field_goal::MAX_KICKER_BACK_YARDS * field::YARD {
            announce(host, format!("⚠️ {} is too far from the ball", kicker.name), Color::Yellow);
            self.field_goal_missed(host, field_goal::FOUL_RESET_MS);
            return;
        }

        if team.is_ahead(kicker.position.x, ball.position.x) {
            if self.state.tick_count.saturating_sub(self.field_goal.set_tick) < field_goal::NO_RUSH_TICKS {
                announce(
                    host,
                    format!("🚩 {} ran before the field goal could be kicked", kicker.name),
                    Color::Orange,
                );
                self.field_goal_turnover(host);
            } else {
                self.fake_field_goal(host, &kicker);
            }
        }
    }

    /// The ball left its placement too far, or for too long
    fn ball_drifted(&self, position: Vec2, radius: f32) -> bool {
        let spot = self.state.ball_position.to_point(0.0);
        if edge_distance(position, radius, spot, radius) > field_goal::MAX_BALL_DRIFT {
            return true;
        }
        let limit = self
            .config
            .seconds_to_ticks(field_goal::MAX_BALL_DRIFT_MS as f32 / 1000.0);
        self.field_goal
            .ball_moved_tick
            .is_some_and(|moved| self.state.tick_count.saturating_sub(moved) > limit)
    }

    pub(crate) fn field_goal_kick(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        if self.field_goal.failed {
            return;
        }
        self.timers.stop(TimerSlot::FieldGoalClock);

        if self.field_goal.kicker != Some(player.id) {
            self.field_goal_illegal_touch(host, player);
            return;
        }
        if self.state.qb_kicked_ball {
            announce(host, "🚩 The ball was kicked twice on the field goal", Color::Orange);
            self.field_goal_turnover(host);
            return;
        }

        self.state.qb_kicked_ball = true;
        self.lock_ball(host);
        self.set_ball_kickable(host, false);
        let origin = self.state.ball_position.to_point(0.0);
        self.timers.start(
            TimerSlot::FieldGoalDetect,
            0,
            TimedAction::DetectFieldGoal { origin },
        );
    }

    /// Project the kick from `origin` through the ball's current position.
    /// A path missing the posts is ruled no good right away.
    pub(crate) fn detect_field_goal(&mut self, host: &mut dyn Host, origin: Vec2) {
        if self.field_goal.failed || self.state.mode != Some(PlayMode::FieldGoal) {
            return;
        }
        let Some(ball) = host.ball() else {
            return;
        };
        let posts = target_posts(self.state.team_with_ball, self.config.goal_line_tolerance);
        if projection_hits(origin, ball.position, self.config.projection_horizon, posts).is_some() {
            return;
        }
        announce(host, "❌ Field goal no good, it will not reach the posts", Color::Yellow);
        self.field_goal_missed(host, field_goal::FAILED_RESET_MS);
    }

    pub(crate) fn field_goal_expired(&mut self, host: &mut dyn Host) {
        if self.state.mode != Some(PlayMode::FieldGoal) {
            return;
        }
        announce(host, "⏰ Took too long to kick the field goal", Color::Orange);
        self.field_goal_turnover(host);
    }

    fn field_goal_good(&mut self, host: &mut dyn Host) {
        let team = self.state.team_with_ball;
        let yards = self.state.ball_position.yards_to_end_zone(team) + field::END_ZONE_YARDS;
        if let Some(kicker) = self.field_goal.kicker {
            self.credit_id(host, kicker, StatCategory::FieldGoalsMade, 1);
            self.credit_id(host, kicker, StatCategory::FieldGoalYards, yards);
        }
        self.add_points(team, field_goal::POINTS);
        announce(
            host,
            format!(
                "🙌 FIELD GOAL {} from {} yards! +{} • {}",
                team,
                yards,
                field_goal::POINTS,
                self.state.score_line()
            ),
            Color::LimeGreen,
        );
        info!("Field goal by {} from {} yards", team, yards);
        self.reset_to_kickoff(host, Some(team));
    }

    /// Kicked and no good. Possession flips after `delay_ms`.
    fn field_goal_missed(&mut self, host: &mut dyn Host, delay_ms: u64) {
        if let Some(kicker) = self.field_goal.kicker {
            self.credit_id(host, kicker, StatCategory::FieldGoalsMissed, 1);
        }
        self.state.mode = None;
        self.schedule_field_goal_turnover(delay_ms);
    }

    fn field_goal_tackle(&mut self, host: &mut dyn Host, kicker: &PlayerInfo, tacklers: &[PlayerInfo]) {
        self.field_goal.failed = true;
        self.credit(kicker, StatCategory::FieldGoalsMissed, 1);
        for t in tacklers {
            self.credit(t, StatCategory::Tackles, 1);
            self.credit(t, StatCategory::Sacks, 1);
        }
        announce(
            host,
            format!("💪 Kicker {} tackled by {}", kicker.name, names(tacklers)),
            Color::LimeGreen,
        );
        self.schedule_field_goal_turnover(field_goal::FOUL_RESET_MS);
    }

    fn field_goal_illegal_touch(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        self.field_goal.failed = true;
        let team = self.state.team_with_ball;
        if player.team == team {
            announce(
                host,
                format!("🤡 {} touched the held ball, the field goal attempt fails", player.name),
                Color::LimeGreen,
            );
        } else {
            let kicker = self
                .field_goal
                .kicker
                .and_then(|id| host.player(id))
                .map(|k| k.name)
                .unwrap_or_default();
            announce(
                host,
                format!("💪 Kicker {} stopped by {}", kicker, player.name),
                Color::LimeGreen,
            );
        }
        self.schedule_field_goal_turnover(field_goal::FAILED_RESET_MS);
    }

    fn schedule_field_goal_turnover(&mut self, delay_ms: u64) {
        let setup = DownSetup::new().for_team(self.state.team_with_ball.opponent());
        self.timers.start(TimerSlot::FailedFieldGoal, delay_ms, TimedAction::SetDown(setup));
    }

    /// First down for the defense at the spot of the attempt
    fn field_goal_turnover(&mut self, host: &mut dyn Host) {
        self.field_goal.failed = true;
        let defense = self.state.team_with_ball.opponent();
        self.set_down(host, DownSetup::new().for_team(defense));
    }

    /// The kicker runs with the ball: a scramble with the down it replaced
    fn fake_field_goal(&mut self, host: &mut dyn Host, kicker: &PlayerInfo) {
        let team = self.state.team_with_ball;
        let spot = self.state.ball_position;
        let (down, distance) = self
            .field_goal
            .saved_down
            .unwrap_or((1, scrimmage::FIRST_DOWN_DISTANCE));

        self.state.mode = None;
        self.reset(host);
        self.state.mode = Some(PlayMode::FakeFieldGoal);
        self.state.team_with_ball = team;
        self.state.ball_position = spot;
        self.state.quarterback = Some(kicker.id);
        self.state.down_count = down;
        self.state.distance = distance;
        self.update_markers(host);

        announce(host, format!("🏃 {} runs with the ball!", kicker.name), Color::DeepSkyBlue);
        self.set_carrier(host, kicker, CarrierRole::QbRunner, true);
        info!("Fake field goal by {} ({} & {})", kicker.name, down, distance);
    }
}
