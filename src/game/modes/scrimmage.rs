//! Scrimmage downs
//!
//! Setting a down, the hike, and everything inferred while the ball is live
//! after the snap. The phase of a live down is never stored: every tick
//! derives it from the quarterback, pass and carrier fields, so a skipped or
//! paused tick cannot leave it stale.

use tracing::{debug, info};

use crate::game::commands::CommandError;
use crate::game::constants::{field, field_goal, physics, scoring, scrimmage};
use crate::game::down_info::{DownInfo, DownMoment};
use crate::game::engine::{announce, names, players_of, touching_ball, Game, PlayerList};
use crate::game::geometry::{goal_line, is_out_of_bounds, projection_hits, FieldPosition};
use crate::game::host::{Announcement, Body, Color, Host, PlayerId, PlayerInfo};
use crate::game::state::{CarrierRole, PlayMode, Team};
use crate::game::stats::StatCategory;
use crate::game::timer::{DownSetup, TimedAction, TimerSlot};
use crate::util::vec2::Vec2;

/// Per-down scratch state, cleared by every reset
#[derive(Debug, Clone, Default)]
pub struct ScrimmageState {
    /// Where the ball was placed for the snap
    pub ball_initial_position: Option<Vec2>,
    /// A defender got to the quarterback before the pass. Stays set through a
    /// pass thrown under pressure until a receiver catches it.
    pub sack: bool,
    /// The pass thrown under pressure died (defender, sideline or stalled)
    pub sack_ball_touched: bool,
    pub down_set_tick: u64,
    pub carrier_in_advantage: bool,
    /// Defender sitting on the pass
    pub defender_blocking: Option<PlayerId>,
    /// x sign of the goal line a surviving deflection travels to (0 while unchecked)
    pub intercept_direction: f32,
    pub down_info: Option<DownInfo>,
}

fn down_label(down: u8) -> &'static str {
    match down {
        1 => "1st down",
        2 => "2nd down",
        3 => "3rd down",
        _ => "4th down",
    }
}

impl Game {
    // === Setting a down ===

    /// Set the next down. Penalties, incompletions, tackles and turnovers all
    /// end up here.
    pub(crate) fn set_down(&mut self, host: &mut dyn Host, setup: DownSetup) {
        let was_live = self.state.mode == Some(PlayMode::Down);
        let conversion = self.state.conversion;
        let count_down = setup.count_down && !conversion;
        let count_distance = setup.count_distance_from_new_pos && !conversion;
        let offense = self.state.team_with_ball;
        let mut for_team = setup.for_team.unwrap_or(offense);

        self.state.mode = None;
        self.reset(host);
        self.state.conversion = conversion;

        if let Some(pos) = setup.pos {
            if count_distance {
                self.state.distance -= FieldPosition::gain(self.state.ball_position, pos, offense);
            }
            let spot = pos.absolute().clamp(1, 2 * field::MIDFIELD_YARDS - 1);
            self.state.ball_position = FieldPosition::from_absolute(spot);
        }
        if let Some(yards) = setup.decrement {
            let spot = self
                .state
                .ball_position
                .advanced(yards, offense)
                .absolute()
                .clamp(1, 2 * field::MIDFIELD_YARDS - 1);
            self.state.ball_position = FieldPosition::from_absolute(spot);
            self.state.distance -= yards;
        }

        self.update_red_zone(for_team);

        let mut gained = false;
        if self.state.distance <= 0 && !self.state.goal_mode {
            self.state.distance = scrimmage::FIRST_DOWN_DISTANCE;
            self.state.down_count = 0;
            gained = was_live;
        }

        let headline = if conversion {
            self.state.down_count = 4;
            self.state.distance = scoring::CONVERSION_YARDS;
            self.state.goal_mode = true;
            format!("{} conversion attempt", for_team)
        } else if self.state.down_count == 0 {
            self.state.down_count = 1;
            self.state.goal_mode = self.state.in_red_zone;
            if gained {
                format!("Gained {} yards! First down {}", scrimmage::FIRST_DOWN_DISTANCE, for_team)
            } else {
                format!("First down {}", for_team)
            }
        } else if self.state.down_count >= 4 && count_down {
            let previous = for_team;
            for_team = for_team.opponent();
            self.state.down_count = 1;
            self.state.distance = scrimmage::FIRST_DOWN_DISTANCE;
            self.state.red_zone_penalties = 0;
            self.update_red_zone(for_team);
            self.state.goal_mode = self.state.in_red_zone;
            format!("Turnover on downs by {}. First down {}", previous, for_team)
        } else {
            if count_down {
                self.state.down_count += 1;
            }
            down_label(self.state.down_count).to_string()
        };

        if self.state.goal_mode && !conversion {
            self.state.distance = self.state.ball_position.yards_to_end_zone(for_team).max(1);
        }

        let to_end_zone = self.state.ball_position.yards_to_end_zone(for_team);
        let ceiling = scrimmage::AUTO_PUNT_MAX_DISTANCE[usize::from(self.state.down_count.clamp(1, 4) - 1)];
        if count_distance
            && !self.state.goal_mode
            && self.state.distance > ceiling
            && to_end_zone > field_goal::MAX_SAFE_DISTANCE_YARDS
        {
            announce(
                host,
                format!("🤾 {} • Automatic punt for {}", self.state.state_of_match(), for_team),
                Color::LightGreen,
            );
            self.state.team_with_ball = for_team;
            info!("Automatic punt for {} at {}", for_team, self.state.state_of_match());
            self.set_punt(host, for_team, false, scrimmage::AUTO_PUNT_KICK_TICKS);
            return;
        }

        if !setup.silent {
            let message = format!(
                "🏈 {} • {} • {}",
                self.state.state_of_match(),
                headline,
                self.hike_clock_note(for_team)
            );
            announce(host, message, Color::LightGreen);
        }

        self.state.team_with_ball = for_team;
        self.state.mode = Some(PlayMode::WaitingHike);
        self.scrimmage.down_set_tick = self.state.tick_count;

        self.place_ball_for_hike(host);
        self.reposition_evenly(host);
        self.update_markers(host);
        self.scrimmage.down_info = Some(DownInfo::new());
        self.arm_hike_timer(host);

        self.metric(|m| m.record_down());
        info!("Down set for {}: {}", for_team, self.state.state_of_match());
    }

    fn update_red_zone(&mut self, for_team: Team) {
        self.state.in_red_zone = self.state.ball_position.is_in_red_zone(for_team.opponent());
        if !self.state.in_red_zone {
            self.state.goal_mode = false;
        }
    }

    fn hike_clock_note(&self, team: Team) -> String {
        if !self.state.hike_timer_enabled {
            return "Hike clock off".to_string();
        }
        format!("{} has {:.0}s to hike", team, self.hike_deadline_seconds())
    }

    fn hike_deadline_seconds(&self) -> f32 {
        if self.state.conversion {
            self.config.conversion_deadline_seconds
        } else {
            self.config.snap_deadline_seconds
        }
    }

    /// Ball rests a little behind the line, locked until the snap
    fn place_ball_for_hike(&mut self, host: &mut dyn Host) {
        let sign = self.state.team_with_ball.attack_sign();
        let x = self.state.ball_position.to_x() - scrimmage::YARDS_BALL_BEHIND * field::YARD * sign;
        let spot = Vec2::new(x, 0.0);
        self.place_ball(host, spot);
        self.lock_ball(host);
        self.make_players_weightless(host);
        self.scrimmage.ball_initial_position = Some(spot);
    }

    pub(crate) fn arm_hike_timer(&mut self, host: &dyn Host) {
        if host.is_paused() || !self.state.hike_timer_enabled {
            return;
        }
        let delay_ms = (self.hike_deadline_seconds() * 1000.0) as u64;
        self.timers.start(
            TimerSlot::Hike,
            delay_ms,
            TimedAction::HikeExpired {
                team: self.state.team_with_ball,
            },
        );
    }

    pub(crate) fn hike_expired(&mut self, host: &mut dyn Host, team: Team) {
        if self.state.mode != Some(PlayMode::WaitingHike) {
            return;
        }
        if self.state.conversion {
            announce(host, "⏱️ Took too long to attempt the conversion", Color::Orange);
            self.reset_to_kickoff(host, Some(team));
            return;
        }
        announce(host, "⏱️ Took too long to hike, the down is lost", Color::Orange);
        self.set_down(host, DownSetup::new());
    }

    // === Hike ===

    /// Snap the ball. Accepted from a player of the team with the ball close
    /// enough to it, with nobody of his team past the line.
    pub(crate) fn hike(&mut self, host: &mut dyn Host, player: &PlayerInfo) -> Result<(), CommandError> {
        if self.state.mode != Some(PlayMode::WaitingHike) {
            return Err(CommandError::NotNow("the down is not set"));
        }
        if !host.is_match_in_progress() {
            return Err(CommandError::NotInProgress);
        }
        if host.is_paused() {
            return Err(CommandError::Paused);
        }
        let team = self.state.team_with_ball;
        if player.team != team {
            return Err(CommandError::NotInPossession);
        }
        let ball = host.ball().ok_or(CommandError::NotNow("there is no ball"))?;
        if player.distance_to(&ball) > scrimmage::HIKE_DISTANCE {
            return Err(CommandError::TooFarFromBall);
        }

        let line_x = self.state.ball_position.to_x();
        if team.is_ahead(player.position.x, line_x) {
            if self.state.conversion {
                self.set_extra_point(host, team, true);
            }
            return Err(CommandError::HikerOffside);
        }

        let offside: Vec<PlayerInfo> = players_of(host, team)
            .into_iter()
            .filter(|p| team.is_ahead(p.position.x, line_x))
            .collect();
        if !offside.is_empty() {
            let list = names(&offside);
            host.announce(&Announcement::warning(
                format!("🚫 {} cannot hike, {} past the line of scrimmage", team, list),
                Color::Tomato,
            ));
            for p in &offside {
                host.whisper(
                    p.id,
                    &Announcement::warning("Get behind the line of scrimmage before the hike", Color::Red),
                );
            }
            if self.state.conversion {
                self.set_extra_point(host, team, true);
            }
            return Err(CommandError::TeammatesOffside(list));
        }

        self.state.quarterback = Some(player.id);
        self.state.mode = Some(PlayMode::Down);
        self.unlock_ball(host);
        self.make_players_pushable(host);
        self.state.hike_tick = self.state.tick_count;
        self.timers.stop(TimerSlot::Hike);
        self.timers.stop(TimerSlot::TouchdownTry);

        announce(host, "🏈 Hike!", Color::MediumSeaGreen);
        info!("{} hiked for {}", player.name, team);
        Ok(())
    }

    // === Live down ===

    pub(crate) fn tick_down(&mut self, host: &mut dyn Host) {
        let Some(ball) = host.ball() else {
            return;
        };
        if self.state.intercept_attempt.is_some() {
            self.track_interception(host, &ball);
            return;
        }

        match self.state.carrier_role() {
            None if !self.state.qb_kicked_ball => {
                if let Some(quarterback) = self.state.quarterback.and_then(|id| host.player(id)) {
                    self.after_hike_before_kick(host, &ball, &quarterback);
                }
            }
            None => self.after_kick_before_catch(host, &ball),
            Some(CarrierRole::QbRunnerSacking)
                if self.state.qb_kicked_ball && !self.scrimmage.sack_ball_touched =>
            {
                self.after_kick_before_catch(host, &ball);
                if self.state.carrier_role() == Some(CarrierRole::QbRunnerSacking) {
                    self.tick_carrier(host);
                }
            }
            Some(role) => {
                let offense_carry = matches!(
                    role,
                    CarrierRole::Receiver | CarrierRole::Runner | CarrierRole::QbRunner
                );
                if offense_carry && !self.scrimmage.carrier_in_advantage {
                    self.check_advantage(host);
                }
                self.tick_carrier(host);
            }
        }
    }

    fn after_hike_before_kick(&mut self, host: &mut dyn Host, ball: &Body, qb: &PlayerInfo) {
        let team = self.state.team_with_ball;
        let line_x = self.state.ball_position.to_x();
        let hike_over = self.is_hike_time_over();

        if self.state.qb_carried_ball_tick.is_none() {
            if let Some(initial) = self.scrimmage.ball_initial_position {
                if ball.position.distance_to(initial) > scrimmage::BALL_MOVED_DISTANCE {
                    self.state.qb_carried_ball_tick = Some(self.state.tick_count);
                }
            }
        }

        if team.is_ahead(qb.position.x, line_x) {
            if hike_over {
                self.qb_run(host, qb);
            } else {
                self.qb_crossed_line(host, qb);
            }
            return;
        }

        if hike_over && qb.distance_to(ball) > scrimmage::QB_RUN_DISTANCE {
            self.qb_run(host, qb);
            return;
        }

        let others: Vec<PlayerInfo> = host
            .players()
            .into_iter()
            .filter(|p| p.team.is_playing() && p.id != qb.id)
            .collect();
        if let Some(toucher) = touching_ball(&others, ball, physics::CONTACT_DISTANCE).cloned() {
            self.touch_during_hike(host, &toucher);
            return;
        }

        if team.is_ahead(ball.position.x, line_x) {
            self.credit(qb, StatCategory::Penalties, 1);
            self.metric(|m| m.record_penalty());
            self.lose_down(host, "Ball crossed the line of scrimmage");
            return;
        }

        if is_out_of_bounds(ball.position, -ball.radius) {
            self.lose_down(host, "Ball out of bounds");
            return;
        }

        if let Some(runner) = others
            .iter()
            .find(|p| p.team == team && p.distance_to_player(qb) <= scrimmage::HANDOFF_DISTANCE)
            .cloned()
        {
            self.handoff(host, &runner);
            return;
        }

        if !hike_over {
            let holders = self.holding_players(host, qb, line_x);
            if !holders.is_empty() {
                self.holding(host, &holders);
                return;
            }
        }

        let trespasser = players_of(host, team.opponent())
            .into_iter()
            .find(|p| team.is_ahead(line_x, p.position.x));
        if let Some(defender) = trespasser {
            if hike_over {
                self.sack_attempt(host, qb, &defender);
            } else {
                self.defensive_foul(
                    host,
                    &[defender],
                    scrimmage::TRESPASSING_PENALTY,
                    "Blitz before the hike clock",
                    true,
                );
            }
            return;
        }

        if !hike_over {
            self.check_invasion(host);
        }
    }

    /// Offensive players dragging a defender who crossed the line back with them
    fn holding_players(&self, host: &dyn Host, qb: &PlayerInfo, line_x: f32) -> PlayerList {
        let team = self.state.team_with_ball;
        let sign = team.attack_sign();
        let offense = players_of(host, team);
        let mut holders = PlayerList::new();

        for defender in players_of(host, team.opponent()) {
            if !team.is_ahead(line_x, defender.position.x) {
                continue;
            }
            if defender.velocity.x * sign >= 0.0 {
                continue;
            }
            for attacker in &offense {
                let holding = attacker.id != qb.id
                    && attacker.distance_to_player(&defender) < scrimmage::HOLDING_DISTANCE
                    && team.is_ahead(attacker.position.x, defender.position.x)
                    && attacker.velocity.x * sign < 0.0;
                if holding && !holders.iter().any(|h: &PlayerInfo| h.id == attacker.id) {
                    holders.push(attacker.clone());
                }
            }
        }
        holders
    }

    fn holding(&mut self, host: &mut dyn Host, holders: &[PlayerInfo]) {
        for p in holders {
            self.credit(p, StatCategory::Penalties, 1);
        }
        self.metric(|m| m.record_penalty());
        if self.state.conversion {
            announce(host, format!("🚩 Holding by {}", names(holders)), Color::Orange);
            self.reset_to_kickoff(host, None);
            return;
        }
        announce(
            host,
            format!(
                "🚩 Holding by {} • -{} yards",
                names(holders),
                scrimmage::HOLDING_PENALTY.abs()
            ),
            Color::Orange,
        );
        self.set_down(host, DownSetup::new().decrement(scrimmage::HOLDING_PENALTY));
    }

    fn qb_crossed_line(&mut self, host: &mut dyn Host, qb: &PlayerInfo) {
        self.credit(qb, StatCategory::Penalties, 1);
        self.metric(|m| m.record_penalty());
        let elapsed = self.time_since_hike();
        if self.state.conversion {
            announce(
                host,
                format!("🚩 Quarterback crossed the line after {}", elapsed),
                Color::Orange,
            );
            self.reset_to_kickoff(host, None);
            return;
        }
        announce(
            host,
            format!(
                "🚩 Quarterback crossed the line after {} • -{} yards",
                elapsed,
                scrimmage::QB_PASSED_LINE_PENALTY.abs()
            ),
            Color::Orange,
        );
        self.set_down(host, DownSetup::new().decrement(scrimmage::QB_PASSED_LINE_PENALTY));
    }

    fn qb_run(&mut self, host: &mut dyn Host, qb: &PlayerInfo) {
        self.capture_defense_y(host);
        self.set_carrier(host, qb, CarrierRole::QbRunner, true);
        self.credit(qb, StatCategory::QbRuns, 1);
        announce(host, format!("🏃 Quarterback run by {}", qb.name), Color::DeepSkyBlue);
    }

    fn handoff(&mut self, host: &mut dyn Host, runner: &PlayerInfo) {
        self.capture_defense_y(host);
        self.set_carrier(host, runner, CarrierRole::Runner, true);
        self.credit(runner, StatCategory::Runs, 1);
        announce(host, format!("🏃 Run by {}", runner.name), Color::DeepSkyBlue);
    }

    fn sack_attempt(&mut self, host: &mut dyn Host, qb: &PlayerInfo, defender: &PlayerInfo) {
        self.set_carrier(host, qb, CarrierRole::QbRunnerSacking, true);
        self.scrimmage.sack = true;
        announce(
            host,
            format!("💥 Sack attempt by {} on {}", defender.name, qb.name),
            Color::DeepSkyBlue,
        );
    }

    /// Down lost without a penalty (incomplete, ball out, ball over the line)
    fn lose_down(&mut self, host: &mut dyn Host, reason: &str) {
        if self.state.conversion {
            announce(host, format!("❌ {}", reason), Color::Orange);
            self.reset_to_kickoff(host, None);
            return;
        }
        announce(host, format!("❌ {} • Down lost", reason), Color::Orange);
        self.set_down(host, DownSetup::new());
    }

    /// A player other than the quarterback touched the ball before the pass
    pub(crate) fn touch_during_hike(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        let team = self.state.team_with_ball;
        let waiting = self.state.mode == Some(PlayMode::WaitingHike);

        if player.team != team {
            if waiting || !self.is_hike_time_over() {
                self.defensive_foul(
                    host,
                    std::slice::from_ref(player),
                    scrimmage::ILLEGAL_TOUCH_PENALTY,
                    "Illegal touch",
                    !waiting,
                );
            } else if let Some(qb) = self.state.quarterback.and_then(|id| host.player(id)) {
                self.sack_attempt(host, &qb, player);
            }
            return;
        }

        if self.state.quarterback.is_none() {
            return;
        }
        self.credit(player, StatCategory::Penalties, 1);
        self.metric(|m| m.record_penalty());
        if self.state.conversion {
            announce(host, format!("🚩 Illegal touch by {}", player.name), Color::Orange);
            self.reset_to_kickoff(host, None);
            return;
        }
        announce(
            host,
            format!(
                "🚩 Illegal touch by {} • -{} yards",
                player.name,
                scrimmage::OFFENSE_ILLEGAL_TOUCH_PENALTY.abs()
            ),
            Color::Orange,
        );
        self.set_down(
            host,
            DownSetup::new().decrement(scrimmage::OFFENSE_ILLEGAL_TOUCH_PENALTY),
        );
    }

    /// Penalize the defense. Inside the red zone the yardage is half the
    /// distance to the goal, and enough repeat fouls award a touchdown.
    pub(crate) fn defensive_foul(
        &mut self,
        host: &mut dyn Host,
        offenders: &[PlayerInfo],
        base: i32,
        label: &str,
        record: bool,
    ) {
        let team = self.state.team_with_ball;
        let who = names(offenders);
        let mut penalty = base;

        if self.state.ball_position.is_in_red_zone(team.opponent()) {
            self.state.red_zone_penalties += 1;
            let max = self.config.max_red_zone_penalties;
            if self.state.red_zone_penalties >= max {
                self.red_zone_touchdown(host, offenders, label);
                return;
            }
            let to_go = self.state.ball_position.yards_to_end_zone(team);
            penalty = (to_go / 2).clamp(1, base.max(1));
            announce(
                host,
                format!(
                    "🚩 {} by {} • red zone foul {}/{} • +{} yards",
                    label, who, self.state.red_zone_penalties, max, penalty
                ),
                Color::Orange,
            );
        } else {
            announce(
                host,
                format!("🚩 {} by {} • +{} yards", label, who, penalty),
                Color::Orange,
            );
        }

        if record {
            for p in offenders {
                self.credit(p, StatCategory::Penalties, 1);
            }
        }
        self.metric(|m| m.record_penalty());
        debug!("Defensive foul ({}) for {} yards", label, penalty);
        self.adjust_time_after_defensive_penalty(host);
        self.set_down(host, DownSetup::new().decrement(penalty).without_count());
    }

    fn red_zone_touchdown(&mut self, host: &mut dyn Host, offenders: &[PlayerInfo], label: &str) {
        let team = self.state.team_with_ball;
        announce(
            host,
            format!(
                "🚩 {} by {} • {} red zone fouls, touchdown awarded to {}",
                label,
                names(offenders),
                self.state.red_zone_penalties,
                team
            ),
            Color::Orange,
        );
        for p in offenders {
            self.credit(p, StatCategory::Penalties, 1);
        }
        self.metric(|m| m.record_penalty());
        self.state.red_zone_penalties = 0;
        self.adjust_time_after_defensive_penalty(host);
        self.score_touchdown(host, team, None);
    }

    // === Pass in the air ===

    /// Ball in the air after a pass. Under a sack the quarterback is still
    /// the carrier, so a dead pass leaves the sack play running instead of
    /// ending the down.
    fn after_kick_before_catch(&mut self, host: &mut dyn Host, ball: &Body) {
        let team = self.state.team_with_ball;
        let quarterback = self.state.quarterback;
        let sacking = self.scrimmage.sack;

        if !self.state.blocked_pass {
            let receivers: Vec<PlayerInfo> = players_of(host, team)
                .into_iter()
                .filter(|p| Some(p.id) != quarterback)
                .collect();
            if let Some(receiver) = touching_ball(&receivers, ball, physics::CONTACT_DISTANCE).cloned() {
                self.receive(host, &receiver);
                return;
            }

            let defenders = players_of(host, team.opponent());
            if let Some(defender) = touching_ball(&defenders, ball, scrimmage::BLOCKING_DISTANCE).cloned() {
                if sacking {
                    self.pass_dead_under_sack(&defender.name);
                    return;
                }
                self.state.blocked_pass = true;
                self.scrimmage.defender_blocking = Some(defender.id);
                self.timers.start(
                    TimerSlot::BlockCheck,
                    scrimmage::BLOCK_CHECK_MS,
                    TimedAction::CheckBlockedPass { player: defender.id },
                );
                return;
            }
        }

        if let Some(defender) = self.scrimmage.defender_blocking.and_then(|id| host.player(id)) {
            if defender.distance_to(ball) > scrimmage::BLOCK_RELEASE_DISTANCE {
                if sacking {
                    self.pass_dead_under_sack(&defender.name);
                } else {
                    self.block_pass(host, &defender, true);
                }
                return;
            }
        }

        if is_out_of_bounds(ball.position, -ball.radius) {
            if sacking {
                self.pass_dead_under_sack("the sideline");
            } else {
                self.lose_down(host, "Incomplete pass, ball out of bounds");
            }
        } else if ball.speed() < scrimmage::INTERCEPTION_FAILED_SPEED {
            if sacking {
                self.pass_dead_under_sack("a stalled ball");
            } else {
                self.lose_down(host, "Incomplete pass");
            }
        }
    }

    fn pass_dead_under_sack(&mut self, cause: &str) {
        self.scrimmage.sack_ball_touched = true;
        debug!("Pass under pressure stopped by {}, sack play goes on", cause);
    }

    fn receive(&mut self, host: &mut dyn Host, receiver: &PlayerInfo) {
        if is_out_of_bounds(receiver.position, 0.0) {
            if self.scrimmage.sack {
                self.pass_dead_under_sack("a catch out of bounds");
            } else {
                self.lose_down(host, "Catch out of bounds");
            }
            return;
        }
        self.catch_pass(host, receiver);
    }

    fn catch_pass(&mut self, host: &mut dyn Host, receiver: &PlayerInfo) {
        self.scrimmage.sack = false;
        self.scrimmage.sack_ball_touched = false;
        self.set_carrier(host, receiver, CarrierRole::Receiver, false);
        self.credit(receiver, StatCategory::Receptions, 1);
        self.credit(receiver, StatCategory::Targets, 1);
        if let Some(qb) = self.state.quarterback {
            self.credit_id(host, qb, StatCategory::Completions, 1);
        }
        self.record_moment(host, DownMoment::Reception);
        announce(host, format!("🙌 Pass caught by {}", receiver.name), Color::LimeGreen);
    }

    /// Pass defended. The next down is set after a short delay.
    pub(crate) fn block_pass(&mut self, host: &mut dyn Host, defender: &PlayerInfo, message: bool) {
        let team = self.state.team_with_ball;
        self.unlock_ball(host);
        self.credit(defender, StatCategory::PassesDefended, 1);
        if message {
            announce(host, format!("🛡️ Pass defended by {}", defender.name), Color::Orange);
        }
        self.state.intercept_attempt = None;
        self.state.mode = None;
        if self.state.conversion {
            self.reset_to_kickoff(host, Some(team));
            return;
        }
        self.timers.start(
            TimerSlot::PassBlockedReset,
            scrimmage::BLOCKED_PASS_RESET_MS,
            TimedAction::SetDown(DownSetup::new()),
        );
    }

    pub(crate) fn check_blocked_pass(&mut self, host: &mut dyn Host, player: PlayerId) {
        if self.state.mode != Some(PlayMode::Down)
            || self.state.intercept_attempt.is_some()
            || self.state.intercept
            || self.state.carrier.is_some()
        {
            return;
        }
        if let Some(defender) = host.player(player) {
            self.block_pass(host, &defender, true);
        }
    }

    /// Carrier has no defender left between him and the goal
    fn check_advantage(&mut self, host: &mut dyn Host) {
        let Some(carrier) = self.state.carrier.as_ref().and_then(|c| host.player(c.id)) else {
            return;
        };
        let team = carrier.team;
        let sign = team.attack_sign();
        let clear = players_of(host, team.opponent()).iter().all(|p| {
            let margin = if p.distance_to_player(&carrier) < p.radius * 2.0 {
                p.radius
            } else {
                0.0
            };
            team.is_ahead(carrier.position.x, p.position.x + margin * sign)
        });
        if clear {
            self.scrimmage.carrier_in_advantage = true;
            self.record_moment(host, DownMoment::Advantage);
            debug!("{} is in the clear", carrier.name);
        }
    }

    /// Kick event while a scrimmage down is set or live
    pub(crate) fn scrimmage_kick(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        if self.state.intercept_attempt.is_some() || self.state.intercept {
            return;
        }
        let team = self.state.team_with_ball;

        match self.state.mode {
            Some(PlayMode::WaitingHike) => {
                let grace_over = self.state.tick_count
                    > self.scrimmage.down_set_tick + scrimmage::ILLEGAL_TOUCH_GRACE_TICKS;
                if !self.state.qb_kicked_ball && player.team.is_playing() && player.team != team && grace_over {
                    self.touch_during_hike(host, player);
                }
            }
            Some(PlayMode::Down) => {
                let is_qb = self.state.quarterback == Some(player.id);
                if !self.state.qb_kicked_ball {
                    if let Some(role) = self.state.carrier_role() {
                        if role != CarrierRole::QbRunnerSacking || !is_qb {
                            return;
                        }
                    }
                    self.capture_defense_y(host);
                    if is_qb {
                        self.state.qb_kicked_ball = true;
                        self.credit(player, StatCategory::PassAttempts, 1);
                        self.record_moment(host, DownMoment::Kick);
                        if self.scrimmage.sack {
                            debug!("{} passed under pressure", player.name);
                        } else {
                            debug!("{} passed", player.name);
                        }
                    } else {
                        self.touch_during_hike(host, player);
                    }
                    return;
                }

                if self.scrimmage.sack {
                    if self.scrimmage.sack_ball_touched || is_qb {
                        return;
                    }
                    if player.team != team {
                        self.pass_dead_under_sack(&player.name);
                    } else {
                        self.receive(host, player);
                    }
                    return;
                }
                if self.state.carrier.is_some() {
                    return;
                }
                if player.team != team {
                    self.start_interception(host, player);
                } else if !is_qb {
                    self.receive(host, player);
                }
            }
            _ => {}
        }
    }

    // === Interception ===

    fn start_interception(&mut self, host: &mut dyn Host, defender: &PlayerInfo) {
        let Some(ball) = host.ball() else {
            return;
        };
        self.state.intercept_attempt = Some(defender.id);
        self.scrimmage.intercept_direction = 0.0;
        self.lock_ball(host);
        let direction = if ball.velocity.x != 0.0 {
            ball.velocity.x.signum()
        } else {
            self.state.team_with_ball.attack_sign()
        };
        self.timers.start(
            TimerSlot::InterceptionCheck,
            0,
            TimedAction::CheckInterception {
                player: defender.id,
                origin: ball.position,
                direction,
            },
        );
        debug!("{} deflected the pass", defender.name);
    }

    /// Project the deflected ball against the goal line it was heading to
    pub(crate) fn check_interception(&mut self, host: &mut dyn Host, player: PlayerId, origin: Vec2, direction: f32) {
        if self.state.mode != Some(PlayMode::Down) || self.state.intercept_attempt != Some(player) {
            return;
        }
        let Some(ball) = host.ball() else {
            return;
        };
        let line = goal_line(direction, self.config.goal_line_tolerance);
        let hit = projection_hits(origin, ball.position, self.config.projection_horizon, line);

        let Some(defender) = host.player(player) else {
            self.state.intercept_attempt = None;
            self.lose_down(host, "Incomplete pass");
            return;
        };
        if hit.is_none() {
            debug!("Deflection by {} misses the goal line", defender.name);
            self.state.intercept_attempt = None;
            self.block_pass(host, &defender, true);
            return;
        }

        self.scrimmage.intercept_direction = direction;
        let damping = if ball.speed() < scrimmage::INTERCEPTION_MIN_SPEED {
            physics::BALL_DAMPING_HIGHEST
        } else {
            physics::BALL_DAMPING_HIGH
        };
        self.set_ball_damping(host, damping);
        announce(
            host,
            format!("👀 Interception attempt by {}", defender.name),
            Color::Yellow,
        );
    }

    fn track_interception(&mut self, host: &mut dyn Host, ball: &Body) {
        let direction = self.scrimmage.intercept_direction;
        if direction == 0.0 {
            return;
        }
        let Some(defender) = self.state.intercept_attempt.and_then(|id| host.player(id)) else {
            self.state.intercept_attempt = None;
            return;
        };

        if ball.speed() < scrimmage::INTERCEPTION_FAILED_SPEED {
            self.set_ball_damping(host, physics::BALL_DAMPING);
            announce(
                host,
                format!("❌ Interception failed, {} defended the pass", defender.name),
                Color::Orange,
            );
            self.block_pass(host, &defender, false);
            return;
        }

        if ball.damping == physics::BALL_DAMPING_HIGHEST
            && ball.speed() > scrimmage::INTERCEPTION_HIGHEST_DAMPING_SPEED
        {
            self.set_ball_damping(host, physics::BALL_DAMPING_HIGH);
        }

        if ball.position.x * direction > field::GOAL_LINE_X {
            self.complete_interception(host, &defender);
        }
    }

    fn complete_interception(&mut self, host: &mut dyn Host, defender: &PlayerInfo) {
        let offense = self.state.team_with_ball;
        self.state.intercept_attempt = None;
        self.set_ball_damping(host, physics::BALL_DAMPING);

        if self.state.conversion {
            announce(host, format!("🚨 Intercepted by {}!", defender.name), Color::Tomato);
            self.reset_to_kickoff(host, Some(offense));
            return;
        }

        self.state.intercept = true;
        self.state.team_with_ball = defender.team;
        self.credit(defender, StatCategory::Interceptions, 1);
        announce(host, format!("🚨 INTERCEPTION by {}!", defender.name), Color::Tomato);
        self.set_carrier(host, defender, CarrierRole::Intercepter, true);
        info!("{} intercepted a pass from {}", defender.name, offense);
    }
}
