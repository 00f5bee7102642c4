//! Match orchestrator
//!
//! [`Game`] owns the match aggregate, the timers and the sub-state of every
//! mode controller. The controllers themselves live under `modes/` as further
//! `impl Game` blocks, so they all work on one owned context and never keep
//! copies of shared state.
//!
//! The host drives the engine through [`Game::on_tick`] and the discrete event
//! handlers below. Every handler runs to completion on the caller's thread.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RulesConfig;
use crate::game::constants::{clock, field, physics, scrimmage};
use crate::game::down_info::{DownMoment, Participant, PlayerKind};
use crate::game::event_queue::HostEvent;
use crate::game::geometry::{clamp_to_field_of_play, points_along_line, FieldPosition};
use crate::game::host::{collision, Announcement, Body, BodyRef, Color, Host, Marker, PlayerId, PlayerInfo};
use crate::game::match_result::{check_match_end, leader, EndCheck, MatchEndReason, MatchSummary, SummarySpan};
use crate::game::modes::field_goal::FieldGoalState;
use crate::game::modes::invasion::InvasionDetector;
use crate::game::modes::kick::KickState;
use crate::game::modes::scrimmage::ScrimmageState;
use crate::game::roster::TeamHistory;
use crate::game::state::{Carrier, CarrierRole, MatchState, PlayMode, Team};
use crate::game::stats::{StatCategory, StatEvent, StatsSink};
use crate::game::stoppage::{format_clock, format_ticks};
use crate::game::timer::{DownSetup, TimedAction, TimerSlot, Timers};
use crate::metrics::EngineMetrics;
use crate::util::vec2::Vec2;

/// Avatar shown on the ball carrier
pub const CARRIER_AVATAR: &str = "🏈";

/// Short player lists (tacklers, holders, invaders)
pub type PlayerList = SmallVec<[PlayerInfo; 4]>;

/// Broadcast a bold rule message
pub(crate) fn announce(host: &mut dyn Host, text: impl Into<String>, color: Color) {
    host.announce(&Announcement::bold(text, color));
}

/// Players of `team`, in host order
pub(crate) fn players_of(host: &dyn Host, team: Team) -> Vec<PlayerInfo> {
    host.players().into_iter().filter(|p| p.team == team).collect()
}

/// First player within `within` edge distance of the ball
pub(crate) fn touching_ball<'a>(
    players: &'a [PlayerInfo],
    ball: &Body,
    within: f32,
) -> Option<&'a PlayerInfo> {
    players.iter().find(|p| p.distance_to(ball) < within)
}

/// "Ana, Bob" style list
pub(crate) fn names(players: &[PlayerInfo]) -> String {
    players
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The rules engine of one match session
pub struct Game {
    pub config: RulesConfig,
    pub state: MatchState,
    pub timers: Timers,
    pub history: TeamHistory,
    pub scrimmage: ScrimmageState,
    pub invasion: InvasionDetector,
    pub kick: KickState,
    pub field_goal: FieldGoalState,
    stats: Box<dyn StatsSink>,
    metrics: Option<Arc<EngineMetrics>>,
    match_id: Uuid,
    match_active: bool,
    /// A permitted layout change is reverted when the match ends
    layout_reset_pending: bool,
}

impl Game {
    pub fn new(config: RulesConfig, stats: Box<dyn StatsSink>) -> Self {
        Self {
            config,
            state: MatchState::new(),
            timers: Timers::new(),
            history: TeamHistory::new(),
            scrimmage: ScrimmageState::default(),
            invasion: InvasionDetector::default(),
            kick: KickState::default(),
            field_goal: FieldGoalState::default(),
            stats,
            metrics: None,
            match_id: Uuid::nil(),
            match_active: false,
            layout_reset_pending: false,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[inline]
    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    #[inline]
    pub fn is_match_active(&self) -> bool {
        self.match_active
    }

    #[inline]
    pub fn mode(&self) -> Option<PlayMode> {
        self.state.mode
    }

    /// Let the next field layout change through
    pub fn allow_layout_change(&mut self) {
        self.state.can_change_layout = true;
    }

    pub(crate) fn metric(&self, f: impl FnOnce(&EngineMetrics)) {
        if let Some(metrics) = self.metrics.as_deref() {
            f(metrics);
        }
    }

    // === Tick ===

    /// Per-tick handler. Pulls everything it needs from the host.
    pub fn on_tick(&mut self, host: &mut dyn Host) {
        if !self.match_active || host.is_paused() {
            return;
        }
        self.state.tick_count += 1;
        self.state.game_time = host.elapsed_seconds();
        self.metric(|m| m.record_engine_tick());

        self.check_end_of_match(host);
        if !self.match_active {
            return;
        }

        self.timers.advance(self.config.tick_ms());
        while let Some((slot, action)) = self.timers.pop_due() {
            debug!("Timer {:?} fired", slot);
            self.run_timed(host, action);
        }

        match self.state.mode {
            None | Some(PlayMode::WaitingHike) | Some(PlayMode::ExtraPoint) => {}
            Some(PlayMode::Down) => self.tick_down(host),
            Some(PlayMode::Kickoff)
            | Some(PlayMode::Punt)
            | Some(PlayMode::OnsideKick)
            | Some(PlayMode::Safety) => self.tick_kick(host),
            Some(PlayMode::FieldGoal) => self.tick_field_goal(host),
            Some(PlayMode::FakeFieldGoal) => self.tick_carrier(host),
        }
    }

    fn run_timed(&mut self, host: &mut dyn Host, action: TimedAction) {
        match action {
            TimedAction::HikeExpired { team } => self.hike_expired(host, team),
            TimedAction::Kickoff { team } => self.set_kickoff(host, team),
            TimedAction::SafetyKick { team } => self.set_safety(host, team),
            TimedAction::ExtraPoint { team } => self.set_extra_point(host, team, false),
            TimedAction::SetDown(setup) => self.set_down(host, setup),
            TimedAction::CheckInterception {
                player,
                origin,
                direction,
            } => self.check_interception(host, player, origin, direction),
            TimedAction::CheckBlockedPass { player } => self.check_blocked_pass(host, player),
            TimedAction::InvasionPenalty => self.invasion_penalty(host),
            TimedAction::DetectFieldGoal { origin } => self.detect_field_goal(host, origin),
            TimedAction::FieldGoalExpired => self.field_goal_expired(host),
        }
    }

    /// Dispatch one queued host event
    pub fn handle_event(&mut self, host: &mut dyn Host, event: HostEvent) {
        match event {
            HostEvent::BallKicked { player } => self.on_ball_kicked(host, player),
            HostEvent::PlayerLeft { player } => self.on_player_left(host, &player),
            HostEvent::TeamChanged { player, by } => self.on_team_changed(host, player, by),
            HostEvent::Paused { by } => self.on_pause(host, by),
            HostEvent::Unpaused { by } => self.on_unpause(host, by),
            HostEvent::MatchStarted => self.on_match_started(host),
            HostEvent::MatchStopped { by } => self.on_match_stopped(host, by),
            HostEvent::LayoutChanged { name, by } => self.on_layout_changed(host, &name, by),
            HostEvent::Chat { player, text } => {
                if let Err(e) = self.on_chat(host, player, &text) {
                    debug!("Command from player {} rejected: {}", player, e);
                }
            }
        }
    }

    // === Physics toggles ===

    /// Ball can no longer be redirected by players
    pub(crate) fn lock_ball(&self, host: &mut dyn Host) {
        host.set_inv_mass(BodyRef::Ball, physics::BALL_LOCKED_INV_MASS);
    }

    pub(crate) fn unlock_ball(&self, host: &mut dyn Host) {
        host.set_inv_mass(BodyRef::Ball, physics::BALL_INV_MASS);
    }

    pub(crate) fn set_ball_inv_mass(&self, host: &mut dyn Host, inv_mass: f32) {
        host.set_inv_mass(BodyRef::Ball, inv_mass);
    }

    pub(crate) fn set_ball_damping(&self, host: &mut dyn Host, damping: f32) {
        host.set_damping(BodyRef::Ball, damping);
    }

    pub(crate) fn set_ball_kickable(&self, host: &mut dyn Host, kickable: bool) {
        let group = if kickable {
            collision::BALL | collision::KICK
        } else {
            collision::BALL
        };
        host.set_collision_group(BodyRef::Ball, group);
    }

    /// Place the ball at rest
    pub(crate) fn place_ball(&self, host: &mut dyn Host, position: Vec2) {
        host.set_position(BodyRef::Ball, position);
        host.set_velocity(BodyRef::Ball, Vec2::ZERO);
    }

    /// Players cannot push the ball around
    pub(crate) fn make_players_weightless(&self, host: &mut dyn Host) {
        for p in host.players() {
            host.set_inv_mass(BodyRef::Player(p.id), physics::PLAYER_WEIGHTLESS_INV_MASS);
        }
    }

    pub(crate) fn make_players_pushable(&self, host: &mut dyn Host) {
        for p in host.players() {
            host.set_inv_mass(BodyRef::Player(p.id), physics::PLAYER_INV_MASS);
        }
    }

    /// Keep `team` behind its kick barrier until the ball is kicked
    pub(crate) fn block_team(&self, host: &mut dyn Host, team: Team) {
        let barrier = match team {
            Team::Red => collision::C0,
            Team::Blue => collision::C1,
            Team::Spectators => return,
        };
        for p in players_of(host, team) {
            host.set_collision_group(BodyRef::Player(p.id), collision::team_group(team) | barrier);
        }
    }

    /// Keep the kicking team out of the middle circle at a kickoff
    pub(crate) fn block_middle_kickoff(&self, host: &mut dyn Host, team: Team) {
        let barrier = match team {
            Team::Red => collision::C2,
            Team::Blue => collision::C3,
            Team::Spectators => return,
        };
        for p in players_of(host, team) {
            host.set_collision_group(BodyRef::Player(p.id), collision::team_group(team) | barrier);
        }
    }

    pub(crate) fn unblock_teams(&self, host: &mut dyn Host) {
        for p in host.players().into_iter().filter(|p| p.team.is_playing()) {
            host.set_collision_group(BodyRef::Player(p.id), collision::team_group(p.team));
        }
    }

    // === Possession ===

    /// Hand the ball to `player`
    pub(crate) fn set_carrier(
        &mut self,
        host: &mut dyn Host,
        player: &PlayerInfo,
        role: CarrierRole,
        running: bool,
    ) {
        if let Some(previous) = self.state.carrier.take() {
            host.set_avatar(previous.id, None);
        }
        host.set_avatar(player.id, Some(CARRIER_AVATAR));
        self.unlock_ball(host);
        self.make_players_pushable(host);
        self.state.carrier = Some(Carrier {
            id: player.id,
            team: player.team,
            role,
            initial_position: player.position,
        });
        if running {
            self.state.running = true;
        }
        debug!("{} carries the ball as {:?}", player.name, role);
    }

    pub(crate) fn clear_carrier(&mut self, host: &mut dyn Host) {
        if let Some(carrier) = self.state.carrier.take() {
            host.set_avatar(carrier.id, None);
        }
    }

    // === Formation ===

    /// Spread `players` evenly along a vertical line at `x`, keeping their
    /// top-to-bottom order
    pub(crate) fn spread_line(&self, host: &mut dyn Host, players: &[PlayerInfo], x: f32, half_length: f32) {
        let mut ordered: Vec<&PlayerInfo> = players.iter().collect();
        ordered.sort_by(|a, b| b.position.y.total_cmp(&a.position.y));
        let points = points_along_line(Vec2::new(x, half_length), Vec2::new(x, -half_length), ordered.len());
        for (player, point) in ordered.into_iter().zip(points) {
            host.set_position(BodyRef::Player(player.id), point);
            host.set_velocity(BodyRef::Player(player.id), Vec2::ZERO);
        }
    }

    /// Split off players loitering past the sidelines. Only large teams are corrected.
    pub(crate) fn split_outside_field(players: Vec<PlayerInfo>) -> (Vec<PlayerInfo>, Vec<PlayerInfo>) {
        if players.len() <= field::SIDELINE_CORRECTION_TEAM_SIZE {
            return (players, Vec::new());
        }
        players
            .into_iter()
            .partition(|p| p.position.y.abs() < field::SIDELINE_Y)
    }

    /// Line both teams up on the line of scrimmage
    pub(crate) fn reposition_evenly(&mut self, host: &mut dyn Host) {
        let offense_team = self.state.team_with_ball;
        if !offense_team.is_playing() {
            return;
        }
        let sign = offense_team.attack_sign();
        let line_x = self.state.ball_position.to_x();
        let offense_x = line_x - scrimmage::OFFENSE_SPAWN_YARDS * field::YARD * sign;
        let defense_x = line_x + scrimmage::DEFENSE_SPAWN_YARDS * field::YARD * sign;
        let corner_x = line_x + scrimmage::CORNERBACK_SPAWN_YARDS * field::YARD * sign;
        let stray_offense_x = line_x - scrimmage::CORNERBACK_SPAWN_YARDS * field::YARD * sign;

        let (offense, stray_offense) = Self::split_outside_field(players_of(host, offense_team));
        let (mut defense, stray_defense) =
            Self::split_outside_field(players_of(host, offense_team.opponent()));

        self.spread_line(host, &offense, offense_x, scrimmage::PLAYER_LINE_LENGTH);
        for p in &stray_offense {
            host.set_position(BodyRef::Player(p.id), Vec2::new(stray_offense_x, p.position.y));
            host.set_velocity(BodyRef::Player(p.id), Vec2::ZERO);
        }
        for p in &stray_defense {
            host.set_position(BodyRef::Player(p.id), Vec2::new(corner_x, p.position.y));
            host.set_velocity(BodyRef::Player(p.id), Vec2::ZERO);
        }

        // Defense keeps the order it had when the ball left the quarterback
        let defense_y = &self.state.defense_y;
        let y_of = |p: &PlayerInfo| defense_y.get(&p.id).copied().unwrap_or(p.position.y);
        defense.sort_by(|a, b| y_of(b).total_cmp(&y_of(a)));
        for p in defense.iter_mut() {
            p.position.y = y_of(p);
        }

        if defense.len() >= 3 {
            let bottom = defense.remove(0);
            if let Some(top) = defense.pop() {
                host.set_position(BodyRef::Player(top.id), Vec2::new(corner_x, -scrimmage::CORNERBACK_Y));
                host.set_velocity(BodyRef::Player(top.id), Vec2::ZERO);
            }
            host.set_position(BodyRef::Player(bottom.id), Vec2::new(corner_x, scrimmage::CORNERBACK_Y));
            host.set_velocity(BodyRef::Player(bottom.id), Vec2::ZERO);
        }
        self.spread_line(host, &defense, defense_x, scrimmage::PLAYER_LINE_LENGTH);
    }

    /// Remember where the defense stood, for the next formation
    pub(crate) fn capture_defense_y(&mut self, host: &dyn Host) {
        let defense = players_of(host, self.state.team_with_ball.opponent());
        self.state.defense_y = defense.iter().map(|p| (p.id, p.position.y)).collect();
    }

    /// Show the line of scrimmage and the first-down line
    pub(crate) fn update_markers(&self, host: &mut dyn Host) {
        let team = self.state.team_with_ball;
        let line = self.state.ball_position;
        host.set_marker(Marker::BallLine, Some(line.to_x()));

        let first_down_in_end_zone = self.state.distance >= line.yards_to_end_zone(team);
        let first_down = if self.state.goal_mode || first_down_in_end_zone {
            None
        } else {
            Some(line.advanced(self.state.distance, team).to_x())
        };
        host.set_marker(Marker::FirstDownLine, first_down);
    }

    pub(crate) fn hide_markers(&self, host: &mut dyn Host) {
        host.set_marker(Marker::BallLine, None);
        host.set_marker(Marker::FirstDownLine, None);
    }

    // === Reset ===

    /// Clear every per-play field. Safe to call any number of times.
    pub fn reset(&mut self, host: &mut dyn Host) {
        if host.is_match_in_progress() {
            self.make_players_weightless(host);
            self.unlock_ball(host);
            self.set_ball_kickable(host, true);
            self.unblock_teams(host);
            self.set_ball_damping(host, physics::BALL_DAMPING);
        }

        self.report_down();
        self.scrimmage = ScrimmageState::default();
        self.invasion.clear();
        self.kick = KickState::default();
        self.field_goal = FieldGoalState::default();
        self.timers.clear();
        self.clear_carrier(host);

        let s = &mut self.state;
        s.first_kickoff = false;
        s.quarterback = None;
        s.qb_kicked_ball = false;
        s.running = false;
        s.blocked_pass = false;
        s.conversion = false;
        s.intercept = false;
        s.intercept_attempt = None;
        s.intercept_left_end_zone = false;
        s.qb_carried_ball_tick = None;
    }

    /// Forget red-zone fouls and goal mode, at every change of play type
    pub(crate) fn reset_play(&mut self) {
        self.state.red_zone_penalties = 0;
        self.state.goal_mode = false;
    }

    /// End the current play and kick off after a delay
    pub(crate) fn reset_to_kickoff(&mut self, host: &mut dyn Host, team: Option<Team>) {
        let kicking = team.unwrap_or(if self.state.intercept && self.state.conversion {
            self.state.team_with_ball.opponent()
        } else {
            self.state.team_with_ball
        });
        if self.state.conversion {
            announce(host, "❌ Conversion failed", Color::Tomato);
        }
        self.state.mode = None;
        self.reset(host);
        self.timers.start(
            TimerSlot::KickoffReset,
            clock::SCORE_RESET_MS,
            TimedAction::Kickoff { team: kicking },
        );
    }

    // === Score and stats ===

    pub(crate) fn add_points(&mut self, team: Team, points: u32) {
        match team {
            Team::Red => self.state.score_red += points,
            Team::Blue => self.state.score_blue += points,
            Team::Spectators => return,
        }
        info!("{} scores {} ({})", team, points, self.state.score_line());
        self.metric(|m| m.record_score(points));
        if let Err(e) = self.stats.score_changed(self.state.score_red, self.state.score_blue) {
            warn!("Failed to report score: {}", e);
            self.metric(|m| m.record_stats_failure());
        }
    }

    /// Attribute a stat to `player`
    pub(crate) fn credit(&mut self, player: &PlayerInfo, category: StatCategory, amount: i32) {
        if amount == 0 {
            return;
        }
        let event = StatEvent {
            player_id: player.id,
            player_name: player.name.clone(),
            category,
            amount,
            tick: self.state.tick_count,
        };
        if let Err(e) = self.stats.record(event) {
            warn!("Failed to record {:?} for {}: {}", category, player.name, e);
            self.metric(|m| m.record_stats_failure());
        }
    }

    pub(crate) fn credit_id(&mut self, host: &dyn Host, id: PlayerId, category: StatCategory, amount: i32) {
        if let Some(player) = host.player(id) {
            self.credit(&player, category, amount);
        }
    }

    /// Snapshot the field into the current down record
    pub(crate) fn record_moment(&mut self, host: &dyn Host, moment: DownMoment) {
        if self.scrimmage.down_info.is_none() {
            return;
        }
        let Some(ball) = host.ball() else {
            return;
        };
        let players = host.players();
        let team = self.state.team_with_ball;
        let quarterback = self.state.quarterback;
        let carrier = self.state.carrier.as_ref().map(|c| c.id);
        let tick = self.state.tick_count;

        let participants: Vec<Participant<'_>> = players
            .iter()
            .filter(|p| p.team.is_playing())
            .map(|p| Participant {
                player: p,
                kind: if Some(p.id) == quarterback {
                    PlayerKind::Qb
                } else if p.team == team {
                    PlayerKind::Wr
                } else {
                    PlayerKind::Def
                },
                with_ball: Some(p.id) == carrier,
            })
            .collect();

        if let Some(info) = self.scrimmage.down_info.as_mut() {
            info.add_moment(moment, tick, ball.position, &participants);
        }
    }

    fn report_down(&mut self) {
        let Some(info) = self.scrimmage.down_info.take() else {
            return;
        };
        if !info.has_all_moments() {
            return;
        }
        if let Err(e) = self.stats.down_completed(info.into_record()) {
            warn!("Failed to report down: {}", e);
            self.metric(|m| m.record_stats_failure());
        }
    }

    // === Clock ===

    /// The hike clock ran out, or the quarterback carried the ball long enough
    pub(crate) fn is_hike_time_over(&self) -> bool {
        let clock = self.state.hike_tick + self.config.seconds_to_ticks(self.config.hike_clock_seconds);
        let deadline = match self.state.qb_carried_ball_tick {
            Some(carried) => clock.min(carried + self.config.seconds_to_ticks(self.config.carry_ball_sack_seconds)),
            None => clock,
        };
        self.state.tick_count > deadline
    }

    /// Seconds since the hike, for messages
    pub(crate) fn time_since_hike(&self) -> String {
        let ticks = self.state.tick_count.saturating_sub(self.state.hike_tick);
        format!("{:.1}s", ticks as f32 / self.config.tick_rate as f32)
    }

    /// A defensive foul in the final seconds gives the offense its window back
    pub(crate) fn adjust_time_after_defensive_penalty(&mut self, host: &mut dyn Host) {
        let end = self.state.end_game_time;
        if end == 0.0 || self.state.overtime {
            return;
        }
        let remaining = end - self.state.game_time;
        if remaining >= self.config.final_seconds {
            return;
        }
        let new_end = end + (self.config.final_seconds - remaining);
        if new_end.trunc() == end.trunc() {
            return;
        }
        self.state.end_game_time = new_end;
        self.state.last_play_notice_sent = false;
        announce(
            host,
            format!("⏱️ Defensive foul in the final seconds, clock extended to {}", format_clock(new_end)),
            Color::Gold,
        );
    }

    // === Match lifecycle ===

    pub fn on_match_started(&mut self, host: &mut dyn Host) {
        let hike_timer_enabled = self.state.hike_timer_enabled;
        self.state = MatchState {
            hike_timer_enabled,
            ..MatchState::default()
        };
        self.state.end_game_time = host.time_limit_seconds();
        self.match_id = Uuid::new_v4();
        self.match_active = true;
        self.stats.clear();

        let players = host.players();
        self.history.seed(&players);
        for p in &players {
            host.set_avatar(p.id, None);
        }

        info!(
            "Match {} started with {} players ({}s limit)",
            self.match_id,
            players.iter().filter(|p| p.team.is_playing()).count(),
            self.state.end_game_time
        );
        self.set_kickoff(host, Team::Red);
    }

    pub fn on_match_stopped(&mut self, host: &mut dyn Host, by: Option<PlayerId>) {
        self.finish_match(host, by, MatchEndReason::Stopped);
    }

    fn check_end_of_match(&mut self, host: &mut dyn Host) {
        let elapsed = self.state.game_time;
        let end = self.state.end_game_time;
        let tick_rate = self.config.tick_rate;

        let stoppage = self.state.stoppage;
        if end > 0.0
            && elapsed > end
            && !self.kick.kickoff_pending
            && stoppage.has_stoppage()
            && !stoppage.is_active()
        {
            self.state.stoppage.activate();
            host.announce(&Announcement::alert(
                format!("⏱️ {} of stoppage time", format_ticks(stoppage.ticks(), tick_rate)),
                Color::Gold,
            ));
            info!("Stoppage window opened ({} ticks)", stoppage.ticks());
        }

        match check_match_end(&self.state, elapsed, tick_rate) {
            EndCheck::Continue => {}
            EndCheck::Stop { winner } => {
                info!("Time is up, {} wins", winner);
                host.stop_match();
                self.finish_match(host, None, MatchEndReason::TimeLimit);
            }
            EndCheck::LastPlay => {
                self.state.last_play_notice_sent = true;
                host.announce(&Announcement::alert("⏱️ Time is up! Last play", Color::Gold));
            }
            EndCheck::Overtime => {
                self.state.last_play_notice_sent = true;
                self.state.overtime = true;
                host.announce(&Announcement::alert("⏱️ Overtime! Next score wins", Color::Gold));
            }
        }
    }

    fn finish_match(&mut self, host: &mut dyn Host, by: Option<PlayerId>, reason: MatchEndReason) {
        if !self.match_active {
            return;
        }
        self.match_active = false;
        self.state.mode = None;
        self.reset(host);

        let winner = leader(&self.state);
        let duration = self.state.game_time;
        if let Some(name) = by.and_then(|id| host.player(id)).map(|p| p.name) {
            announce(host, format!("🛑 Match stopped by {}", name), Color::Tomato);
        }
        match winner {
            Some(team) => announce(
                host,
                format!("🏆 {} wins! {}", team, self.state.score_line()),
                Color::Gold,
            ),
            None => announce(host, format!("🤝 Tie game. {}", self.state.score_line()), Color::Gold),
        }

        if duration >= self.config.min_reported_match_seconds {
            self.history.close_all(duration);
            let history = self
                .history
                .spans()
                .iter()
                .map(|span| SummarySpan {
                    span: span.clone(),
                    points: self.stats.points_of(span.id),
                })
                .collect();
            let summary = MatchSummary {
                match_id: self.match_id,
                reason,
                winner,
                score_red: self.state.score_red,
                score_blue: self.state.score_blue,
                duration_seconds: duration,
                history,
            };
            if let Err(e) = self.stats.match_finished(&summary) {
                warn!("Failed to report match {}: {}", self.match_id, e);
                self.metric(|m| m.record_stats_failure());
            }
        }

        if let Some((name, points)) = self.stats.mvp() {
            announce(host, format!("⭐ MVP: {} ({} pts)", name, points), Color::Gold);
        }

        if reason == MatchEndReason::TimeLimit && self.config.rotate_losing_team {
            if let Some(team) = winner {
                for loser in players_of(host, team.opponent()) {
                    host.set_player_team(loser.id, Team::Spectators);
                }
            }
        }

        self.stats.clear();
        self.history.clear();
        let hike_timer_enabled = self.state.hike_timer_enabled;
        self.state = MatchState {
            hike_timer_enabled,
            ..MatchState::default()
        };
        if self.layout_reset_pending {
            self.layout_reset_pending = false;
            host.restore_field_layout();
        }
        info!("Match {} finished ({:?})", self.match_id, reason);
    }

    pub fn on_pause(&mut self, host: &mut dyn Host, by: Option<PlayerId>) {
        self.timers.pause_all();
        let Some(player) = by.and_then(|id| host.player(id)) else {
            return;
        };
        if self.state.mode == Some(PlayMode::WaitingHike) && self.timers.is_armed(TimerSlot::Hike) {
            announce(
                host,
                format!("⏸️ Paused by {}, the hike clock is stopped", player.name),
                Color::Yellow,
            );
        }
    }

    pub fn on_unpause(&mut self, host: &mut dyn Host, by: Option<PlayerId>) {
        self.timers.resume_all();
        let Some(player) = by.and_then(|id| host.player(id)) else {
            return;
        };
        if self.state.mode == Some(PlayMode::WaitingHike) && self.timers.is_armed(TimerSlot::Hike) {
            announce(
                host,
                format!("▶️ Resumed by {}, the hike clock is running", player.name),
                Color::Yellow,
            );
        }
    }

    /// `player` is the last known state of the player, already gone from the host
    pub fn on_player_left(&mut self, host: &mut dyn Host, player: &PlayerInfo) {
        if !self.match_active {
            return;
        }
        self.history.close(player.id, host.elapsed_seconds());
        if !host.is_match_in_progress() {
            return;
        }
        self.release_player(host, player, "left");
        if player.team.is_playing() {
            host.pause();
            self.timers.pause_all();
        }
    }

    pub fn on_team_changed(&mut self, host: &mut dyn Host, id: PlayerId, by: Option<PlayerId>) {
        let Some(player) = host.player(id) else {
            return;
        };
        host.set_avatar(id, None);
        if !self.match_active {
            return;
        }
        self.history
            .team_changed(id, &player.name, player.team, host.elapsed_seconds());
        if !host.is_match_in_progress() {
            return;
        }
        debug!("{} moved to {} (by {:?})", player.name, player.team, by);
        self.release_player(host, &player, "changed team");

        if self.state.mode == Some(PlayMode::Kickoff) && !self.state.qb_kicked_ball {
            let kicking = self.state.team_with_ball;
            self.block_team(host, kicking.opponent());
            self.block_middle_kickoff(host, kicking);
        }
    }

    /// Carrier or quarterback went away mid-play
    fn release_player(&mut self, host: &mut dyn Host, player: &PlayerInfo, what: &str) {
        if let Some(carrier) = self.state.carrier.clone().filter(|c| c.id == player.id) {
            announce(
                host,
                format!("⚠️ {} {} with the ball, play is dead", player.name, what),
                Color::Tomato,
            );
            self.clear_carrier(host);
            if self.state.conversion {
                self.reset_to_kickoff(host, None);
                return;
            }
            let spot = FieldPosition::from_x(clamp_to_field_of_play(player.position.x));
            self.start_series(host, carrier.team.opponent(), spot);
            return;
        }

        let is_quarterback = self.state.quarterback == Some(player.id);
        if is_quarterback && self.state.mode == Some(PlayMode::Down) && self.state.carrier.is_none() {
            announce(
                host,
                format!("⚠️ Quarterback {} {}, the down is replayed", player.name, what),
                Color::Tomato,
            );
            self.set_down(host, DownSetup::new().without_count());
        }
    }

    pub fn on_layout_changed(&mut self, host: &mut dyn Host, name: &str, by: Option<PlayerId>) {
        let Some(by) = by else {
            return;
        };
        if self.state.can_change_layout {
            self.state.can_change_layout = false;
            self.layout_reset_pending = true;
            info!("Field layout changed to {}", name);
            return;
        }
        warn!("Player {} tried to load layout {}", by, name);
        host.whisper(by, &Announcement::warning("You cannot change the field layout", Color::Tomato));
        host.restore_field_layout();
    }

    pub fn on_ball_kicked(&mut self, host: &mut dyn Host, id: PlayerId) {
        if !self.match_active {
            return;
        }
        let Some(player) = host.player(id) else {
            return;
        };
        self.make_players_pushable(host);
        match self.state.mode {
            Some(PlayMode::WaitingHike) | Some(PlayMode::Down) => self.scrimmage_kick(host, &player),
            Some(PlayMode::Kickoff)
            | Some(PlayMode::Punt)
            | Some(PlayMode::OnsideKick)
            | Some(PlayMode::Safety) => self.kick_family_kick(host, &player),
            Some(PlayMode::FieldGoal) => self.field_goal_kick(host, &player),
            Some(PlayMode::FakeFieldGoal) | Some(PlayMode::ExtraPoint) | None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::clock;
    use crate::game::test_support::{fixture, tick_n, Fixture};

    #[test]
    fn test_match_start_sets_opening_kickoff() {
        let Fixture { game, host, .. } = fixture();
        assert_eq!(game.mode(), Some(PlayMode::Kickoff));
        assert_eq!(game.state.team_with_ball, Team::Red);
        assert!(game.kick.kickoff_pending);
        assert!(game.state.first_kickoff);
        assert!(host.announced("Kickoff"));
        assert!(!game.match_id().is_nil());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.state.qb_kicked_ball = true;
        game.state.conversion = true;
        game.state.down_count = 3;
        game.timers.start(TimerSlot::Hike, 100, TimedAction::HikeExpired { team: Team::Red });

        game.reset(&mut host);
        let down_count = game.state.down_count;
        let distance = game.state.distance;
        let position = game.state.ball_position;
        game.reset(&mut host);

        assert!(game.timers.is_empty());
        assert!(!game.state.qb_kicked_ball);
        assert!(!game.state.conversion);
        assert_eq!(game.state.down_count, down_count);
        assert_eq!(game.state.distance, distance);
        assert_eq!(game.state.ball_position, position);
        assert!(game.state.carrier.is_none());
    }

    #[test]
    fn test_add_points_reports_score() {
        let Fixture { mut game, stats, .. } = fixture();
        game.add_points(Team::Blue, 3);
        game.add_points(Team::Spectators, 3);
        assert_eq!(game.state.score_blue, 3);
        assert_eq!(stats.with(|l| l.scores.clone()), vec![(0, 3)]);
    }

    #[test]
    fn test_reset_to_kickoff_after_delay() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.state.team_with_ball = Team::Blue;
        game.reset_to_kickoff(&mut host, None);
        assert_eq!(game.mode(), None);

        let ticks = (clock::SCORE_RESET_MS as f32 / 1000.0 * 60.0) as u64;
        tick_n(&mut game, &mut host, ticks + 1);
        assert_eq!(game.mode(), Some(PlayMode::Kickoff));
        assert_eq!(game.state.team_with_ball, Team::Blue);
    }

    #[test]
    fn test_paused_host_freezes_timers() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.timers.start(TimerSlot::KickoffReset, 100, TimedAction::Kickoff { team: Team::Blue });
        host.set_paused(true);
        game.on_pause(&mut host, None);
        tick_n(&mut game, &mut host, 60);
        assert_eq!(game.timers.remaining_ms(TimerSlot::KickoffReset), Some(100.0));

        host.set_paused(false);
        game.on_unpause(&mut host, None);
        tick_n(&mut game, &mut host, 10);
        assert_eq!(game.state.team_with_ball, Team::Blue);
    }

    #[test]
    fn test_reposition_spreads_teams_around_line() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.state.team_with_ball = Team::Red;
        game.state.ball_position = FieldPosition::new(Team::Red, 30);
        game.reposition_evenly(&mut host);

        let line_x = FieldPosition::new(Team::Red, 30).to_x();
        for p in host.players() {
            match p.team {
                Team::Red => assert!(p.position.x < line_x),
                Team::Blue => assert!(p.position.x > line_x),
                Team::Spectators => {}
            }
        }
        let corners = players_of(&host, Team::Blue)
            .iter()
            .filter(|p| (p.position.y.abs() - scrimmage::CORNERBACK_Y).abs() < 1e-3)
            .count();
        assert_eq!(corners, 2);
    }

    #[test]
    fn test_defensive_penalty_in_final_seconds_extends_clock() {
        let Fixture { mut game, mut host, .. } = fixture();
        game.state.end_game_time = 600.0;
        game.state.game_time = 595.0;
        game.state.last_play_notice_sent = true;
        game.adjust_time_after_defensive_penalty(&mut host);
        assert!((game.state.end_game_time - 605.0).abs() < 1e-3);
        assert!(!game.state.last_play_notice_sent);

        game.state.overtime = true;
        game.state.game_time = 604.0;
        game.adjust_time_after_defensive_penalty(&mut host);
        assert!((game.state.end_game_time - 605.0).abs() < 1e-3);
    }

    #[test]
    fn test_unpermitted_layout_change_is_reverted() {
        let Fixture { mut game, mut host, red, .. } = fixture();
        game.on_layout_changed(&mut host, "Big", Some(red[0]));
        assert_eq!(host.layout_restores, 1);
        assert_eq!(host.whispers.len(), 1);

        game.allow_layout_change();
        game.on_layout_changed(&mut host, "Big", Some(red[0]));
        assert_eq!(host.layout_restores, 1);
        game.on_layout_changed(&mut host, "Default", None);
        assert_eq!(host.layout_restores, 1);
    }

    #[test]
    fn test_stop_reports_summary_and_clears() {
        let Fixture { mut game, mut host, stats, red, .. } = fixture();
        host.set_elapsed(120.0);
        tick_n(&mut game, &mut host, 1);
        game.add_points(Team::Red, 6);
        game.on_match_stopped(&mut host, Some(red[0]));

        assert!(!game.is_match_active());
        assert_eq!(game.state.score_red, 0);
        assert!(host.announced("Match stopped by"));
        let summaries = stats.with(|l| l.summaries.clone());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].winner, Some(Team::Red));
        assert_eq!(summaries[0].reason, MatchEndReason::Stopped);

        // Second stop is ignored
        game.on_match_stopped(&mut host, None);
        assert_eq!(stats.with(|l| l.summaries.len()), 1);
    }

    #[test]
    fn test_short_match_not_reported() {
        let Fixture { mut game, mut host, stats, .. } = fixture();
        host.set_elapsed(10.0);
        tick_n(&mut game, &mut host, 1);
        game.on_match_stopped(&mut host, None);
        assert!(stats.with(|l| l.summaries.is_empty()));
    }

    #[test]
    fn test_player_leaving_pauses_host() {
        let Fixture { mut game, mut host, blue, .. } = fixture();
        let info = host.remove_player(blue[1]).expect("player exists");
        game.on_player_left(&mut host, &info);
        assert!(host.is_paused());
        let span = game
            .history
            .spans()
            .iter()
            .find(|s| s.id == info.id)
            .cloned()
            .expect("span recorded");
        assert!(span.time_left.is_some());
    }
}
