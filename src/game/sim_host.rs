//! In-memory host
//!
//! Minimal stand-in for the physics/session host: bodies move by their
//! velocity each step and lose speed by their damping. There are no
//! collisions; the session binary, the benchmark and the tests drive bodies
//! directly.

use hashbrown::HashMap;

use crate::game::constants::physics;
use crate::game::host::{collision, Announcement, Body, BodyRef, Host, Marker, PlayerId, PlayerInfo};
use crate::game::state::Team;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone)]
struct SimPlayer {
    id: PlayerId,
    name: String,
    team: Team,
    admin: bool,
    body: Body,
    avatar: Option<String>,
}

impl SimPlayer {
    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            team: self.team,
            admin: self.admin,
            position: self.body.position,
            velocity: self.body.velocity,
            radius: self.body.radius,
        }
    }
}

fn player_body(team: Team, position: Vec2) -> Body {
    Body {
        position,
        velocity: Vec2::ZERO,
        radius: physics::PLAYER_RADIUS,
        inv_mass: physics::PLAYER_INV_MASS,
        damping: physics::PLAYER_DAMPING,
        collision_group: collision::team_group(team),
    }
}

fn ball_body() -> Body {
    Body {
        position: Vec2::ZERO,
        velocity: Vec2::ZERO,
        radius: physics::BALL_RADIUS,
        inv_mass: physics::BALL_INV_MASS,
        damping: physics::BALL_DAMPING,
        collision_group: collision::BALL | collision::KICK,
    }
}

/// Simulated session
#[derive(Debug, Clone)]
pub struct SimHost {
    players: Vec<SimPlayer>,
    ball: Option<Body>,
    tick_rate: u32,
    elapsed: f32,
    time_limit: f32,
    in_progress: bool,
    paused: bool,
    markers: HashMap<Marker, Option<f32>>,
    pub announcements: Vec<Announcement>,
    pub whispers: Vec<(PlayerId, Announcement)>,
    pub layout_restores: u32,
    next_id: PlayerId,
}

impl SimHost {
    pub fn new(tick_rate: u32, time_limit_seconds: f32) -> Self {
        Self {
            players: Vec::new(),
            ball: Some(ball_body()),
            tick_rate,
            elapsed: 0.0,
            time_limit: time_limit_seconds,
            in_progress: false,
            paused: false,
            markers: HashMap::new(),
            announcements: Vec::new(),
            whispers: Vec::new(),
            layout_restores: 0,
            next_id: 1,
        }
    }

    /// Add a player and return his id
    pub fn add_player(&mut self, name: &str, team: Team, position: Vec2) -> PlayerId {
        let id = self.next_id;
        self.next_id += 1;
        self.players.push(SimPlayer {
            id,
            name: name.to_string(),
            team,
            admin: false,
            body: player_body(team, position),
            avatar: None,
        });
        id
    }

    pub fn set_admin(&mut self, id: PlayerId, admin: bool) {
        if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
            p.admin = admin;
        }
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<PlayerInfo> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index).info())
    }

    pub fn start_match(&mut self) {
        self.in_progress = true;
        self.paused = false;
        self.elapsed = 0.0;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_elapsed(&mut self, seconds: f32) {
        self.elapsed = seconds;
    }

    pub fn remove_ball(&mut self) {
        self.ball = None;
    }

    pub fn marker(&self, marker: Marker) -> Option<f32> {
        self.markers.get(&marker).copied().flatten()
    }

    pub fn avatar(&self, id: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .and_then(|p| p.avatar.as_deref())
    }

    pub fn is_stopped(&self) -> bool {
        !self.in_progress
    }

    /// Last announcement text, if any
    pub fn last_announcement(&self) -> Option<&str> {
        self.announcements.last().map(|a| a.text.as_str())
    }

    /// Any announcement containing `needle`
    pub fn announced(&self, needle: &str) -> bool {
        self.announcements.iter().any(|a| a.text.contains(needle))
    }

    /// Advance bodies and the match clock by one tick
    pub fn step(&mut self) {
        if !self.in_progress || self.paused {
            return;
        }
        for player in &mut self.players {
            integrate(&mut player.body);
        }
        if let Some(ball) = self.ball.as_mut() {
            integrate(ball);
        }
        self.elapsed += 1.0 / self.tick_rate as f32;
    }

    fn body_mut(&mut self, body: BodyRef) -> Option<&mut Body> {
        match body {
            BodyRef::Ball => self.ball.as_mut(),
            BodyRef::Player(id) => self
                .players
                .iter_mut()
                .find(|p| p.id == id)
                .map(|p| &mut p.body),
        }
    }
}

fn integrate(body: &mut Body) {
    body.position += body.velocity;
    body.velocity = body.velocity * body.damping;
}

impl Host for SimHost {
    fn is_match_in_progress(&self) -> bool {
        self.in_progress
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    fn time_limit_seconds(&self) -> f32 {
        self.time_limit
    }

    fn players(&self) -> Vec<PlayerInfo> {
        self.players.iter().map(SimPlayer::info).collect()
    }

    fn body(&self, body: BodyRef) -> Option<Body> {
        match body {
            BodyRef::Ball => self.ball,
            BodyRef::Player(id) => self.players.iter().find(|p| p.id == id).map(|p| p.body),
        }
    }

    fn set_position(&mut self, body: BodyRef, position: Vec2) {
        if let Some(b) = self.body_mut(body) {
            b.position = position;
        }
    }

    fn set_velocity(&mut self, body: BodyRef, velocity: Vec2) {
        if let Some(b) = self.body_mut(body) {
            b.velocity = velocity;
        }
    }

    fn set_inv_mass(&mut self, body: BodyRef, inv_mass: f32) {
        if let Some(b) = self.body_mut(body) {
            b.inv_mass = inv_mass;
        }
    }

    fn set_damping(&mut self, body: BodyRef, damping: f32) {
        if let Some(b) = self.body_mut(body) {
            b.damping = damping;
        }
    }

    fn set_collision_group(&mut self, body: BodyRef, group: u32) {
        if let Some(b) = self.body_mut(body) {
            b.collision_group = group;
        }
    }

    fn set_player_team(&mut self, id: PlayerId, team: Team) {
        if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
            p.team = team;
            p.body.collision_group = collision::team_group(team);
        }
    }

    fn set_avatar(&mut self, id: PlayerId, avatar: Option<&str>) {
        if let Some(p) = self.players.iter_mut().find(|p| p.id == id) {
            p.avatar = avatar.map(str::to_string);
        }
    }

    fn set_marker(&mut self, marker: Marker, x: Option<f32>) {
        self.markers.insert(marker, x);
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn stop_match(&mut self) {
        self.in_progress = false;
    }

    fn restore_field_layout(&mut self) {
        self.layout_restores += 1;
    }

    fn announce(&mut self, message: &Announcement) {
        tracing::debug!("[announce] {}", message.text);
        self.announcements.push(message.clone());
    }

    fn whisper(&mut self, id: PlayerId, message: &Announcement) {
        tracing::debug!("[whisper {}] {}", id, message.text);
        self.whispers.push((id, message.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_integrates_with_damping() {
        let mut host = SimHost::new(60, 600.0);
        host.start_match();
        host.set_velocity(BodyRef::Ball, Vec2::new(10.0, 0.0));
        host.step();

        let ball = host.ball().expect("ball");
        assert!((ball.position.x - 10.0).abs() < 1e-4);
        assert!((ball.velocity.x - 9.9).abs() < 1e-4);
        assert!((host.elapsed_seconds() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_paused_host_does_not_move() {
        let mut host = SimHost::new(60, 600.0);
        host.start_match();
        host.set_velocity(BodyRef::Ball, Vec2::new(10.0, 0.0));
        host.pause();
        host.step();
        assert_eq!(host.ball().map(|b| b.position), Some(Vec2::ZERO));
    }

    #[test]
    fn test_players_keep_join_order() {
        let mut host = SimHost::new(60, 600.0);
        let a = host.add_player("a", Team::Red, Vec2::ZERO);
        let b = host.add_player("b", Team::Blue, Vec2::ZERO);
        let ids: Vec<_> = host.players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a, b]);

        host.remove_player(a);
        assert!(host.player(a).is_none());
        assert!(host.player(b).is_some());
    }

    #[test]
    fn test_missing_bodies_are_ignored() {
        let mut host = SimHost::new(60, 600.0);
        host.remove_ball();
        host.set_position(BodyRef::Ball, Vec2::new(1.0, 1.0));
        host.set_inv_mass(BodyRef::Player(42), 1.0);
        assert!(host.ball().is_none());
    }

    #[test]
    fn test_team_change_resets_collision_group() {
        let mut host = SimHost::new(60, 600.0);
        let id = host.add_player("a", Team::Red, Vec2::ZERO);
        host.set_player_team(id, Team::Blue);
        let body = host.body(BodyRef::Player(id)).expect("player body");
        assert_eq!(body.collision_group, collision::BLUE);
    }
}
