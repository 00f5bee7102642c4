//! Physics/session host surface
//!
//! The engine never simulates anything itself. It reads bodies from and writes
//! bodies to whatever implements [`Host`], and talks to players through it.

use serde::{Deserialize, Serialize};

use crate::game::geometry::edge_distance;
use crate::game::state::Team;
use crate::util::vec2::Vec2;

/// Host-assigned player identifier
pub type PlayerId = u32;

/// Collision group bits understood by the host
pub mod collision {
    use super::Team;

    pub const BALL: u32 = 1;
    pub const RED: u32 = 2;
    pub const BLUE: u32 = 4;
    pub const WALL: u32 = 32;
    pub const KICK: u32 = 64;
    /// Custom groups used by the field barriers
    pub const C0: u32 = 1 << 28;
    pub const C1: u32 = 1 << 29;
    pub const C2: u32 = 1 << 30;
    pub const C3: u32 = 1 << 31;

    /// Base group of a team's players
    pub fn team_group(team: Team) -> u32 {
        match team {
            Team::Red => RED,
            Team::Blue => BLUE,
            Team::Spectators => 0,
        }
    }
}

/// Snapshot of a player as seen by the host
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub admin: bool,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl PlayerInfo {
    /// Edge-to-edge distance to a body
    #[inline]
    pub fn distance_to(&self, body: &Body) -> f32 {
        edge_distance(self.position, self.radius, body.position, body.radius)
    }

    /// Edge-to-edge distance to another player
    #[inline]
    pub fn distance_to_player(&self, other: &PlayerInfo) -> f32 {
        edge_distance(self.position, self.radius, other.position, other.radius)
    }

    #[inline]
    pub fn body_ref(&self) -> BodyRef {
        BodyRef::Player(self.id)
    }
}

/// Physical state of a disc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub inv_mass: f32,
    pub damping: f32,
    pub collision_group: u32,
}

impl Body {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Edge-to-edge distance to a point-sized disc of `radius` at `position`
    #[inline]
    pub fn distance_to_point(&self, position: Vec2, radius: f32) -> f32 {
        edge_distance(self.position, self.radius, position, radius)
    }
}

/// Addressable bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyRef {
    Ball,
    Player(PlayerId),
}

/// Field line markers drawn by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    BallLine,
    FirstDownLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    LightGreen,
    LimeGreen,
    MediumSeaGreen,
    Yellow,
    Orange,
    Tomato,
    Red,
    DeepSkyBlue,
    Cyan,
    Pink,
    Gold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Style {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sound {
    #[default]
    None,
    Notification,
    /// Distinct tone for rejections and warnings
    Warning,
}

/// Formatted chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub text: String,
    pub color: Color,
    pub style: Style,
    pub sound: Sound,
}

impl Announcement {
    /// Bold message without sound, the default for rule events
    pub fn bold(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
            style: Style::Bold,
            sound: Sound::None,
        }
    }

    /// Bold message with the notification sound
    pub fn alert(text: impl Into<String>, color: Color) -> Self {
        Self {
            sound: Sound::Notification,
            ..Self::bold(text, color)
        }
    }

    /// Bold message with the warning sound
    pub fn warning(text: impl Into<String>, color: Color) -> Self {
        Self {
            sound: Sound::Warning,
            ..Self::bold(text, color)
        }
    }
}

/// Query and mutation surface of the physics/session host.
///
/// Missing bodies (a player who just left, no ball during teardown) are
/// reported as `None` by the queries and ignored by the mutators.
pub trait Host {
    fn is_match_in_progress(&self) -> bool;
    fn is_paused(&self) -> bool;
    /// Match seconds elapsed as reported by the host
    fn elapsed_seconds(&self) -> f32;
    /// Configured match length in seconds (0 = untimed)
    fn time_limit_seconds(&self) -> f32;

    /// All connected players, in a stable order
    fn players(&self) -> Vec<PlayerInfo>;

    fn player(&self, id: PlayerId) -> Option<PlayerInfo> {
        self.players().into_iter().find(|p| p.id == id)
    }

    fn body(&self, body: BodyRef) -> Option<Body>;

    fn ball(&self) -> Option<Body> {
        self.body(BodyRef::Ball)
    }

    fn set_position(&mut self, body: BodyRef, position: Vec2);
    fn set_velocity(&mut self, body: BodyRef, velocity: Vec2);
    fn set_inv_mass(&mut self, body: BodyRef, inv_mass: f32);
    fn set_damping(&mut self, body: BodyRef, damping: f32);
    fn set_collision_group(&mut self, body: BodyRef, group: u32);
    fn set_player_team(&mut self, id: PlayerId, team: Team);
    fn set_avatar(&mut self, id: PlayerId, avatar: Option<&str>);
    /// Move a field marker to `x`, or hide it
    fn set_marker(&mut self, marker: Marker, x: Option<f32>);

    fn pause(&mut self);
    fn stop_match(&mut self);
    /// Put the default field layout back
    fn restore_field_layout(&mut self);

    fn announce(&mut self, message: &Announcement);
    fn whisper(&mut self, id: PlayerId, message: &Announcement);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_distance_between_player_and_ball() {
        let player = PlayerInfo {
            id: 1,
            name: "qb".to_string(),
            team: Team::Red,
            admin: false,
            position: Vec2::new(0.0, 0.0),
            velocity: Vec2::ZERO,
            radius: 15.0,
        };
        let ball = Body {
            position: Vec2::new(21.5, 0.0),
            velocity: Vec2::ZERO,
            radius: 6.0,
            inv_mass: 1.0,
            damping: 0.99,
            collision_group: collision::BALL,
        };
        assert!((player.distance_to(&ball) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_announcement_presets() {
        let warning = Announcement::warning("no", Color::Tomato);
        assert_eq!(warning.sound, Sound::Warning);
        assert_eq!(warning.style, Style::Bold);
        assert_eq!(Announcement::bold("ok", Color::Yellow).sound, Sound::None);
    }

    #[test]
    fn test_team_groups() {
        assert_eq!(collision::team_group(Team::Red), collision::RED);
        assert_eq!(collision::team_group(Team::Blue), collision::BLUE);
        assert_eq!(collision::C3, 0x8000_0000);
    }
}
