//! Field geometry
//!
//! Conversions between one-dimensional field positions ("Red 35") and field
//! coordinates, plus the line and projection helpers the rules are built on.
//!
//! Red defends the goal at negative x and attacks toward positive x. The
//! absolute yard line of a position is measured from Red's goal line, so it
//! runs from 0 (Red goal line) through 50 (midfield) to 100 (Blue goal line).

use serde::{Deserialize, Serialize};

use crate::game::constants::field;
use crate::game::state::Team;
use crate::util::vec2::{segment_intersection, Vec2};

/// Position on the field in yards from `team`'s own goal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPosition {
    pub team: Team,
    pub yards: i32,
}

impl FieldPosition {
    #[inline]
    pub fn new(team: Team, yards: i32) -> Self {
        Self { team, yards }
    }

    /// Yard line measured from Red's goal line
    pub fn absolute(&self) -> i32 {
        match self.team {
            Team::Blue => 2 * field::MIDFIELD_YARDS - self.yards,
            _ => self.yards,
        }
    }

    /// Inverse of [`FieldPosition::absolute`]. Midfield belongs to Red.
    pub fn from_absolute(absolute: i32) -> Self {
        if absolute <= field::MIDFIELD_YARDS {
            Self::new(Team::Red, absolute)
        } else {
            Self::new(Team::Blue, 2 * field::MIDFIELD_YARDS - absolute)
        }
    }

    /// Field x coordinate of this yard line
    #[inline]
    pub fn to_x(&self) -> f32 {
        (self.absolute() - field::MIDFIELD_YARDS) as f32 * field::YARD
    }

    /// Field point on this yard line
    #[inline]
    pub fn to_point(&self, y: f32) -> Vec2 {
        Vec2::new(self.to_x(), y)
    }

    /// Nearest yard line to a field x coordinate
    pub fn from_x(x: f32) -> Self {
        let absolute = (x / field::YARD).round() as i32 + field::MIDFIELD_YARDS;
        Self::from_absolute(absolute)
    }

    /// Yards from `team`'s own goal line, whichever side the position is labelled with
    pub fn yards_from(&self, team: Team) -> i32 {
        match team {
            Team::Blue => 2 * field::MIDFIELD_YARDS - self.absolute(),
            _ => self.absolute(),
        }
    }

    /// Move `yards` toward the goal `team` attacks (negative moves back)
    pub fn advanced(&self, yards: i32, team: Team) -> Self {
        Self::from_absolute(self.absolute() + yards * team.attack_sign() as i32)
    }

    /// Yards `team` gained moving from `from` to `to`
    pub fn gain(from: FieldPosition, to: FieldPosition, team: Team) -> i32 {
        (to.absolute() - from.absolute()) * team.attack_sign() as i32
    }

    /// Yards left to the goal line `attacking` scores on
    #[inline]
    pub fn yards_to_end_zone(&self, attacking: Team) -> i32 {
        self.yards_from(attacking.opponent())
    }

    /// Inside the red zone of the team defending `defending`'s goal
    #[inline]
    pub fn is_in_red_zone(&self, defending: Team) -> bool {
        self.yards_from(defending) <= field::RED_ZONE_YARDS
    }
}

/// Goal post segment on the side of the field the ball travels toward.
/// `direction` is the sign of the ball's x velocity.
pub fn goal_posts(direction: f32, tolerance: f32) -> (Vec2, Vec2) {
    let x = field::GOAL_POST_X * direction.signum();
    let half = field::GOAL_POST_HALF_WIDTH * tolerance;
    (Vec2::new(x, -half), Vec2::new(x, half))
}

/// Goal line on the side of the field `direction` points to, widened by `tolerance`
pub fn goal_line(direction: f32, tolerance: f32) -> (Vec2, Vec2) {
    let x = field::GOAL_LINE_X * direction.signum();
    let half = field::SIDELINE_Y * tolerance;
    (Vec2::new(x, -half), Vec2::new(x, half))
}

/// Goal posts `attacking` kicks through
pub fn target_posts(attacking: Team, tolerance: f32) -> (Vec2, Vec2) {
    goal_posts(attacking.attack_sign(), tolerance)
}

/// Straight-line extension of the motion `origin -> current` to `horizon` units
pub fn project_path(origin: Vec2, current: Vec2, horizon: f32) -> Option<(Vec2, Vec2)> {
    let direction = (current - origin).normalize();
    if direction == Vec2::ZERO {
        return None;
    }
    Some((origin, origin + direction * horizon))
}

/// Point where the projected ball path crosses the given goal post segment
pub fn projection_hits(
    origin: Vec2,
    current: Vec2,
    horizon: f32,
    posts: (Vec2, Vec2),
) -> Option<Vec2> {
    let (start, end) = project_path(origin, current, horizon)?;
    segment_intersection(start, end, posts.0, posts.1)
}

/// Ball is beyond the posts `attacking` kicks through and between the uprights
pub fn ball_passed_posts(ball: Vec2, attacking: Team) -> bool {
    let beyond = match attacking {
        Team::Red => ball.x > field::GOAL_POST_X,
        Team::Blue => ball.x < -field::GOAL_POST_X,
        Team::Spectators => false,
    };
    beyond && ball.y.abs() <= field::GOAL_POST_HALF_WIDTH
}

/// Outside the playing field. A negative `margin` shrinks the field
/// (a ball counts as out once its edge touches the line).
#[inline]
pub fn is_out_of_bounds(position: Vec2, margin: f32) -> bool {
    position.x.abs() > field::END_LINE_X + margin || position.y.abs() > field::SIDELINE_Y + margin
}

/// Outside the sidelines only
#[inline]
pub fn is_outside_sidelines(position: Vec2) -> bool {
    position.y.abs() > field::SIDELINE_Y
}

/// Beyond the goal line `team` defends
pub fn is_in_own_end_zone(position: Vec2, team: Team) -> bool {
    match team {
        Team::Red => position.x < -field::GOAL_LINE_X,
        Team::Blue => position.x > field::GOAL_LINE_X,
        Team::Spectators => false,
    }
}

/// Beyond the goal line `team` attacks
#[inline]
pub fn is_in_scoring_end_zone(position: Vec2, team: Team) -> bool {
    is_in_own_end_zone(position, team.opponent())
}

/// `count` points evenly spaced from `from` to `to`, ends included.
/// A single point sits in the middle.
pub fn points_along_line(from: Vec2, to: Vec2, count: usize) -> Vec<Vec2> {
    match count {
        0 => Vec::new(),
        1 => vec![from.lerp(to, 0.5)],
        n => (0..n)
            .map(|i| from.lerp(to, i as f32 / (n - 1) as f32))
            .collect(),
    }
}

/// Clamp an x coordinate between the two goal lines
#[inline]
pub fn clamp_to_field_of_play(x: f32) -> f32 {
    x.clamp(-field::GOAL_LINE_X, field::GOAL_LINE_X)
}

/// Distance between the edges of two discs
#[inline]
pub fn edge_distance(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> f32 {
    a.distance_to(b) - a_radius - b_radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_yard_lines() {
        assert_eq!(FieldPosition::new(Team::Red, 25).absolute(), 25);
        assert_eq!(FieldPosition::new(Team::Blue, 25).absolute(), 75);
        assert_eq!(FieldPosition::new(Team::Blue, 50).absolute(), 50);
    }

    #[test]
    fn test_to_x() {
        assert_eq!(FieldPosition::new(Team::Red, 0).to_x(), -field::GOAL_LINE_X);
        assert_eq!(FieldPosition::new(Team::Blue, 0).to_x(), field::GOAL_LINE_X);
        assert_eq!(FieldPosition::new(Team::Red, 50).to_x(), 0.0);
        assert_eq!(FieldPosition::new(Team::Red, 35).to_x(), -150.0);
    }

    #[test]
    fn test_round_trip_through_coordinates() {
        for team in [Team::Red, Team::Blue] {
            for yards in 0..=50 {
                let position = FieldPosition::new(team, yards);
                let back = FieldPosition::from_x(position.to_x());
                assert_eq!(back.absolute(), position.absolute());
                assert!((back.to_x() - position.to_x()).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_from_x_rounds_to_nearest_yard() {
        assert_eq!(FieldPosition::from_x(-146.0), FieldPosition::new(Team::Red, 35));
        assert_eq!(FieldPosition::from_x(204.0), FieldPosition::new(Team::Blue, 30));
    }

    #[test]
    fn test_advanced_and_gain() {
        let start = FieldPosition::new(Team::Red, 25);
        let moved = start.advanced(10, Team::Red);
        assert_eq!(moved, FieldPosition::new(Team::Red, 35));
        assert_eq!(FieldPosition::gain(start, moved, Team::Red), 10);
        assert_eq!(FieldPosition::gain(start, moved, Team::Blue), -10);

        let crossing = FieldPosition::new(Team::Red, 45).advanced(10, Team::Red);
        assert_eq!(crossing, FieldPosition::new(Team::Blue, 45));

        let back = FieldPosition::new(Team::Blue, 30).advanced(-5, Team::Blue);
        assert_eq!(back, FieldPosition::new(Team::Blue, 25));
    }

    #[test]
    fn test_red_zone_and_end_zone_distance() {
        let position = FieldPosition::new(Team::Blue, 18);
        assert!(position.is_in_red_zone(Team::Blue));
        assert!(!position.is_in_red_zone(Team::Red));
        assert_eq!(position.yards_to_end_zone(Team::Red), 18);
        assert_eq!(position.yards_to_end_zone(Team::Blue), 82);
    }

    #[test]
    fn test_points_along_line() {
        let from = Vec2::new(0.0, 110.0);
        let to = Vec2::new(0.0, -110.0);
        assert!(points_along_line(from, to, 0).is_empty());
        assert_eq!(points_along_line(from, to, 1), vec![Vec2::ZERO]);

        let three = points_along_line(from, to, 3);
        assert_eq!(three.len(), 3);
        assert_eq!(three[0], from);
        assert_eq!(three[1], Vec2::ZERO);
        assert_eq!(three[2], to);
    }

    #[test]
    fn test_projection_hits_posts() {
        let posts = target_posts(Team::Red, 1.1);
        let hit = projection_hits(Vec2::new(300.0, 0.0), Vec2::new(310.0, 1.0), 2000.0, posts);
        assert!(hit.is_some());

        let wide = projection_hits(Vec2::new(300.0, 0.0), Vec2::new(310.0, 5.0), 2000.0, posts);
        assert!(wide.is_none());

        let backwards = projection_hits(Vec2::new(300.0, 0.0), Vec2::new(290.0, 0.0), 2000.0, posts);
        assert!(backwards.is_none());
    }

    #[test]
    fn test_projection_needs_motion() {
        let posts = target_posts(Team::Blue, 1.1);
        assert!(projection_hits(Vec2::ZERO, Vec2::ZERO, 2000.0, posts).is_none());
    }

    #[test]
    fn test_ball_passed_posts() {
        assert!(ball_passed_posts(Vec2::new(605.0, 10.0), Team::Red));
        assert!(!ball_passed_posts(Vec2::new(605.0, 70.0), Team::Red));
        assert!(!ball_passed_posts(Vec2::new(605.0, 10.0), Team::Blue));
        assert!(ball_passed_posts(Vec2::new(-601.0, -59.0), Team::Blue));
    }

    #[test]
    fn test_end_zones_and_bounds() {
        assert!(is_in_own_end_zone(Vec2::new(-520.0, 0.0), Team::Red));
        assert!(is_in_scoring_end_zone(Vec2::new(-520.0, 0.0), Team::Blue));
        assert!(!is_in_own_end_zone(Vec2::new(-480.0, 0.0), Team::Red));
        assert!(is_out_of_bounds(Vec2::new(0.0, 275.0), 0.0));
        assert!(is_out_of_bounds(Vec2::new(0.0, 268.0), -6.0));
        assert!(!is_out_of_bounds(Vec2::new(0.0, 260.0), -6.0));
    }
}
