use std::str::FromStr;

use crate::game::constants::{physics, scrimmage};

/// Tunable rules of a match
#[derive(Debug, Clone)]
pub struct RulesConfig {
    /// Host simulation rate in Hz
    pub tick_rate: u32,
    /// Seconds after the hike during which defensive contact is a foul
    pub hike_clock_seconds: f32,
    /// Seconds the offense gets to hike once a down is set
    pub snap_deadline_seconds: f32,
    /// Seconds the quarterback may carry the ball before the hike clock expires early
    pub carry_ball_sack_seconds: f32,
    /// Seconds the offense gets to hike a try
    pub conversion_deadline_seconds: f32,
    /// Seconds for a whole field goal attempt
    pub field_goal_time_limit_seconds: f32,
    /// A defensive penalty inside this window restores it
    pub final_seconds: f32,
    /// Length of the straight-line ball projection in field units
    pub projection_horizon: f32,
    /// Goal line half-width multiplier applied to projections
    pub goal_line_tolerance: f32,
    /// Consecutive red-zone fouls before a touchdown is awarded
    pub max_red_zone_penalties: u32,
    /// Move the losing team to spectators when the match ends
    pub rotate_losing_team: bool,
    /// Shorter matches are not reported to the stats collaborator
    pub min_reported_match_seconds: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            tick_rate: physics::TICK_RATE,
            hike_clock_seconds: 12.0,
            snap_deadline_seconds: 10.0,
            carry_ball_sack_seconds: 4.0,
            conversion_deadline_seconds: 15.0,
            field_goal_time_limit_seconds: 15.0,
            final_seconds: 10.0,
            projection_horizon: 2000.0,
            goal_line_tolerance: 1.1,
            max_red_zone_penalties: scrimmage::MAX_RED_ZONE_PENALTIES,
            rotate_losing_team: true,
            min_reported_match_seconds: 60.0,
        }
    }
}

/// Read `key` from the environment, keeping `current` when missing or rejected
fn env_or<T>(key: &str, current: T, accept: impl Fn(&T) -> bool, rule: &str) -> T
where
    T: FromStr,
{
    let Ok(raw) = std::env::var(key) else {
        return current;
    };
    match raw.parse::<T>() {
        Ok(parsed) if accept(&parsed) => parsed,
        Ok(_) => {
            tracing::warn!("{} must be {}, using default", key, rule);
            current
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            current
        }
    }
}

impl RulesConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let d = Self::default();
        let positive = |v: &f32| *v > 0.0;

        Self {
            tick_rate: env_or("TICK_RATE", d.tick_rate, |v| (1..=240).contains(v), "1-240"),
            hike_clock_seconds: env_or("HIKE_CLOCK_SECONDS", d.hike_clock_seconds, positive, "> 0"),
            snap_deadline_seconds: env_or(
                "SNAP_DEADLINE_SECONDS",
                d.snap_deadline_seconds,
                positive,
                "> 0",
            ),
            carry_ball_sack_seconds: env_or(
                "CARRY_BALL_SACK_SECONDS",
                d.carry_ball_sack_seconds,
                positive,
                "> 0",
            ),
            conversion_deadline_seconds: env_or(
                "CONVERSION_DEADLINE_SECONDS",
                d.conversion_deadline_seconds,
                positive,
                "> 0",
            ),
            field_goal_time_limit_seconds: env_or(
                "FIELD_GOAL_TIME_LIMIT_SECONDS",
                d.field_goal_time_limit_seconds,
                positive,
                "> 0",
            ),
            final_seconds: env_or("FINAL_SECONDS", d.final_seconds, |v| *v >= 0.0, ">= 0"),
            projection_horizon: env_or("PROJECTION_HORIZON", d.projection_horizon, positive, "> 0"),
            goal_line_tolerance: env_or(
                "GOAL_LINE_TOLERANCE",
                d.goal_line_tolerance,
                |v| *v >= 1.0 && *v <= 3.0,
                "between 1.0 and 3.0",
            ),
            max_red_zone_penalties: env_or(
                "MAX_RED_ZONE_PENALTIES",
                d.max_red_zone_penalties,
                |v| *v > 0,
                "> 0",
            ),
            rotate_losing_team: env_or("ROTATE_LOSING_TEAM", d.rotate_losing_team, |_| true, "a bool"),
            min_reported_match_seconds: env_or(
                "MIN_REPORTED_MATCH_SECONDS",
                d.min_reported_match_seconds,
                |v| *v >= 0.0,
                ">= 0",
            ),
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate == 0 {
            return Err("tick_rate cannot be 0".to_string());
        }
        if self.projection_horizon <= 0.0 {
            return Err("projection_horizon must be positive".to_string());
        }
        if self.goal_line_tolerance < 1.0 {
            return Err("goal_line_tolerance cannot shrink the goal line".to_string());
        }
        if self.carry_ball_sack_seconds > self.hike_clock_seconds {
            return Err("carry_ball_sack_seconds cannot exceed hike_clock_seconds".to_string());
        }
        Ok(())
    }

    /// Convert seconds of match time into host ticks
    #[inline]
    pub fn seconds_to_ticks(&self, seconds: f32) -> u64 {
        (seconds * self.tick_rate as f32).round() as u64
    }

    /// Milliseconds of wall time covered by one tick
    #[inline]
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.tick_rate as f64
    }
}

/// Settings of the headless session binary
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Simulated players on each team
    pub players_per_team: usize,
    /// Match length in minutes (0 = untimed)
    pub time_limit_minutes: f32,
    /// Capacity of the host event queue
    pub event_queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            players_per_team: 4,
            time_limit_minutes: 10.0,
            event_queue_capacity: 1024,
        }
    }
}

impl SessionConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let d = Self::default();
        Self {
            players_per_team: env_or(
                "PLAYERS_PER_TEAM",
                d.players_per_team,
                |v| (1..=11).contains(v),
                "1-11",
            ),
            time_limit_minutes: env_or(
                "TIME_LIMIT_MINUTES",
                d.time_limit_minutes,
                |v| *v >= 0.0,
                ">= 0",
            ),
            event_queue_capacity: env_or(
                "EVENT_QUEUE_CAPACITY",
                d.event_queue_capacity,
                |v| *v >= 16,
                ">= 16",
            ),
        }
    }
}
