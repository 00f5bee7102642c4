/// Field layout, in field units. Red defends the negative-x end and attacks toward +x.
pub mod field {
    /// Field units per yard
    pub const YARD: f32 = 10.0;
    /// Absolute x of each goal line (the 0-yard mark)
    pub const GOAL_LINE_X: f32 = 500.0;
    /// Depth of each end zone in yards
    pub const END_ZONE_YARDS: i32 = 10;
    /// Absolute x of each end line (back of the end zone)
    pub const END_LINE_X: f32 = GOAL_LINE_X + END_ZONE_YARDS as f32 * YARD;
    /// Absolute y of each sideline
    pub const SIDELINE_Y: f32 = 270.0;
    /// Goal posts stand on the end line
    pub const GOAL_POST_X: f32 = END_LINE_X;
    /// Half distance between the goal posts
    pub const GOAL_POST_HALF_WIDTH: f32 = 60.0;
    /// Yards from either goal line to midfield
    pub const MIDFIELD_YARDS: i32 = 50;
    /// A position this close to the defending goal line is inside the red zone
    pub const RED_ZONE_YARDS: i32 = 20;
    /// Teams larger than this have their sideline loiterers corrected on repositioning
    pub const SIDELINE_CORRECTION_TEAM_SIZE: usize = 4;
}

/// Body physics values used as game-state signals
pub mod physics {
    /// Default tick rate of the host simulation in Hz
    pub const TICK_RATE: u32 = 60;
    /// Ball inverse mass while "locked" (players cannot redirect it)
    pub const BALL_LOCKED_INV_MASS: f32 = 0.000_001;
    /// Ball inverse mass during normal play
    pub const BALL_INV_MASS: f32 = 1.0;
    /// Ball inverse mass while waiting for a kickoff (heavier kick)
    pub const KICKOFF_BALL_INV_MASS: f32 = 1.2;
    /// Player inverse mass during normal play
    pub const PLAYER_INV_MASS: f32 = 0.5;
    /// Player inverse mass while the ball must not be pushed around
    pub const PLAYER_WEIGHTLESS_INV_MASS: f32 = 1e26;
    /// Per-tick velocity retention of the ball
    pub const BALL_DAMPING: f32 = 0.99;
    /// Damping for a deflected ball travelling slowly
    pub const BALL_DAMPING_HIGH: f32 = 0.995;
    /// Damping for a deflected ball travelling fast
    pub const BALL_DAMPING_HIGHEST: f32 = 0.998;
    /// Per-tick velocity retention of players
    pub const PLAYER_DAMPING: f32 = 0.96;
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const BALL_RADIUS: f32 = 6.0;
    /// Edge distance counting as contact (touch, tackle, return)
    pub const CONTACT_DISTANCE: f32 = 0.5;
}

/// Scrimmage (down) rules
pub mod scrimmage {
    /// Yards to gain for a new first down
    pub const FIRST_DOWN_DISTANCE: i32 = 20;
    /// The ball sits this many yards behind the line of scrimmage before the hike
    pub const YARDS_BALL_BEHIND: f32 = 2.0;
    /// Defender crossing the line of scrimmage before the hike clock expires
    pub const TRESPASSING_PENALTY: i32 = 10;
    /// Defender lingering in the neutral zone
    pub const INVASION_PENALTY: i32 = 10;
    /// Defender touching the ball before the hike clock expires
    pub const ILLEGAL_TOUCH_PENALTY: i32 = 10;
    pub const HOLDING_PENALTY: i32 = -5;
    pub const QB_PASSED_LINE_PENALTY: i32 = -5;
    /// Offensive player other than the quarterback touching the ball after the hike
    pub const OFFENSE_ILLEGAL_TOUCH_PENALTY: i32 = -5;
    /// Consecutive red-zone defensive fouls before a touchdown is awarded
    pub const MAX_RED_ZONE_PENALTIES: u32 = 3;
    /// Edge distance from the ball within which a hike is accepted
    pub const HIKE_DISTANCE: f32 = 50.0;
    /// Ticks after a down is set before a defensive touch counts as illegal
    pub const ILLEGAL_TOUCH_GRACE_TICKS: u64 = 30;
    /// Ball displacement marking that the quarterback carried it
    pub const BALL_MOVED_DISTANCE: f32 = 1.0;
    /// Quarterback this far from the ball after the hike clock is running it
    pub const QB_RUN_DISTANCE: f32 = 100.0;
    /// Teammate edge distance to the quarterback counting as a hand-off
    pub const HANDOFF_DISTANCE: f32 = 0.1;
    /// Edge distance band for holding detection
    pub const HOLDING_DISTANCE: f32 = 1.5;
    /// Defender edge distance to the ball counting as a block
    pub const BLOCKING_DISTANCE: f32 = 0.2;
    /// Blocking defender moving this far from the ball ends the pass
    pub const BLOCK_RELEASE_DISTANCE: f32 = 5.0;
    /// Delay before a blocked ball is ruled a defended pass
    pub const BLOCK_CHECK_MS: u64 = 100;
    /// Delay between a defended pass and the next down
    pub const BLOCKED_PASS_RESET_MS: u64 = 1500;
    /// Ball speed below which an interception attempt fails
    pub const INTERCEPTION_FAILED_SPEED: f32 = 0.1;
    /// Deflections slower than this get the high damping preset
    pub const INTERCEPTION_MIN_SPEED: f32 = 3.0;
    /// Deflections faster than this get the highest damping preset
    pub const INTERCEPTION_HIGHEST_DAMPING_SPEED: f32 = 6.0;
    /// Depth of the neutral zone beyond the line of scrimmage
    pub const INVASION_ZONE_YARDS: f32 = 3.0;
    /// Time a defender may stay in the neutral zone
    pub const INVASION_TIMEOUT_MS: u64 = 1500;
    /// Ticks a punter gets to kick an automatic punt
    pub const AUTO_PUNT_KICK_TICKS: u64 = 600;
    /// Yards to go above which a down converts into a punt, per down
    pub const AUTO_PUNT_MAX_DISTANCE: [i32; 4] = [30, 30, 30, 25];
    /// Length of the line each side is spread along
    pub const PLAYER_LINE_LENGTH: f32 = 110.0;
    /// y of the cornerbacks once a side has three defenders
    pub const CORNERBACK_Y: f32 = 100.0;
    pub const OFFENSE_SPAWN_YARDS: f32 = 12.0;
    pub const DEFENSE_SPAWN_YARDS: f32 = 10.0;
    pub const CORNERBACK_SPAWN_YARDS: f32 = 6.0;
}

/// Shared kick family constants
pub mod kick {
    /// Kicking team players ahead of the ball at the kick are pushed this far back
    pub const INVADER_PUSH_BACK: f32 = 80.0;
    pub const INVADER_PUSH_SPEED: f32 = 5.0;
    /// Pushed invaders are clamped inside this |y|
    pub const INVADER_MAX_Y: f32 = 100.0;
    /// Ticks a punter gets before the punt is forfeited
    pub const PUNT_MAX_KICK_TICKS: u64 = 300;
    /// Ticks the safety kicker gets
    pub const SAFETY_MAX_KICK_TICKS: u64 = 300;
    /// Ticks between kickoff setup and the kick before stoppage time accrues
    pub const KICKOFF_STALL_TICKS: u64 = 600;
    /// Absolute x of the kicking team at a kickoff
    pub const KICKOFF_KICKING_X: f32 = 100.0;
    /// Absolute x of the kicking team at the opening kickoff
    pub const KICKOFF_OPENING_X: f32 = 450.0;
    /// Absolute x of the receiving team at a kickoff
    pub const KICKOFF_RECEIVING_X: f32 = 350.0;
    pub const KICKOFF_LINE_LENGTH: f32 = 200.0;
    /// Punting team stands this far behind the ball
    pub const PUNT_KICKING_BACK: f32 = 100.0;
    /// Absolute x of the receiving team at a punt
    pub const PUNT_RECEIVING_X: f32 = 400.0;
    pub const PUNT_KICKING_LINE_LENGTH: f32 = 100.0;
    pub const PUNT_RECEIVING_LINE_LENGTH: f32 = 200.0;
    /// Safety kick is taken from the conceding team's own 20
    pub const SAFETY_KICK_YARDS: i32 = 20;
    /// Ticks after the kick during which the kicker may still touch the ball
    pub const KICKER_GRACE_TICKS: u64 = 10;
}

/// Onside kick
pub mod onside {
    /// Ball spot, in yards from the kicking team's goal line
    pub const BALL_YARDS: i32 = 40;
    /// Kicking team lines up this many yards behind the ball
    pub const KICKING_TEAM_BACK_YARDS: f32 = 3.0;
    /// Kicker stands this many yards behind the ball
    pub const KICKER_BACK_YARDS: f32 = 5.0;
    /// Receiving team lines up this many yards ahead of the ball
    pub const RECEIVING_TEAM_YARDS: f32 = 12.0;
    /// Ticks after the kick during which a backward ball fails the attempt
    pub const DIRECTION_CHECK_TICKS: u64 = 10;
    /// The kicker may only recover once the ball has gone this far
    pub const MIN_FORWARD_YARDS: f32 = 10.0;
    pub const MAX_KICK_TICKS: u64 = 300;
    /// Spot given to the receiving team after a failed onside kick, from the kicking team's goal line
    pub const FAILED_SPOT_YARDS: i32 = 40;
}

/// Field goal attempt
pub mod field_goal {
    pub const POINTS: u32 = 3;
    /// Offense lines up this many yards from the ball toward the goal
    pub const OFFENSE_YARDS: f32 = 10.0;
    /// Defense lines up this many yards from the ball toward the goal
    pub const DEFENSE_YARDS: f32 = 15.0;
    pub const OFFENSE_MAX_X: f32 = 1000.0;
    pub const DEFENSE_MAX_X: f32 = 900.0;
    pub const KICKER_Y: f32 = 30.0;
    pub const LINE_LENGTH: f32 = 100.0;
    /// Edge distance the ball may drift from its placement
    pub const MAX_BALL_DRIFT: f32 = 8.5;
    /// Time the ball may stay displaced before the attempt fails
    pub const MAX_BALL_DRIFT_MS: u64 = 1000;
    /// Longest attempt allowed, in yards to the posts
    pub const MAX_DISTANCE_YARDS: i32 = 48;
    /// Longest attempt considered safe (auto-punt threshold)
    pub const MAX_SAFE_DISTANCE_YARDS: i32 = 46;
    /// Kicker may not drift more than this many yards behind the ball
    pub const MAX_KICKER_BACK_YARDS: f32 = 10.0;
    /// Ticks after setup during which the kicker may not run past the ball
    pub const NO_RUSH_TICKS: u64 = 60;
    /// Edge distance counting as touching the held ball
    pub const TOUCH_DISTANCE: f32 = 0.1;
    pub const TACKLE_DISTANCE: f32 = 0.5;
    /// Ball slower than this after the kick is a miss
    pub const MISS_SPEED: f32 = 0.02;
    /// Delay before possession flips after a miss
    pub const FAILED_RESET_MS: u64 = 2000;
    /// Delay before possession flips after a foul
    pub const FOUL_RESET_MS: u64 = 1000;
}

/// Match clock
pub mod clock {
    /// Delay between a score and the following kickoff or try
    pub const SCORE_RESET_MS: u64 = 3000;
    pub const DEFAULT_TIME_LIMIT_SECONDS: f32 = 600.0;
}

/// Points
pub mod scoring {
    pub const TOUCHDOWN: u32 = 6;
    pub const CONVERSION: u32 = 2;
    pub const SAFETY: u32 = 2;
    /// Try is snapped from this many yards off the goal line
    pub const CONVERSION_YARDS: i32 = 10;
    /// Interception returner downed in his own end zone without leaving it
    pub const TOUCHBACK_YARDS: i32 = 20;
}
