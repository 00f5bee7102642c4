//! Shared fixtures for the engine tests

use crate::config::RulesConfig;
use crate::game::engine::Game;
use crate::game::geometry::FieldPosition;
use crate::game::host::{BodyRef, Host, PlayerId};
use crate::game::sim_host::SimHost;
use crate::game::state::Team;
use crate::game::stats::SharedStats;
use crate::game::timer::DownSetup;
use crate::util::vec2::Vec2;

pub struct Fixture {
    pub game: Game,
    pub host: SimHost,
    pub stats: SharedStats,
    pub red: Vec<PlayerId>,
    pub blue: Vec<PlayerId>,
}

/// Four players a side, match started, opening kickoff set for Red
pub fn fixture() -> Fixture {
    let mut host = SimHost::new(60, 600.0);
    let mut red = Vec::new();
    let mut blue = Vec::new();
    for i in 0..4 {
        let y = -90.0 + 60.0 * i as f32;
        red.push(host.add_player(&format!("red{}", i + 1), Team::Red, Vec2::new(-200.0, y)));
    }
    for i in 0..4 {
        let y = -90.0 + 60.0 * i as f32;
        blue.push(host.add_player(&format!("blue{}", i + 1), Team::Blue, Vec2::new(200.0, y)));
    }
    host.start_match();

    let stats = SharedStats::new();
    let mut game = Game::new(RulesConfig::default(), Box::new(stats.clone()));
    game.on_match_started(&mut host);

    Fixture {
        game,
        host,
        stats,
        red,
        blue,
    }
}

/// Step the host and run the engine `n` times
pub fn tick_n(game: &mut Game, host: &mut SimHost, n: u64) {
    for _ in 0..n {
        host.step();
        game.on_tick(host);
    }
}

/// Set a quiet down: `down` and `distance` for `team` at `pos`
pub fn down_at(game: &mut Game, host: &mut SimHost, team: Team, pos: FieldPosition, down: u8, distance: i32) {
    game.state.team_with_ball = team;
    game.state.ball_position = pos;
    game.state.down_count = down.saturating_sub(1);
    game.state.distance = distance;
    game.state.goal_mode = false;
    game.set_down(host, DownSetup::new().quiet());
}

/// Teleport a player and stop him
pub fn move_player(host: &mut SimHost, id: PlayerId, position: Vec2) {
    host.set_position(BodyRef::Player(id), position);
    host.set_velocity(BodyRef::Player(id), Vec2::ZERO);
}

/// Ticks needed for a `ms` timer to fire
pub fn ms_ticks(ms: u64) -> u64 {
    ms * 60 / 1000 + 1
}
