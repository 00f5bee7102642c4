use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gridiron_engine::config::{RulesConfig, SessionConfig};
use gridiron_engine::game::engine::Game;
use gridiron_engine::game::event_queue::{EventQueue, EventSender, HostEvent};
use gridiron_engine::game::host::{BodyRef, Host, PlayerId};
use gridiron_engine::game::sim_host::SimHost;
use gridiron_engine::game::state::{PlayMode, Team};
use gridiron_engine::game::stats::SharedStats;
use gridiron_engine::metrics::EngineMetrics;
use gridiron_engine::util::vec2::Vec2;

/// Seconds between metrics log lines
const METRICS_LOG_INTERVAL: u64 = 10;
/// Edge distance at which a scripted player kicks the ball
const KICK_REACH: f32 = 4.0;

/// Scripted players for the headless session: chase the ball, kick it
/// toward the opponent's goal, hike when a down is set.
struct Driver {
    rng: StdRng,
    events: EventSender,
}

impl Driver {
    fn new(events: EventSender) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            events,
        }
    }

    fn step(&mut self, host: &mut SimHost, mode: Option<PlayMode>) -> anyhow::Result<()> {
        let Some(ball) = host.ball() else {
            return Ok(());
        };

        for player in host.players() {
            if !player.team.is_playing() {
                continue;
            }
            let to_ball = ball.position - player.position;
            let jitter = Vec2::new(self.rng.gen_range(-0.3..0.3), self.rng.gen_range(-0.3..0.3));
            let push = to_ball.normalize() * 0.1 + jitter;
            host.set_velocity(BodyRef::Player(player.id), player.velocity + push);

            if player.distance_to(&ball) < KICK_REACH && self.rng.gen_bool(0.05) {
                self.kick(host, player.id, player.team)?;
            }
        }

        if mode == Some(PlayMode::WaitingHike) && self.rng.gen_bool(0.02) {
            let offense: Vec<_> = host
                .players()
                .into_iter()
                .filter(|p| p.team.is_playing())
                .collect();
            if !offense.is_empty() {
                let caller = &offense[self.rng.gen_range(0..offense.len())];
                self.events.try_send(HostEvent::Chat {
                    player: caller.id,
                    text: "hike".to_string(),
                })?;
            }
        }
        Ok(())
    }

    fn kick(&mut self, host: &mut SimHost, id: PlayerId, team: Team) -> anyhow::Result<()> {
        let power = self.rng.gen_range(4.0..9.0);
        let angle: f32 = self.rng.gen_range(-0.6..0.6);
        let velocity = Vec2::new(angle.cos() * team.attack_sign(), angle.sin()) * power;
        host.set_velocity(BodyRef::Ball, velocity);
        self.events.try_send(HostEvent::BallKicked { player: id })?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Gridiron Engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let rules = RulesConfig::load_or_default();
    rules.validate().map_err(anyhow::Error::msg)?;
    let session = SessionConfig::load_or_default();
    info!(
        "Configuration loaded: {} Hz, {} per team, {} min",
        rules.tick_rate, session.players_per_team, session.time_limit_minutes
    );

    let metrics = Arc::new(EngineMetrics::new());
    let queue = EventQueue::new(session.event_queue_capacity);
    let mut driver = Driver::new(queue.sender());

    let mut host = SimHost::new(rules.tick_rate, session.time_limit_minutes * 60.0);
    for i in 0..session.players_per_team {
        let y = -120.0 + 240.0 * i as f32 / session.players_per_team.max(1) as f32;
        host.add_player(&format!("red{}", i + 1), Team::Red, Vec2::new(-200.0, y));
        host.add_player(&format!("blue{}", i + 1), Team::Blue, Vec2::new(200.0, y));
    }

    let stats = SharedStats::new();
    let tick_period = Duration::from_secs_f64(rules.tick_ms() / 1000.0);
    let mut game = Game::new(rules, Box::new(stats.clone())).with_metrics(metrics.clone());

    host.start_match();
    // Match id is assigned when this event is drained on the first tick
    queue.sender().try_send(HostEvent::MatchStarted)?;

    let mut interval = tokio::time::interval(tick_period);
    let mut last_metrics_log = Instant::now();

    // Shutdown signal handler
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let started = Instant::now();

                for event in queue.drain() {
                    game.handle_event(&mut host, event);
                }
                host.step();
                game.on_tick(&mut host);
                if let Err(e) = driver.step(&mut host, game.mode()) {
                    warn!("Driver dropped an event: {}", e);
                }

                metrics.record_tick_time(started.elapsed());

                if last_metrics_log.elapsed().as_secs() >= METRICS_LOG_INTERVAL {
                    info!("Metrics: {}", metrics.to_json());
                    last_metrics_log = Instant::now();
                }

                if host.is_stopped() {
                    game.on_match_stopped(&mut host, None);
                    info!("Match over: {}", game.state.score_line());
                    break;
                }
            }
            result = &mut shutdown => {
                result?;
                info!("Shutdown signal received");
                game.on_match_stopped(&mut host, None);
                break;
            }
        }
    }

    debug!("Final metrics:\n{}", metrics.to_prometheus());
    info!(
        "Session stopped after {}s (match {})",
        metrics.uptime_seconds(),
        game.match_id()
    );
    Ok(())
}
