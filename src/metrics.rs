//! Engine metrics
//!
//! Counters are bumped from the game loop and may be read from any thread.
//! Rendered in Prometheus text format or as JSON for the periodic log line.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

/// Tick durations kept for percentiles
const TICK_WINDOW: usize = 1000;

#[derive(Debug)]
pub struct EngineMetrics {
    pub engine_ticks: AtomicU64,
    pub downs_set: AtomicU64,
    pub penalties: AtomicU64,
    pub scores: AtomicU64,
    pub points: AtomicU64,
    pub commands_rejected: AtomicU64,
    pub stats_failures: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,

    start_time: Instant,
    tick_history: RwLock<VecDeque<u64>>,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub engine_ticks: u64,
    pub downs_set: u64,
    pub penalties: u64,
    pub scores: u64,
    pub points: u64,
    pub commands_rejected: u64,
    pub stats_failures: u64,
    pub tick_time_us: u64,
    pub tick_time_p95_us: u64,
    pub tick_time_p99_us: u64,
    pub tick_time_max_us: u64,
    pub uptime_seconds: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            engine_ticks: AtomicU64::new(0),
            downs_set: AtomicU64::new(0),
            penalties: AtomicU64::new(0),
            scores: AtomicU64::new(0),
            points: AtomicU64::new(0),
            commands_rejected: AtomicU64::new(0),
            stats_failures: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_WINDOW)),
        }
    }

    #[inline]
    pub fn record_engine_tick(&self) {
        self.engine_ticks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_down(&self) {
        self.downs_set.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_penalty(&self) {
        self.penalties.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_score(&self, points: u32) {
        self.scores.fetch_add(1, Ordering::Relaxed);
        self.points.fetch_add(u64::from(points), Ordering::Relaxed);
    }

    #[inline]
    pub fn record_command_rejected(&self) {
        self.commands_rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_stats_failure(&self) {
        self.stats_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long a whole loop iteration took and refresh percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_WINDOW {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();
            let last = sorted.len() - 1;
            let p95 = ((sorted.len() as f32 * 0.95) as usize).min(last);
            let p99 = ((sorted.len() as f32 * 0.99) as usize).min(last);
            self.tick_time_p95_us.store(sorted[p95], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted[last], Ordering::Relaxed);
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            engine_ticks: self.engine_ticks.load(Ordering::Relaxed),
            downs_set: self.downs_set.load(Ordering::Relaxed),
            penalties: self.penalties.load(Ordering::Relaxed),
            scores: self.scores.load(Ordering::Relaxed),
            points: self.points.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
            stats_failures: self.stats_failures.load(Ordering::Relaxed),
            tick_time_us: self.tick_time_us.load(Ordering::Relaxed),
            tick_time_p95_us: self.tick_time_p95_us.load(Ordering::Relaxed),
            tick_time_p99_us: self.tick_time_p99_us.load(Ordering::Relaxed),
            tick_time_max_us: self.tick_time_max_us.load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    /// Prometheus text exposition format
    pub fn to_prometheus(&self) -> String {
        let s = self.snapshot();
        let mut output = String::with_capacity(2048);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("gridiron_ticks_total", "Engine ticks processed", "counter", s.engine_ticks);
        metric!("gridiron_downs_total", "Downs set", "counter", s.downs_set);
        metric!("gridiron_penalties_total", "Penalties called", "counter", s.penalties);
        metric!("gridiron_scores_total", "Scoring plays", "counter", s.scores);
        metric!("gridiron_points_total", "Points scored", "counter", s.points);
        metric!("gridiron_commands_rejected_total", "Chat commands rejected", "counter", s.commands_rejected);
        metric!("gridiron_stats_failures_total", "Stats collaborator failures", "counter", s.stats_failures);
        metric!("gridiron_tick_time_microseconds", "Last tick time", "gauge", s.tick_time_us);
        metric!("gridiron_tick_time_p95_microseconds", "95th percentile tick time", "gauge", s.tick_time_p95_us);
        metric!("gridiron_tick_time_p99_microseconds", "99th percentile tick time", "gauge", s.tick_time_p99_us);
        metric!("gridiron_tick_time_max_microseconds", "Maximum tick time in the window", "gauge", s.tick_time_max_us);
        metric!("gridiron_uptime_seconds", "Engine uptime", "counter", s.uptime_seconds);

        output
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = EngineMetrics::new();
        metrics.record_engine_tick();
        metrics.record_engine_tick();
        metrics.record_score(6);
        metrics.record_score(2);
        metrics.record_penalty();

        let s = metrics.snapshot();
        assert_eq!(s.engine_ticks, 2);
        assert_eq!(s.scores, 2);
        assert_eq!(s.points, 8);
        assert_eq!(s.penalties, 1);
        assert_eq!(s.downs_set, 0);
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = EngineMetrics::new();
        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }
        assert_eq!(metrics.tick_time_us.load(Ordering::Relaxed), 1090);
        assert_eq!(metrics.tick_time_max_us.load(Ordering::Relaxed), 1090);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) >= 1000);
    }

    #[test]
    fn test_window_is_bounded() {
        let metrics = EngineMetrics::new();
        for _ in 0..(TICK_WINDOW + 50) {
            metrics.record_tick_time(Duration::from_micros(5));
        }
        assert_eq!(metrics.tick_history.read().len(), TICK_WINDOW);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = EngineMetrics::new();
        metrics.record_down();
        let output = metrics.to_prometheus();
        assert!(output.contains("gridiron_downs_total 1"));
        assert!(output.contains("# TYPE gridiron_ticks_total counter"));
    }

    #[test]
    fn test_json_format() {
        let metrics = EngineMetrics::new();
        metrics.record_command_rejected();
        let value: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(value["commands_rejected"], 1);
    }
}
