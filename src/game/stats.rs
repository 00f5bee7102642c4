//! Statistics collaborator
//!
//! The engine reports player stat events, score changes, completed downs and
//! the match summary through [`StatsSink`]. Failures are the collaborator's
//! problem: the engine logs them and keeps playing.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::down_info::DownRecord;
use crate::game::host::PlayerId;
use crate::game::match_result::MatchSummary;

/// Closed set of attributable stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatCategory {
    Receptions,
    Targets,
    Completions,
    PassAttempts,
    PassingYards,
    ReceivingYards,
    YardsAfterCatch,
    RushingYards,
    Runs,
    QbRuns,
    QbRushingYards,
    Sacks,
    Tackles,
    ReturnYards,
    Returns,
    Touchdowns,
    Interceptions,
    PassesDefended,
    FieldGoalsMade,
    FieldGoalsMissed,
    FieldGoalYards,
    Penalties,
    Safeties,
}

impl StatCategory {
    /// MVP points per unit of this stat, in tenths
    fn mvp_weight(self) -> i64 {
        match self {
            StatCategory::Touchdowns => 60,
            StatCategory::Interceptions => 40,
            StatCategory::Sacks => 30,
            StatCategory::FieldGoalsMade => 30,
            StatCategory::Safeties => 20,
            StatCategory::PassesDefended => 20,
            StatCategory::Tackles => 10,
            StatCategory::Receptions | StatCategory::Completions => 5,
            StatCategory::PassingYards
            | StatCategory::ReceivingYards
            | StatCategory::RushingYards
            | StatCategory::QbRushingYards
            | StatCategory::ReturnYards => 1,
            StatCategory::Penalties => -10,
            StatCategory::FieldGoalsMissed => -5,
            _ => 0,
        }
    }
}

/// One attributed stat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEvent {
    pub player_id: PlayerId,
    pub player_name: String,
    pub category: StatCategory,
    pub amount: i32,
    pub tick: u64,
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats backend unavailable: {0}")]
    Unavailable(String),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receiver of everything the engine reports
pub trait StatsSink: Send {
    fn record(&mut self, event: StatEvent) -> Result<(), StatsError>;
    fn score_changed(&mut self, red: u32, blue: u32) -> Result<(), StatsError>;
    fn down_completed(&mut self, record: DownRecord) -> Result<(), StatsError>;
    fn match_finished(&mut self, summary: &MatchSummary) -> Result<(), StatsError>;
    /// Best player of the current match as (name, points)
    fn mvp(&self) -> Option<(String, i64)>;
    /// MVP points of a player in the current match
    fn points_of(&self, player: PlayerId) -> i64;
    /// Forget the current match
    fn clear(&mut self);
}

/// Per-player accumulated stats
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerLine {
    pub name: String,
    pub stats: HashMap<StatCategory, i32>,
}

impl PlayerLine {
    pub fn get(&self, category: StatCategory) -> i32 {
        self.stats.get(&category).copied().unwrap_or(0)
    }

    pub fn points(&self) -> i64 {
        let tenths: i64 = self
            .stats
            .iter()
            .map(|(category, amount)| category.mvp_weight() * *amount as i64)
            .sum();
        tenths / 10
    }
}

/// In-memory ledger
#[derive(Debug, Default)]
pub struct StatsLedger {
    pub players: HashMap<PlayerId, PlayerLine>,
    pub events: Vec<StatEvent>,
    pub scores: Vec<(u32, u32)>,
    pub downs: Vec<DownRecord>,
    pub summaries: Vec<MatchSummary>,
}

/// Thread-shareable in-memory [`StatsSink`]
#[derive(Debug, Clone, Default)]
pub struct SharedStats {
    inner: Arc<Mutex<StatsLedger>>,
}

impl SharedStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the ledger
    pub fn with<R>(&self, f: impl FnOnce(&StatsLedger) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn stat(&self, player: PlayerId, category: StatCategory) -> i32 {
        self.inner
            .lock()
            .players
            .get(&player)
            .map(|line| line.get(category))
            .unwrap_or(0)
    }
}

impl StatsSink for SharedStats {
    fn record(&mut self, event: StatEvent) -> Result<(), StatsError> {
        let mut ledger = self.inner.lock();
        let line = ledger.players.entry(event.player_id).or_default();
        line.name.clone_from(&event.player_name);
        *line.stats.entry(event.category).or_insert(0) += event.amount;
        ledger.events.push(event);
        Ok(())
    }

    fn score_changed(&mut self, red: u32, blue: u32) -> Result<(), StatsError> {
        self.inner.lock().scores.push((red, blue));
        Ok(())
    }

    fn down_completed(&mut self, record: DownRecord) -> Result<(), StatsError> {
        self.inner.lock().downs.push(record);
        Ok(())
    }

    fn match_finished(&mut self, summary: &MatchSummary) -> Result<(), StatsError> {
        self.inner.lock().summaries.push(summary.clone());
        Ok(())
    }

    fn mvp(&self) -> Option<(String, i64)> {
        let ledger = self.inner.lock();
        ledger
            .players
            .iter()
            .map(|(id, line)| (*id, line.name.clone(), line.points()))
            .filter(|(_, _, points)| *points > 0)
            .max_by(|a, b| a.2.cmp(&b.2).then_with(|| b.0.cmp(&a.0)))
            .map(|(_, name, points)| (name, points))
    }

    fn points_of(&self, player: PlayerId) -> i64 {
        self.inner
            .lock()
            .players
            .get(&player)
            .map(PlayerLine::points)
            .unwrap_or(0)
    }

    fn clear(&mut self) {
        let mut ledger = self.inner.lock();
        ledger.players.clear();
        ledger.events.clear();
        ledger.scores.clear();
    }
}
