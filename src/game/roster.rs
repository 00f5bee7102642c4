//! Team membership history
//!
//! Append-only spans of who played for which team and when, reported with the
//! match summary.

use serde::{Deserialize, Serialize};

use crate::game::host::{PlayerId, PlayerInfo};
use crate::game::state::Team;

/// One stint of a player on a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSpan {
    pub id: PlayerId,
    pub name: String,
    pub team: Team,
    pub time_join: f32,
    pub time_left: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamHistory {
    spans: Vec<TeamSpan>,
}

impl TeamHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh history with everyone currently on a team
    pub fn seed(&mut self, players: &[PlayerInfo]) {
        self.spans = players
            .iter()
            .filter(|p| p.team.is_playing())
            .map(|p| TeamSpan {
                id: p.id,
                name: p.name.clone(),
                team: p.team,
                time_join: 0.0,
                time_left: None,
            })
            .collect();
    }

    pub fn open(&mut self, id: PlayerId, name: &str, team: Team, time: f32) {
        self.spans.push(TeamSpan {
            id,
            name: name.to_string(),
            team,
            time_join: time,
            time_left: None,
        });
    }

    fn open_span_mut(&mut self, id: PlayerId) -> Option<&mut TeamSpan> {
        self.spans
            .iter_mut()
            .find(|s| s.id == id && s.time_left.is_none())
    }

    /// Close the player's open span, if any
    pub fn close(&mut self, id: PlayerId, time: f32) {
        if let Some(span) = self.open_span_mut(id) {
            span.time_left = Some(time);
        }
    }

    /// Player moved to `team`: close the old span and open a new one for a playing team
    pub fn team_changed(&mut self, id: PlayerId, name: &str, team: Team, time: f32) {
        let reopen = match self.open_span_mut(id) {
            Some(span) if span.team == team => false,
            Some(span) => {
                span.time_left = Some(time);
                true
            }
            None => true,
        };
        if reopen && team.is_playing() {
            self.open(id, name, team, time);
        }
    }

    /// Close every open span, at match end
    pub fn close_all(&mut self, time: f32) {
        for span in self.spans.iter_mut().filter(|s| s.time_left.is_none()) {
            span.time_left = Some(time);
        }
    }

    pub fn spans(&self) -> &[TeamSpan] {
        &self.spans
    }

    pub fn clear(&mut self) {
        self.spans.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::vec2::Vec2;

    fn info(id: PlayerId, team: Team) -> PlayerInfo {
        PlayerInfo {
            id,
            name: format!("p{}", id),
            team,
            admin: false,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: 15.0,
        }
    }

    #[test]
    fn test_seed_skips_spectators() {
        let mut history = TeamHistory::new();
        history.seed(&[info(1, Team::Red), info(2, Team::Spectators), info(3, Team::Blue)]);
        assert_eq!(history.spans().len(), 2);
    }

    #[test]
    fn test_team_change_closes_and_reopens() {
        let mut history = TeamHistory::new();
        history.seed(&[info(1, Team::Red)]);
        history.team_changed(1, "p1", Team::Blue, 30.0);

        let spans = history.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].time_left, Some(30.0));
        assert_eq!(spans[1].team, Team::Blue);
        assert_eq!(spans[1].time_join, 30.0);
    }

    #[test]
    fn test_move_to_spectators_only_closes() {
        let mut history = TeamHistory::new();
        history.seed(&[info(1, Team::Red)]);
        history.team_changed(1, "p1", Team::Spectators, 12.0);
        assert_eq!(history.spans().len(), 1);
        assert_eq!(history.spans()[0].time_left, Some(12.0));
    }

    #[test]
    fn test_close_all() {
        let mut history = TeamHistory::new();
        history.seed(&[info(1, Team::Red), info(2, Team::Blue)]);
        history.close(1, 5.0);
        history.close_all(600.0);
        assert_eq!(history.spans()[0].time_left, Some(5.0));
        assert_eq!(history.spans()[1].time_left, Some(600.0));
    }
}
