//! Per-down snapshots
//!
//! A down records the field at up to four moments (the pass, the catch, the
//! carrier getting clear of the defense, the end of the play). Downs with the
//! first three moments are handed to the stats collaborator.

use serde::{Deserialize, Serialize};

use crate::game::host::{PlayerId, PlayerInfo};
use crate::util::vec2::Vec2;

/// Record format version understood by the stats collaborator
pub const DOWN_RECORD_VERSION: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownMoment {
    Kick,
    Reception,
    Advantage,
    EndPlay,
}

/// Role of a player in the recorded down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Qb,
    Wr,
    Def,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownPlayer {
    pub player_id: PlayerId,
    pub player_name: String,
    #[serde(rename = "type")]
    pub kind: PlayerKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub position: [f32; 2],
    pub with_ball: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentSnapshot {
    /// Engine tick of the moment
    pub time: u64,
    pub ball_position: [f32; 2],
    pub players: Vec<PlayerSnapshot>,
}

/// Everything recorded for one down
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownInfo {
    pub players: Vec<DownPlayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kick: Option<MomentSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reception: Option<MomentSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advantage: Option<MomentSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_play: Option<MomentSnapshot>,
}

/// Field participant at a moment
#[derive(Debug, Clone)]
pub struct Participant<'a> {
    pub player: &'a PlayerInfo,
    pub kind: PlayerKind,
    pub with_ball: bool,
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

impl DownInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `moment`, replacing an earlier snapshot of the same moment
    pub fn add_moment(&mut self, moment: DownMoment, tick: u64, ball: Vec2, participants: &[Participant<'_>]) {
        let snapshot = MomentSnapshot {
            time: tick,
            ball_position: [ball.x, ball.y],
            players: participants
                .iter()
                .map(|p| PlayerSnapshot {
                    player_id: p.player.id,
                    position: [round2(p.player.position.x), round2(p.player.position.y)],
                    with_ball: p.with_ball,
                })
                .collect(),
        };

        for p in participants {
            if self.players.iter().any(|known| known.player_id == p.player.id) {
                continue;
            }
            self.players.push(DownPlayer {
                player_id: p.player.id,
                player_name: p.player.name.clone(),
                kind: p.kind,
            });
        }

        *self.slot_mut(moment) = Some(snapshot);
    }

    fn slot_mut(&mut self, moment: DownMoment) -> &mut Option<MomentSnapshot> {
        match moment {
            DownMoment::Kick => &mut self.kick,
            DownMoment::Reception => &mut self.reception,
            DownMoment::Advantage => &mut self.advantage,
            DownMoment::EndPlay => &mut self.end_play,
        }
    }

    pub fn moment(&self, moment: DownMoment) -> Option<&MomentSnapshot> {
        match moment {
            DownMoment::Kick => self.kick.as_ref(),
            DownMoment::Reception => self.reception.as_ref(),
            DownMoment::Advantage => self.advantage.as_ref(),
            DownMoment::EndPlay => self.end_play.as_ref(),
        }
    }

    /// Worth reporting: the pass, the catch and the breakaway were all seen
    pub fn has_all_moments(&self) -> bool {
        self.kick.is_some() && self.reception.is_some() && self.advantage.is_some()
    }

    pub fn into_record(self) -> DownRecord {
        DownRecord {
            version: DOWN_RECORD_VERSION,
            info: self,
        }
    }
}

/// Versioned wire form of a completed down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownRecord {
    pub version: u32,
    #[serde(flatten)]
    pub info: DownInfo,
}

impl DownRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Team;

    fn player(id: PlayerId, x: f32, y: f32) -> PlayerInfo {
        PlayerInfo {
            id,
            name: format!("p{}", id),
            team: Team::Red,
            admin: false,
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            radius: 15.0,
        }
    }

    #[test]
    fn test_needs_three_moments() {
        let qb = player(1, -100.0, 0.0);
        let participants = [Participant {
            player: &qb,
            kind: PlayerKind::Qb,
            with_ball: false,
        }];

        let mut info = DownInfo::new();
        info.add_moment(DownMoment::Kick, 10, Vec2::ZERO, &participants);
        info.add_moment(DownMoment::Reception, 20, Vec2::ZERO, &participants);
        assert!(!info.has_all_moments());

        info.add_moment(DownMoment::EndPlay, 30, Vec2::ZERO, &participants);
        assert!(!info.has_all_moments());

        info.add_moment(DownMoment::Advantage, 25, Vec2::ZERO, &participants);
        assert!(info.has_all_moments());
        assert_eq!(info.players.len(), 1);
    }

    #[test]
    fn test_snapshot_keeps_both_coordinates() {
        let wr = player(2, 12.345, -40.0);
        let mut info = DownInfo::new();
        info.add_moment(
            DownMoment::Reception,
            5,
            Vec2::new(1.0, 2.0),
            &[Participant {
                player: &wr,
                kind: PlayerKind::Wr,
                with_ball: true,
            }],
        );

        let snapshot = info.moment(DownMoment::Reception).expect("reception recorded");
        assert_eq!(snapshot.players[0].position, [12.35, -40.0]);
        assert!(snapshot.players[0].with_ball);
    }

    #[test]
    fn test_record_json_shape() {
        let qb = player(1, 0.0, 0.0);
        let mut info = DownInfo::new();
        info.add_moment(
            DownMoment::Kick,
            3,
            Vec2::ZERO,
            &[Participant {
                player: &qb,
                kind: PlayerKind::Qb,
                with_ball: false,
            }],
        );

        let json = info.into_record().to_json().expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["version"], 2);
        assert_eq!(value["players"][0]["type"], "qb");
        assert_eq!(value["players"][0]["playerName"], "p1");
        assert_eq!(value["kick"]["time"], 3);
        assert!(value.get("reception").is_none());
    }
}
