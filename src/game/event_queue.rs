//! Host event queue
//!
//! Host callbacks may arrive on other threads. They are pushed through a
//! bounded crossbeam channel and the game loop drains it once per tick, so
//! the engine state keeps a single writer.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use thiserror::Error;

use crate::game::host::{PlayerId, PlayerInfo};

/// Discrete events reported by the physics/session host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    BallKicked { player: PlayerId },
    /// Snapshot taken before the player was removed
    PlayerLeft { player: PlayerInfo },
    TeamChanged { player: PlayerId, by: Option<PlayerId> },
    Paused { by: Option<PlayerId> },
    Unpaused { by: Option<PlayerId> },
    MatchStarted,
    MatchStopped { by: Option<PlayerId> },
    LayoutChanged { name: String, by: Option<PlayerId> },
    Chat { player: PlayerId, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("event queue is full")]
    Full,
    #[error("game loop has stopped")]
    Disconnected,
}

/// Bounded MPSC queue between host callbacks and the game loop
pub struct EventQueue {
    sender: Sender<HostEvent>,
    receiver: Receiver<HostEvent>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Handle for a host callback thread
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Everything queued since the last tick, in arrival order
    pub fn drain(&self) -> Vec<HostEvent> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[derive(Clone)]
pub struct EventSender {
    sender: Sender<HostEvent>,
}

impl EventSender {
    /// Non-blocking push. A full queue is reported, never waited on.
    #[inline]
    pub fn try_send(&self, event: HostEvent) -> Result<(), QueueError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Disconnected(_) => QueueError::Disconnected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_keeps_arrival_order() {
        let queue = EventQueue::new(8);
        let sender = queue.sender();
        sender.try_send(HostEvent::MatchStarted).unwrap();
        sender.try_send(HostEvent::BallKicked { player: 3 }).unwrap();
        sender.try_send(HostEvent::Paused { by: None }).unwrap();

        assert_eq!(queue.pending(), 3);
        let events = queue.drain();
        assert_eq!(
            events,
            vec![
                HostEvent::MatchStarted,
                HostEvent::BallKicked { player: 3 },
                HostEvent::Paused { by: None },
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_reports_backpressure() {
        let queue = EventQueue::new(1);
        let sender = queue.sender();
        sender.try_send(HostEvent::MatchStarted).unwrap();
        assert_eq!(sender.try_send(HostEvent::MatchStarted), Err(QueueError::Full));
        assert_eq!(queue.capacity(), 1);
    }

    #[test]
    fn test_dropped_queue_disconnects_senders() {
        let queue = EventQueue::new(4);
        let sender = queue.sender();
        drop(queue);
        assert_eq!(sender.try_send(HostEvent::MatchStarted), Err(QueueError::Disconnected));
    }

    #[test]
    fn test_senders_on_other_threads() {
        let queue = EventQueue::new(64);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for _ in 0..5 {
                        sender
                            .try_send(HostEvent::Chat {
                                player: i,
                                text: "hike".to_string(),
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.drain().len(), 20);
    }
}
