//! Pausable delayed actions
//!
//! Timers count down in milliseconds of match time. They only advance when
//! the engine ticks, so a host pause (no ticks) holds them in place without
//! any wall clock involved.

use std::collections::BTreeMap;

use crate::game::geometry::FieldPosition;
use crate::game::host::PlayerId;
use crate::game::state::Team;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Armed,
    Fired,
    Stopped,
}

/// Single cancelable countdown
#[derive(Debug, Clone, PartialEq)]
pub struct Timer {
    remaining_ms: f64,
    paused: bool,
    state: TimerState,
}

impl Timer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            remaining_ms: delay_ms as f64,
            paused: false,
            state: TimerState::Armed,
        }
    }

    /// Count down `ms`. Returns true exactly once, on the call that expires it.
    pub fn advance(&mut self, ms: f64) -> bool {
        if self.state != TimerState::Armed || self.paused {
            return false;
        }
        self.remaining_ms -= ms;
        if self.remaining_ms <= 0.0 {
            self.remaining_ms = 0.0;
            self.state = TimerState::Fired;
            return true;
        }
        false
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Cancel. Stopping twice is harmless.
    pub fn stop(&mut self) {
        if self.state == TimerState::Armed {
            self.state = TimerState::Stopped;
        }
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.state == TimerState::Armed
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.state == TimerState::Fired
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }
}

/// Named timer slots. Starting a slot replaces whatever it held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerSlot {
    Hike,
    KickoffReset,
    TouchdownTry,
    FailedFieldGoal,
    FieldGoalClock,
    FieldGoalDetect,
    Invasion,
    PassBlockedReset,
    BlockCheck,
    InterceptionCheck,
}

/// Parameters of a down being set. Mirrors the knobs of the scrimmage `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct DownSetup {
    /// New line of scrimmage (keep the current one when `None`)
    pub pos: Option<FieldPosition>,
    /// Team that will hold the ball (current possession when `None`)
    pub for_team: Option<Team>,
    /// Penalty yards applied to the line and the distance
    pub decrement: Option<i32>,
    pub count_down: bool,
    pub count_distance_from_new_pos: bool,
    /// Skip the down announcement
    pub silent: bool,
}

impl Default for DownSetup {
    fn default() -> Self {
        Self {
            pos: None,
            for_team: None,
            decrement: None,
            count_down: true,
            count_distance_from_new_pos: true,
            silent: false,
        }
    }
}

impl DownSetup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, pos: FieldPosition) -> Self {
        self.pos = Some(pos);
        self
    }

    pub fn for_team(mut self, team: Team) -> Self {
        self.for_team = Some(team);
        self
    }

    pub fn decrement(mut self, yards: i32) -> Self {
        self.decrement = Some(yards);
        self
    }

    pub fn without_count(mut self) -> Self {
        self.count_down = false;
        self
    }

    pub fn keep_distance(mut self) -> Self {
        self.count_distance_from_new_pos = false;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.silent = true;
        self
    }
}

/// What a timer does when it fires
#[derive(Debug, Clone, PartialEq)]
pub enum TimedAction {
    /// Offense took too long to snap
    HikeExpired { team: Team },
    Kickoff { team: Team },
    SafetyKick { team: Team },
    /// Set up the try after a touchdown
    ExtraPoint { team: Team },
    SetDown(DownSetup),
    /// Resolve a defender's deflection. `direction` is the sign of the
    /// ball's x velocity when it was touched.
    CheckInterception {
        player: PlayerId,
        origin: Vec2,
        direction: f32,
    },
    /// A defender sat on the pass
    CheckBlockedPass { player: PlayerId },
    InvasionPenalty,
    /// Project the field goal kick
    DetectFieldGoal { origin: Vec2 },
    FieldGoalExpired,
}

/// Keyed timer set owned by the engine
#[derive(Debug, Clone, Default)]
pub struct Timers {
    slots: BTreeMap<TimerSlot, (Timer, TimedAction)>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `slot`, replacing any timer it held
    pub fn start(&mut self, slot: TimerSlot, delay_ms: u64, action: TimedAction) {
        self.slots.insert(slot, (Timer::new(delay_ms), action));
    }

    pub fn stop(&mut self, slot: TimerSlot) {
        if let Some((mut timer, _)) = self.slots.remove(&slot) {
            timer.stop();
        }
    }

    pub fn is_armed(&self, slot: TimerSlot) -> bool {
        self.slots.get(&slot).is_some_and(|(t, _)| t.is_armed())
    }

    pub fn remaining_ms(&self, slot: TimerSlot) -> Option<f64> {
        self.slots
            .get(&slot)
            .filter(|(t, _)| t.is_armed())
            .map(|(t, _)| t.remaining_ms())
    }

    pub fn pause(&mut self, slot: TimerSlot) {
        if let Some((timer, _)) = self.slots.get_mut(&slot) {
            timer.pause();
        }
    }

    pub fn resume(&mut self, slot: TimerSlot) {
        if let Some((timer, _)) = self.slots.get_mut(&slot) {
            timer.resume();
        }
    }

    pub fn pause_all(&mut self) {
        for (timer, _) in self.slots.values_mut() {
            timer.pause();
        }
    }

    pub fn resume_all(&mut self) {
        for (timer, _) in self.slots.values_mut() {
            timer.resume();
        }
    }

    /// Stop every timer
    pub fn clear(&mut self) {
        for (timer, _) in self.slots.values_mut() {
            timer.stop();
        }
        self.slots.clear();
    }

    /// Count every live timer down by `ms`
    pub fn advance(&mut self, ms: f64) {
        for (timer, _) in self.slots.values_mut() {
            timer.advance(ms);
        }
    }

    /// Take the next fired timer's action, in slot order
    pub fn pop_due(&mut self) -> Option<(TimerSlot, TimedAction)> {
        let slot = self
            .slots
            .iter()
            .find(|(_, (timer, _))| timer.has_fired())
            .map(|(slot, _)| *slot)?;
        self.slots.remove(&slot).map(|(_, action)| (slot, action))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once() {
        let mut timer = Timer::new(100);
        assert!(!timer.advance(50.0));
        assert!(timer.advance(50.0));
        assert!(!timer.advance(50.0));
        assert!(timer.has_fired());
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let mut timer = Timer::new(10);
        timer.stop();
        timer.stop();
        assert!(!timer.advance(100.0));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_pause_preserves_remaining() {
        let mut timer = Timer::new(100);
        timer.advance(40.0);
        timer.pause();
        assert!(!timer.advance(1000.0));
        assert_eq!(timer.remaining_ms(), 60.0);
        timer.resume();
        assert!(!timer.advance(59.0));
        assert!(timer.advance(1.0));
    }

    #[test]
    fn test_zero_delay_fires_on_next_advance() {
        let mut timers = Timers::new();
        timers.start(TimerSlot::InterceptionCheck, 0, TimedAction::InvasionPenalty);
        assert!(timers.pop_due().is_none());
        timers.advance(16.6);
        assert_eq!(
            timers.pop_due(),
            Some((TimerSlot::InterceptionCheck, TimedAction::InvasionPenalty))
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn test_start_replaces_slot() {
        let mut timers = Timers::new();
        timers.start(TimerSlot::Hike, 100, TimedAction::HikeExpired { team: Team::Red });
        timers.start(TimerSlot::Hike, 1000, TimedAction::HikeExpired { team: Team::Blue });
        timers.advance(500.0);
        assert!(timers.pop_due().is_none());
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_stopped_slot_is_gone() {
        let mut timers = Timers::new();
        timers.start(TimerSlot::KickoffReset, 10, TimedAction::Kickoff { team: Team::Red });
        timers.stop(TimerSlot::KickoffReset);
        timers.stop(TimerSlot::KickoffReset);
        timers.advance(100.0);
        assert!(timers.pop_due().is_none());
    }

    #[test]
    fn test_pause_all_and_resume_all() {
        let mut timers = Timers::new();
        timers.start(TimerSlot::KickoffReset, 100, TimedAction::Kickoff { team: Team::Red });
        timers.pause_all();
        timers.advance(500.0);
        assert!(timers.pop_due().is_none());
        assert_eq!(timers.remaining_ms(TimerSlot::KickoffReset), Some(100.0));

        timers.resume_all();
        timers.advance(100.0);
        assert!(timers.pop_due().is_some());
    }

    #[test]
    fn test_due_timers_pop_in_slot_order() {
        let mut timers = Timers::new();
        timers.start(TimerSlot::BlockCheck, 0, TimedAction::InvasionPenalty);
        timers.start(TimerSlot::Hike, 0, TimedAction::HikeExpired { team: Team::Red });
        timers.advance(1.0);
        assert_eq!(timers.pop_due().map(|(slot, _)| slot), Some(TimerSlot::Hike));
        assert_eq!(timers.pop_due().map(|(slot, _)| slot), Some(TimerSlot::BlockCheck));
    }

    #[test]
    fn test_down_setup_builder() {
        let setup = DownSetup::new().decrement(10).without_count();
        assert_eq!(setup.decrement, Some(10));
        assert!(!setup.count_down);
        assert!(setup.count_distance_from_new_pos);
    }
}
