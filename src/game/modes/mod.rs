//! Per-mode controllers
//!
//! Each file adds the `impl Game` block of one play type. The engine
//! dispatches ticks and kicks to them by the current [`PlayMode`].
//!
//! [`PlayMode`]: crate::game::state::PlayMode

pub mod carrier;
pub mod extra_point;
pub mod field_goal;
pub mod invasion;
pub mod kick;
pub mod kickoff;
pub mod onside;
pub mod punt;
pub mod safety;
pub mod scrimmage;
