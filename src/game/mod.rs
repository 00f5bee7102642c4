//! Rules engine for one American-football match on a 2D physics pitch
//!
//! The host owns bodies, clock and chat. `engine::Game` reacts to host
//! events and per-tick state, and drives the host back through `host::Host`.

pub mod commands;
pub mod constants;
pub mod down_info;
pub mod engine;
pub mod event_queue;
pub mod geometry;
pub mod host;
pub mod match_result;
pub mod modes;
pub mod roster;
pub mod sim_host;
pub mod state;
pub mod stats;
pub mod stoppage;
pub mod timer;

#[cfg(test)]
mod test_support;
