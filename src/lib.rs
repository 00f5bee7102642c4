//! Gridiron Engine Library
//!
//! Rules engine for an American-football variant played on a 2D physics
//! pitch: downs, scoring, penalties, kicks, match clock and stoppage time.
//!
//! The physics host is abstracted behind [`game::host::Host`]. A simulated
//! host ships in [`game::sim_host`] for the headless binary and the tests.

pub mod config;
pub mod game;
pub mod metrics;
pub mod util;
