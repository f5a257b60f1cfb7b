//! Headless runner for the Agents of Empire simulation.
//!
//! Wires config loading and logging to the simulation engine, and runs it
//! either as a fast fixed-step batch or on a paced game loop thread.

pub mod demo;
pub mod game_loop;
pub mod state;

pub use empire_core as core;
