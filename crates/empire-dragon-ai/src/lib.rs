//! Dragon AI for Agents of Empire.
//!
//! Implements the dragon behaviour state machine (idle, patrol, aggro,
//! attack) and the per-variant combat profiles it reads.

pub mod fsm;
pub mod profiles;

pub use empire_core as core;
