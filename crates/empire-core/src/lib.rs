//! Core types and definitions for the Agents of Empire simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! ids, components, commands, events, configuration, snapshot views and
//! constants. It has no dependency on rendering or any runtime framework.

pub mod camera;
pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod ids;
pub mod state;
pub mod types;
