//! Simulator Configuration Module
//!
//! Loaded from TOML once at startup and handed to [`crate::context`], which
//! builds the immutable simulator context. There is no global config.
//!
//! ## Loading Order
//!
//! 1. `--config <path>` on the command line
//! 2. `REVSIM_CONFIG` environment variable (path to TOML file)
//! 3. `simulator.toml` in the current working directory
//! 4. Built-in defaults (see [`defaults`])

mod simulator_config;
pub mod defaults;
pub mod validation;

pub use simulator_config::*;
