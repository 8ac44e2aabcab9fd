//! sensor-things CLI library
//!
//! The binary in main.rs is a thin wrapper; the modules are exposed here for
//! integration testing.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
