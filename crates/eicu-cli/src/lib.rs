//! CLI library components for the eICU table builder and server.

pub mod commands;
pub mod config;
pub mod logging;
