//! revanchor — diff parsing and comment line-anchoring core for AI
//! code review (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cli;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod diff;
pub mod env;
pub mod models;
pub mod output;
pub mod providers;
pub mod resolve;
