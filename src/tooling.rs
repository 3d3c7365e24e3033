//! Tooling & Integration Layer
//!
//! CLI entry points for driving the agent outside a host runtime: one-shot
//! sync cycles, explicit offline prefetch, and cache status inspection.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
