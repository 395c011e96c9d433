// Frameworks: configuration, logging, client wiring and the CLI entry point.

pub mod cli;
pub mod client;
pub mod config;
pub mod logging;
