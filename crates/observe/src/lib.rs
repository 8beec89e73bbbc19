//! This crate is intended to contain code that is required to provide or
//! improve the observability of the fill engine and the tools built on it.
//! For now that is the logging setup.
pub mod config;
pub mod tracing;

pub use config::Config;
