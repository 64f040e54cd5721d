//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the crate talks to the
//! `log` facade only; `env_logger` is the single backend wired up here.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
