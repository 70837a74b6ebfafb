//! Configuration management
//!
//! Database location and log level, read from the environment once and
//! adjustable at runtime (the CLI's `--db` flag writes through here).

pub mod settings;

pub use settings::{Config, GLOBAL_CONFIG};
