//! Logging setup.
//!
//! All crates log through the `log` facade; only binaries call `init_logging`.

mod init;

pub use init::{init_logging, LoggingConfig};
