// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # GGPK Telemetry
//!
//! Structured logging setup shared by the GGPK tools, plus a scope timer for
//! reporting how long the expensive phases (scan, tree build, extraction) take.

/// The initialization routine for global structured logging.
pub mod init;
/// A simple RAII timer for measuring the duration of a scope.
pub mod time;

pub use init::{init_tracing, LogFormat};
pub use time::Timer;
