//! Run loop behind the `jgate` binary.
//!
//! The binary itself only parses flags and initializes logging; the
//! validated configuration and the sequential trigger-and-wait loop
//! live here so they can be exercised against a mock server.

pub mod duration;
pub mod logging;
pub mod output;
pub mod runner;
