//! Shared test utilities for forum-platform Rust crates.
//!
//! This crate provides:
//! - Proptest generators for tokens, payloads, configurations and
//!   operation sequences
//! - Test fixtures: fixed clocks and ready-made store configurations

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
