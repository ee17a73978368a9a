//! Shared library for cross-cutting concerns in forum-platform Rust crates.
//!
//! This crate provides centralized implementations for:
//! - Error types shared by the platform crates
//! - Environment-driven configuration helpers
//! - Tracing subscriber initialization
//! - Prometheus text-format metric primitives

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod metrics;
pub mod tracing_config;

pub use env::{EnvSource, ProcessEnv, load_dotenv, parse_bool, parse_secs, parse_var};
pub use error::PlatformError;
pub use metrics::{Counter, Gauge, Metric, render};
pub use tracing_config::{TracingConfig, init_tracing};
