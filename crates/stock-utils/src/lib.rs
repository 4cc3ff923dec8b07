//! Shared utilities for stock-analyzer
//!
//! Binaries in this workspace call [`init_tracing`] once at startup so that
//! every crate logs through the same subscriber.

pub mod logging;

pub use logging::{DEFAULT_FILTER, init_tracing, init_tracing_with};
