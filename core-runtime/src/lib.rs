//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the enricher crates:
//! - Logging and tracing setup
//! - Configuration (provider credentials, locales, request pacing)
//! - Runtime error type
//!
//! ## Overview
//!
//! Nothing here performs I/O beyond reading environment variables and
//! installing the global `tracing` subscriber.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
