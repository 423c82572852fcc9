//! Workspace placeholder crate.
//!
//! Re-exports the enricher façade behind the `desktop-shims` feature so a
//! host can depend on `m3u-enrich-workspace` alone instead of wiring
//! `core-service`, `core-runtime` and `core-playlist` individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::{bootstrap_desktop, PlaylistService, RunOptions, RunOutcome, RunStatus};

#[cfg(feature = "desktop-shims")]
pub use core_runtime::config::EnricherConfig;
