//! # Host Bridge Traits
//!
//! Capability traits the enrichment core needs from its host.
//!
//! ## Overview
//!
//! The playlist pipeline never talks to the network or the disk directly.
//! Everything that touches the outside world goes through one of the traits
//! below, so the transform stage can be driven by in-memory fakes in tests and
//! by the `bridge-desktop` adapters in the CLI.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP used by metadata providers
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Whole-file playlist reads and atomic writes
//! - [`Clock`](time::Clock) - Time source for provider rate limiting
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! should convert platform errors into it and keep the message actionable
//! (include the URL or path involved).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared behind `Arc`.
//!
//! ## Examples
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
//!
//! async fn fetch(client: &dyn HttpClient) -> bridge_traits::error::Result<serde_json::Value> {
//!     let request = HttpRequest::new(HttpMethod::Get, "https://api.themoviedb.org/3/configuration")
//!         .header("Accept", "application/json");
//!     client.execute(request).await?.json()
//! }
//! ```

pub mod error;
pub mod http;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::FileSystemAccess;
pub use time::{Clock, LogLevel, SystemClock};
