//! External Metadata Providers
//!
//! - TMDB - The Movie Database, v3 REST API
//!
//! Providers enforce a minimum spacing between requests and map HTTP
//! failures to [`MetadataError`](crate::error::MetadataError).

pub mod tmdb;

pub use tmdb::{Genre, MovieDetails, MovieSearchResult, TmdbClient};
