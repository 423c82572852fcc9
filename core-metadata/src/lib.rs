//! # Movie Metadata Module
//!
//! Resolves playlist titles against a movie-metadata provider and drives the
//! playlist transform.
//!
//! ## Overview
//!
//! This module handles:
//! - The TMDB client (search, details, rate limiting, status mapping)
//! - The [`MetadataLookup`] seam the pipeline depends on
//! - Optional title-variant retries for near-miss titles
//! - The pure text-to-text [`EnrichmentService`] transform

pub mod enrichment_service;
pub mod error;
pub mod lookup;
pub mod providers;

pub use enrichment_service::{DecisionObserver, EnrichmentService, EntryDecision, TransformOutcome};
pub use error::{MetadataError, Result};
pub use lookup::{MetadataLookup, TmdbLookup};
