//! # Playlist Pipeline
//!
//! Pure, I/O-free building blocks for rewriting movie playlists.
//!
//! ## Overview
//!
//! This crate owns:
//! - Title normalization (bare title, release year, saga base title)
//! - Parsing `#EXTINF` descriptors and their reference lines
//! - The field merge policy applied after a metadata lookup
//! - Saga grouping and the deterministic output order
//! - Rendering the playlist back to text and detecting changes
//!
//! Nothing here touches the network or the filesystem; the metadata lookup
//! lives in `core-metadata` and disk access in `core-service`.

pub mod error;
pub mod merge;
pub mod models;
pub mod parser;
pub mod saga;
pub mod serializer;
pub mod title;

pub use error::{PlaylistError, Result};
pub use models::{
    DescriptorAttributes, EnrichedEntry, LineEnding, MetadataRecord, NormalizedTitle,
    ParsedPlaylist, RawEntry,
};
