//! # Enrichment Service
//!
//! Turns playlist text into the enriched, reordered playlist. This is the
//! pure half of a run: no disk access happens here, so the same transform can
//! back an in-place rewrite, a dry run, or a test.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ EnrichmentService  │
//! │  - MetadataLookup  │
//! └──────────┬─────────┘
//!            │
//!            ├──> parser      (text → header + raw entries)
//!            ├──> title       (raw title → bare title + year)
//!            ├──> lookup      (bare title → metadata record, one at a time)
//!            ├──> merge       (raw entry + record → enriched entry)
//!            ├──> saga        (grouping and output order)
//!            └──> serializer  (entries → text, change summary)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::enrichment_service::EnrichmentService;
//! use std::sync::Arc;
//!
//! let service = EnrichmentService::new(Arc::new(lookup));
//! let outcome = service.transform(&contents).await;
//! if outcome.changes.has_changes() {
//!     // write outcome.rendered back
//! }
//! ```

use crate::lookup::MetadataLookup;
use core_playlist::merge::merge;
use core_playlist::parser::parse;
use core_playlist::saga::group;
use core_playlist::serializer::{render, summarize_changes, ChangeSummary};
use core_playlist::title::search_title;
use core_playlist::{EnrichedEntry, LineEnding, RawEntry};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

// =============================================================================
// Report Types
// =============================================================================

/// What the enricher decided for one entry, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDecision {
    pub position: usize,
    /// Bare title sent to the lookup
    pub search_title: String,
    /// Year chosen for the entry, empty if unknown
    pub year: String,
    /// Category written to the descriptor
    pub category: String,
    /// Provider identifier on a match
    pub matched_id: Option<String>,
}

impl fmt::Display for EntryDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = if self.year.is_empty() { "-" } else { &self.year };
        let category = if self.category.is_empty() {
            "-"
        } else {
            &self.category
        };
        write!(f, "{} | year: {} | category: {}", self.search_title, year, category)?;
        match &self.matched_id {
            Some(id) => write!(f, " | tmdb: {}", id),
            None => write!(f, " | no match"),
        }
    }
}

/// Everything a run needs after the transform.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub header: Vec<String>,
    /// Entries in output order
    pub entries: Vec<EnrichedEntry>,
    pub line_ending: LineEnding,
    /// Number of saga groups found
    pub saga_count: usize,
    pub decisions: Vec<EntryDecision>,
    pub changes: ChangeSummary,
    /// The rendered playlist
    pub rendered: String,
}

impl TransformOutcome {
    pub fn matched(&self) -> usize {
        self.decisions
            .iter()
            .filter(|decision| decision.matched_id.is_some())
            .count()
    }
}

/// Called with each entry's decision as soon as it is made.
pub type DecisionObserver = Arc<dyn Fn(&EntryDecision) + Send + Sync>;

// =============================================================================
// Enrichment Service
// =============================================================================

#[derive(Clone)]
pub struct EnrichmentService {
    lookup: Arc<dyn MetadataLookup>,
    observer: Option<DecisionObserver>,
}

impl EnrichmentService {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self {
            lookup,
            observer: None,
        }
    }

    /// Report every decision while the transform is still running.
    pub fn with_observer(mut self, observer: DecisionObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Enrich and reorder a playlist.
    ///
    /// Lookups run sequentially, one entry at a time. A failed or empty lookup
    /// leaves that entry's attributes as they were.
    #[instrument(skip_all, fields(bytes = contents.len()))]
    pub async fn transform(&self, contents: &str) -> TransformOutcome {
        let playlist = parse(contents);

        let mut enriched = Vec::with_capacity(playlist.entries.len());
        let mut decisions = Vec::with_capacity(playlist.entries.len());
        for raw in &playlist.entries {
            let (entry, decision) = self.enrich_entry(raw).await;
            enriched.push(entry);
            decisions.push(decision);
        }

        let grouping = group(enriched);
        let saga_count = grouping.sagas.len();
        let entries = grouping.into_ordered();

        let changes = summarize_changes(&entries);
        let rendered = render(&playlist.header, &entries, playlist.line_ending);

        info!(
            entries = entries.len(),
            matched = decisions.iter().filter(|d| d.matched_id.is_some()).count(),
            sagas = saga_count,
            rewritten = changes.rewritten,
            reordered = changes.reordered,
            "Playlist transformed"
        );

        TransformOutcome {
            header: playlist.header,
            entries,
            line_ending: playlist.line_ending,
            saga_count,
            decisions,
            changes,
            rendered,
        }
    }

    async fn enrich_entry(&self, raw: &RawEntry) -> (EnrichedEntry, EntryDecision) {
        let normalized = search_title(&raw.raw_title);

        let record = if normalized.bare_title.is_empty() {
            debug!(position = raw.position, "Skipping lookup for untitled entry");
            None
        } else {
            self.lookup.lookup(&normalized.bare_title).await
        };

        let entry = merge(raw, &normalized, record.as_ref());
        let decision = EntryDecision {
            position: raw.position,
            search_title: normalized.bare_title,
            year: entry.year.clone(),
            category: entry.final_category.clone(),
            matched_id: record.map(|r| r.canonical_id),
        };
        debug!(position = raw.position, "{}", decision);
        if let Some(observer) = &self.observer {
            observer(&decision);
        }

        (entry, decision)
    }
}
