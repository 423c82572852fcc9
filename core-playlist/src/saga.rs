//! Saga grouping and output order
//!
//! Entries sharing a base title (case-insensitive) form a saga and are placed
//! next to each other in release order. Everything else is standalone.
//!
//! Order of the output:
//! 1. sagas, by lowercase base title; members by (year, lowercase bare title,
//!    source position), unknown years (0) first
//! 2. standalone entries, by (lowercase bare title, year, source position)

use crate::models::EnrichedEntry;

use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saga {
    /// Base title as written on the first member in source order
    pub base_title: String,
    pub entries: Vec<EnrichedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    pub sagas: Vec<Saga>,
    pub standalone: Vec<EnrichedEntry>,
}

impl Grouping {
    /// Flatten into the final output order.
    pub fn into_ordered(self) -> Vec<EnrichedEntry> {
        self.sagas
            .into_iter()
            .flat_map(|saga| saga.entries)
            .chain(self.standalone)
            .collect()
    }
}

/// Partition entries into sagas and standalone entries, each already sorted.
///
/// Entries with an empty base title never form a saga.
pub fn group(entries: Vec<EnrichedEntry>) -> Grouping {
    let mut buckets: BTreeMap<String, Vec<EnrichedEntry>> = BTreeMap::new();
    let mut standalone = Vec::new();

    for entry in entries {
        let key = entry.group_key();
        if key.is_empty() {
            standalone.push(entry);
        } else {
            buckets.entry(key).or_default().push(entry);
        }
    }

    let mut sagas = Vec::new();
    for (_, mut members) in buckets {
        if members.len() == 1 {
            standalone.append(&mut members);
            continue;
        }

        let base_title = members
            .iter()
            .min_by_key(|entry| entry.position)
            .map(|entry| entry.base_title.clone())
            .unwrap_or_default();
        members.sort_by_cached_key(|entry| {
            (entry.year_number, entry.bare_title.to_lowercase(), entry.position)
        });
        sagas.push(Saga {
            base_title,
            entries: members,
        });
    }

    standalone.sort_by_cached_key(|entry| {
        (entry.bare_title.to_lowercase(), entry.year_number, entry.position)
    });

    debug!(
        sagas = sagas.len(),
        standalone = standalone.len(),
        "Grouped playlist entries"
    );

    Grouping { sagas, standalone }
}

/// Group and flatten in one step.
pub fn group_and_sort(entries: Vec<EnrichedEntry>) -> Vec<EnrichedEntry> {
    group(entries).into_ordered()
}
