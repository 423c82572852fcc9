//! # Metadata Lookup
//!
//! Resolves a search title into a [`MetadataRecord`].
//!
//! The pipeline only sees the [`MetadataLookup`] trait. A lookup never fails:
//! provider errors are logged and reported as a miss, so one bad request
//! leaves that entry untouched instead of aborting the whole playlist.
//!
//! ## TMDB resolution
//!
//! 1. search in the search locale, take the first result
//! 2. details in the search locale give the canonical title and release year
//! 3. details in the display locale give the category (first genre) and the
//!    localized poster; both fall back to the search-locale values

use crate::error::Result;
use crate::providers::tmdb::{MovieDetails, MovieSearchResult, TmdbClient};
use async_trait::async_trait;
use core_playlist::title::release_year;
use core_playlist::MetadataRecord;
use core_runtime::config::EnricherConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

static GLUED_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\s0-9])([0-9]{4})$").expect("valid glued year regex"));

#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Look up `search_title`. `None` on a miss or on any provider failure.
    async fn lookup(&self, search_title: &str) -> Option<MetadataRecord>;
}

/// [`MetadataLookup`] backed by TMDB.
pub struct TmdbLookup {
    client: TmdbClient,
    search_locale: String,
    display_locale: String,
    image_base_url: String,
    title_variants: bool,
}

impl TmdbLookup {
    pub fn new(client: TmdbClient, config: &EnricherConfig) -> Self {
        let api = &config.metadata_api_config;
        Self {
            client,
            search_locale: api.search_locale.clone(),
            display_locale: api.display_locale.clone(),
            image_base_url: api.image_base_url.trim_end_matches('/').to_string(),
            title_variants: config.features.enable_title_variants,
        }
    }

    async fn resolve(&self, title: &str) -> Result<Option<MetadataRecord>> {
        let results = self.client.search_movies(title, &self.search_locale).await?;
        let Some(hit) = results.into_iter().next() else {
            return Ok(None);
        };

        let canonical = self.client.movie_details(hit.id, &self.search_locale).await?;
        let localized = if self.display_locale == self.search_locale {
            None
        } else {
            match self.client.movie_details(hit.id, &self.display_locale).await {
                Ok(details) => Some(details),
                Err(e) => {
                    warn!(
                        id = hit.id,
                        locale = %self.display_locale,
                        "Localized details unavailable, using {}: {}",
                        self.search_locale,
                        e
                    );
                    None
                }
            }
        };

        Ok(Some(self.build_record(&hit, &canonical, localized.as_ref())))
    }

    fn build_record(
        &self,
        hit: &MovieSearchResult,
        canonical: &MovieDetails,
        localized: Option<&MovieDetails>,
    ) -> MetadataRecord {
        let canonical_title = non_empty(canonical.title.as_deref())
            .or_else(|| non_empty(hit.title.as_deref()))
            .unwrap_or_default()
            .to_string();

        let category = localized
            .and_then(MovieDetails::primary_genre)
            .or_else(|| canonical.primary_genre())
            .unwrap_or_default()
            .to_string();

        let artwork_url = non_empty(localized.and_then(|d| d.poster_path.as_deref()))
            .or_else(|| non_empty(canonical.poster_path.as_deref()))
            .or_else(|| non_empty(hit.poster_path.as_deref()))
            .map(|path| format!("{}/{}", self.image_base_url, path.trim_start_matches('/')))
            .unwrap_or_default();

        let release_year = non_empty(canonical.release_date.as_deref())
            .or_else(|| non_empty(hit.release_date.as_deref()))
            .and_then(release_year);

        MetadataRecord {
            canonical_id: canonical.id.to_string(),
            canonical_title,
            category,
            artwork_url,
            release_year,
        }
    }
}

#[async_trait]
impl MetadataLookup for TmdbLookup {
    #[instrument(skip(self), level = "debug")]
    async fn lookup(&self, search_title: &str) -> Option<MetadataRecord> {
        let candidates = if self.title_variants {
            title_variants(search_title)
        } else {
            vec![search_title.to_string()]
        };

        for candidate in candidates {
            match self.resolve(&candidate).await {
                Ok(Some(record)) => {
                    if candidate != search_title {
                        info!("Matched '{}' through variant '{}'", search_title, candidate);
                    }
                    return Some(record);
                }
                Ok(None) => debug!("No TMDB result for '{}'", candidate),
                Err(e) => {
                    warn!("TMDB lookup failed for '{}': {}", candidate, e);
                    return None;
                }
            }
        }

        None
    }
}

/// The title itself followed by spelling variants worth a second search:
/// `" and "` and `" & "` swapped, and a missing space before a trailing year.
pub fn title_variants(title: &str) -> Vec<String> {
    let mut variants = vec![title.to_string()];
    let mut push = |candidate: String| {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    };

    if title.contains(" and ") {
        push(title.replace(" and ", " & "));
    }
    if title.contains(" & ") {
        push(title.replace(" & ", " and "));
    }
    if GLUED_YEAR.is_match(title) {
        push(GLUED_YEAR.replace(title, "$1 $2").into_owned());
    }

    variants
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
