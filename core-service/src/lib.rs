//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, filesystem)
//! into the playlist enricher and owns the I/O half of a run: read the
//! playlist, hand the text to the pure transform, and write the result back
//! only when something changed. Desktop builds enable the `desktop-shims`
//! feature (which depends on `bridge-desktop`) and call
//! [`bootstrap_desktop`].

pub mod error;

pub use error::{CoreError, Result};

use std::path::Path;
use std::sync::Arc;

use bridge_traits::{http::HttpClient, storage::FileSystemAccess};
use bytes::Bytes;
use core_metadata::providers::TmdbClient;
use core_metadata::{
    DecisionObserver, EnrichmentService, EntryDecision, MetadataLookup, TmdbLookup,
};
use core_playlist::parser::decode;
use core_playlist::serializer::ChangeSummary;
use core_runtime::config::EnricherConfig;
use tracing::{debug, info, instrument};

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub filesystem: Arc<dyn FileSystemAccess>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(http_client: Arc<dyn HttpClient>, filesystem: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            http_client,
            filesystem,
        }
    }
}

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Transform without writing the file back
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The playlist was rewritten
    Updated,
    /// Output would equal the input; the file was left untouched
    NoChanges,
    /// Dry run; nothing was written
    DryRun,
}

/// Result of one enrichment run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub changes: ChangeSummary,
    pub decisions: Vec<EntryDecision>,
    pub entries: usize,
    pub matched: usize,
    pub saga_count: usize,
    /// Rendered playlist text
    pub rendered: String,
}

/// Primary façade exposed to the command line.
#[derive(Clone)]
pub struct PlaylistService {
    deps: Arc<CoreDependencies>,
    enrichment: EnrichmentService,
}

impl PlaylistService {
    /// Create a service that resolves titles through TMDB.
    pub fn new(deps: CoreDependencies, config: &EnricherConfig) -> Self {
        let client = TmdbClient::new(
            Arc::clone(&deps.http_client),
            &config.metadata_api_config,
        );
        let lookup: Arc<dyn MetadataLookup> = Arc::new(TmdbLookup::new(client, config));
        Self::with_lookup(deps, lookup)
    }

    /// Create a service with a custom lookup.
    pub fn with_lookup(deps: CoreDependencies, lookup: Arc<dyn MetadataLookup>) -> Self {
        Self {
            deps: Arc::new(deps),
            enrichment: EnrichmentService::new(lookup),
        }
    }

    /// Report each entry's decision during [`run`](Self::run).
    pub fn with_decision_observer(mut self, observer: DecisionObserver) -> Self {
        self.enrichment = self.enrichment.with_observer(observer);
        self
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Enrich the playlist at `path` in place.
    ///
    /// The file is rewritten once, at the end, and only when a descriptor or
    /// the entry order changed.
    ///
    /// # Errors
    ///
    /// - [`CoreError::PlaylistNotFound`] if `path` does not exist
    /// - [`CoreError::Playlist`] if the file is not UTF-8
    /// - [`CoreError::Bridge`] on read or write failure
    #[instrument(skip(self, path), fields(file = ?path.file_name()))]
    pub async fn run(&self, path: &Path, options: RunOptions) -> Result<RunOutcome> {
        let filesystem = &self.deps.filesystem;

        if !filesystem.exists(path).await? {
            return Err(CoreError::PlaylistNotFound(path.to_path_buf()));
        }

        let bytes = filesystem.read_file(path).await?;
        let contents = decode(&bytes)?;
        debug!(bytes = bytes.len(), "Playlist loaded");

        let outcome = self.enrichment.transform(contents).await;

        let status = if options.dry_run {
            RunStatus::DryRun
        } else if outcome.changes.has_changes() {
            filesystem
                .write_file(path, Bytes::from(outcome.rendered.clone()))
                .await?;
            info!(
                rewritten = outcome.changes.rewritten,
                reordered = outcome.changes.reordered,
                "Playlist updated"
            );
            RunStatus::Updated
        } else {
            info!("No changes");
            RunStatus::NoChanges
        };

        Ok(RunOutcome {
            status,
            changes: outcome.changes,
            entries: outcome.entries.len(),
            matched: outcome.matched(),
            saga_count: outcome.saga_count,
            decisions: outcome.decisions,
            rendered: outcome.rendered,
        })
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Validates the configuration before any bridge is built, so a missing
/// credential fails here rather than halfway through a run.
///
/// ```ignore
/// use core_runtime::config::EnricherConfig;
/// use core_service::{bootstrap_desktop, RunOptions};
///
/// let config = EnricherConfig::from_env()?;
/// let service = bootstrap_desktop(&config)?;
/// let outcome = service.run("movies.m3u".as_ref(), RunOptions::default()).await?;
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(config: &EnricherConfig) -> Result<PlaylistService> {
    use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};

    config.validate()?;

    let http_client = ReqwestHttpClient::with_timeout(config.metadata_api_config.request_timeout)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let deps = CoreDependencies::new(Arc::new(http_client), Arc::new(TokioFileSystem::new()));

    Ok(PlaylistService::new(deps, config))
}
