use std::path::PathBuf;

use bridge_traits::time::LogLevel;
use clap::Parser;
use core_runtime::config::EnricherConfig;
use core_runtime::logging::{LogFormat, LoggingConfig};

/// Enrich an M3U movie playlist in place with TMDB metadata.
///
/// Requires TMDB_API_KEY in the environment.
#[derive(Debug, Parser)]
#[command(name = "m3u-enrich", version, about)]
pub struct Cli {
    /// Playlist file to rewrite
    #[arg(value_name = "PLAYLIST")]
    pub playlist: PathBuf,

    /// Print the decision taken for every entry
    #[arg(short, long)]
    pub verbose: bool,

    /// Retry missed titles with spelling variants ("and"/"&", glued years)
    #[arg(long)]
    pub fuzzy_titles: bool,

    /// Print the rewritten playlist to stdout instead of writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Log output format: pretty, json or compact
    #[arg(long, value_name = "FORMAT", default_value = "compact")]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn logging_config(&self) -> LoggingConfig {
        let level = if self.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        LoggingConfig::default()
            .with_format(self.log_format)
            .with_level(level)
    }

    /// Apply command-line overrides on top of the environment configuration.
    pub fn apply_to(&self, mut config: EnricherConfig) -> EnricherConfig {
        if self.fuzzy_titles {
            config.features.enable_title_variants = true;
        }
        config
    }
}
