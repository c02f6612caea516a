//! Command execution

use super::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig};
use crate::output::MessageWriter;
use crate::state::StateManager;
use crate::streams::{self, STREAMS};
use crate::types::ReplicationMethod;
use serde_json::json;
use tracing::info;

/// Executes a parsed CLI invocation
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a runner for the parsed arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the selected command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Check => self.check().await,
            Commands::Discover => self.discover(),
            Commands::Read {
                streams,
                fail_fast,
                staging_dir,
            } => {
                self.read(streams.as_deref(), *fail_fast, staging_dir.clone())
                    .await
            }
        }
    }

    /// Load the tap configuration from the CLI arguments
    fn load_config(&self) -> Result<TapConfig> {
        if let Some(json) = &self.cli.config_json {
            return TapConfig::from_json(json);
        }
        if let Some(path) = &self.cli.config {
            return TapConfig::from_file(path).context(format!("loading {}", path.display()));
        }
        Err(Error::config("no config given (use --config or --config-json)"))
    }

    /// Load the replication state from the CLI arguments
    fn load_state(&self) -> Result<StateManager> {
        if let Some(json) = &self.cli.state_json {
            return StateManager::from_json(json);
        }
        if let Some(path) = &self.cli.state {
            return StateManager::from_file(path);
        }
        Ok(StateManager::in_memory())
    }

    /// Build the HTTP client for the configured region and key
    fn build_client(config: &TapConfig) -> HttpClient {
        HttpClient::with_config(
            HttpClientConfig::builder()
                .base_url(config.base_url())
                .api_key(&config.api_key)
                .build(),
        )
    }

    /// Verify the API key works against a cheap endpoint
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = Self::build_client(&config);

        client.get("/lists").await?;
        println!("Connection OK ({:?} region)", config.region);
        Ok(())
    }

    /// Print the stream catalog
    fn discover(&self) -> Result<()> {
        let catalog: Vec<_> = STREAMS
            .iter()
            .filter(|spec| spec.selected)
            .map(|spec| {
                let schema = streams::schema::for_stream(spec.name)?;
                let replication_method = if spec.is_incremental() {
                    ReplicationMethod::Incremental
                } else {
                    ReplicationMethod::FullTable
                };
                Ok(json!({
                    "tap_stream_id": spec.name,
                    "stream": spec.name,
                    "schema": schema,
                    "key_properties": spec.primary_keys,
                    "replication_key": spec.replication_key,
                    "replication_method": replication_method,
                }))
            })
            .collect::<Result<_>>()?;

        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "streams": catalog }))?
        );
        Ok(())
    }

    /// Run the extraction engine against stdout
    async fn read(
        &self,
        stream_filter: Option<&str>,
        fail_fast: bool,
        staging_dir: Option<std::path::PathBuf>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let state = self.load_state()?;
        let client = Self::build_client(&config);

        let selection: Option<Vec<String>> = stream_filter.map(|names| {
            names
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        });

        let mut sync_config = SyncConfig::new().with_fail_fast(fail_fast);
        if let Some(dir) = staging_dir {
            sync_config = sync_config.with_staging_dir(dir);
        }

        let mut engine = SyncEngine::new(client, state, config, MessageWriter::stdout())
            .with_sync_config(sync_config);
        engine.run(selection.as_deref()).await?;

        engine.state().save().await?;

        let stats = engine.stats();
        info!(
            "Run complete: {} records, {} pages, {} streams, {} errors in {}ms",
            stats.records_emitted,
            stats.pages_fetched,
            stats.streams_synced,
            stats.errors,
            stats.duration_ms
        );

        if stats.errors > 0 {
            return Err(Error::Other(format!(
                "{} stream(s) failed; see log for details",
                stats.errors
            )));
        }
        Ok(())
    }
}
