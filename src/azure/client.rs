use crate::azure::catalog::ResourceCatalog;
use crate::azure::runner::{
    self, CommandRunner, Execution, ProcessExecutor, TokioProcessExecutor,
};
use crate::azure::tenant_region::{PowerBiCapacityRegion, TenantRegionSource};
use crate::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised before or instead of running an external command. The
/// message is complete, agent-readable text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpsError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ExternalCommand(String),
    #[error("{0}")]
    ParseAmbiguity(String),
    #[error("{0}")]
    Policy(String),
}

/// Everything an operation needs to reach the outside world: the command
/// runner, the resource catalog, configured directories and the tenant
/// region source.
pub struct OpsClient {
    runner: CommandRunner,
    catalog: Arc<ResourceCatalog>,
    config: Config,
    region_source: Arc<dyn TenantRegionSource>,
}

impl OpsClient {
    pub fn new(
        config: Config,
        executor: Arc<dyn ProcessExecutor>,
        script_host: impl Into<String>,
        region_source: Arc<dyn TenantRegionSource>,
    ) -> Self {
        let runner = CommandRunner::new(executor, script_host, config.command_timeout());
        Self {
            runner,
            catalog: Arc::new(ResourceCatalog::builtin()),
            config,
            region_source,
        }
    }

    /// Real process execution, probed script host and Power BI region lookup.
    pub fn from_config(config: Config) -> Self {
        let script_host = runner::detect_script_host();
        log::info!("Using script host: {}", script_host);
        Self::new(
            config,
            Arc::new(TokioProcessExecutor),
            script_host,
            Arc::new(PowerBiCapacityRegion::new()),
        )
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn region_source(&self) -> &dyn TenantRegionSource {
        self.region_source.as_ref()
    }

    pub fn script_path(&self, name: &str) -> PathBuf {
        self.config.scripts_dir.join(name)
    }

    pub fn template_path(&self, relative: &str) -> PathBuf {
        self.config.templates_dir.join(relative)
    }

    /// Resolves a script and checks it exists before anything is spawned.
    pub fn require_script(&self, name: &str) -> Result<PathBuf, OpsError> {
        let path = self.script_path(name);
        if path.is_file() {
            Ok(path)
        } else {
            log::warn!("Script not found: {}", path.display());
            Err(OpsError::NotFound(format!(
                "Error: Script '{}' not found.",
                name
            )))
        }
    }

    /// Runs a named script with `-Key value` parameters, returning its
    /// rendered output.
    pub async fn run_script(
        &self,
        name: &str,
        params: &[(&str, String)],
    ) -> Result<String, OpsError> {
        Ok(self.run_script_detailed(name, params).await?.text)
    }

    /// Like `run_script`, keeping the raw process output next to the text.
    pub async fn run_script_detailed(
        &self,
        name: &str,
        params: &[(&str, String)],
    ) -> Result<Execution, OpsError> {
        let path = self.require_script(name)?;
        Ok(self.runner.run_script_detailed(&path, params).await)
    }
}
