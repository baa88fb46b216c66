use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "mcp-for-azure-operations";
const CONFIG_FILE: &str = "config.toml";

/// Server configuration.
///
/// Built from defaults, then an optional TOML file, then CLI/env overrides
/// applied by `main`. Relative paths in a file resolve against the directory
/// holding that file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the PowerShell scripts
    pub scripts_dir: PathBuf,
    /// Base directory the catalog's `templates/*.bicep` paths resolve against
    pub templates_dir: PathBuf,
    /// Markdown file returned by `show_agent_instructions`
    pub instructions_file: PathBuf,
    /// Hard timeout for every external command
    pub command_timeout_secs: u64,
    /// Region used for Fabric capacities when the tenant region can't be detected
    pub fabric_default_region: String,
    /// Region for Log Analytics workspaces created by the diagnostics workflow
    pub workspace_default_region: String,
    /// Location for network security perimeters created by the NSP workflow
    pub nsp_location: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("scripts"),
            templates_dir: PathBuf::from("."),
            instructions_file: PathBuf::from("AGENT_INSTRUCTIONS.md"),
            command_timeout_secs: 600,
            fabric_default_region: "westcentralus".to_string(),
            workspace_default_region: "eastus".to_string(),
            nsp_location: "global".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from the per-user config file when
    /// no path is given. An explicit path must exist; the per-user file is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.is_file() => p,
                _ => {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_toml_str(&raw, base)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Config = toml::from_str(raw)?;
        config.resolve_relative_to(base_dir);
        anyhow::ensure!(
            config.command_timeout_secs > 0,
            "command_timeout_secs must be greater than zero"
        );
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.scripts_dir,
            &mut self.templates_dir,
            &mut self.instructions_file,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
